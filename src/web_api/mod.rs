//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - Guardian command surface (push button, command dispatch)
//! - Status and health reporting
//! - Live reconfiguration from new attributes

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.started_at;

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_sec: uptime.num_seconds().max(0) as u64,
    };

    Json(response)
}
