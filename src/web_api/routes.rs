//! API Routes

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::config::GuardianConfig;
use crate::error::Result;
use crate::guardian_loop::{GuardianCommand, GuardianStatus};
use crate::models::{ApiResponse, StatusResponse};
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/guardian/status", get(get_status))
        // Commands
        .route("/api/guardian/command", post(run_command))
        .route("/api/guardian/push", post(push))
        // Configuration
        .route("/api/guardian/reconfigure", post(reconfigure))
        .with_state(state)
}

async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let guardian = state.guardian.lock().await.status();

    let response = StatusResponse {
        guardian,
        scheduler_running: state.scheduler.is_running().await,
        tick_interval_ms: state.scheduler.period().as_millis() as u64,
        ticks: state.scheduler.stats().await,
    };

    Json(ApiResponse::success(response))
}

async fn run_command(
    State(state): State<AppState>,
    Json(command): Json<GuardianCommand>,
) -> impl IntoResponse {
    tracing::debug!(command = ?command, "Guardian command received");

    let mut guardian = state.guardian.lock().await;
    match guardian.handle_command(command).await {
        Ok(response) => Json(ApiResponse::success(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Button press: toggle the running flag
async fn push(State(state): State<AppState>) -> impl IntoResponse {
    let mut guardian = state.guardian.lock().await;
    match guardian.handle_command(GuardianCommand::StartStop).await {
        Ok(response) => {
            tracing::info!(running = response.running, "Guardian push handled");
            Json(ApiResponse::success(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn reconfigure(
    State(state): State<AppState>,
    Json(attributes): Json<Value>,
) -> impl IntoResponse {
    match apply_attributes(&state, &attributes).await {
        Ok(status) => Json(ApiResponse::success(status)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn apply_attributes(state: &AppState, attributes: &Value) -> Result<GuardianStatus> {
    let config = GuardianConfig::from_attributes(attributes)?;
    let deps = state.dependencies.dependencies().await?;

    let mut guardian = state.guardian.lock().await;
    guardian.reconfigure(&config, &deps).await?;
    Ok(guardian.status())
}
