//! Shared response models for the HTTP surface

use crate::guardian_loop::GuardianStatus;
use crate::tick_scheduler::TickStats;
use serde::Serialize;

/// Success envelope; failures use the `Error` response body instead
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_sec: u64,
}

/// Guardian status endpoint payload
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub guardian: GuardianStatus,
    pub scheduler_running: bool,
    pub tick_interval_ms: u64,
    pub ticks: TickStats,
}
