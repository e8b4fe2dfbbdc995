//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// "disabled", "ready" or "unavailable".
    pub enrichment: &'static str,
    pub monitor_running: bool,
}

/// `GET /api/health`
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let service = ctx.service();
    let enrichment = run_blocking(move || {
        Ok(match service.enrichment_ready() {
            None => "disabled",
            Some(true) => "ready",
            Some(false) => "unavailable",
        })
    })
    .await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        enrichment,
        monitor_running: ctx.core.is_monitor_running(),
    }))
}
