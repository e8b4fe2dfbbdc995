//! `POST /api/optimize-allocation`

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{local_now, run_blocking, ApiContext};
use crate::service::AllocationPlan;

#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub hospital_id: Uuid,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub use_ai: bool,
}

pub async fn optimize(
    State(ctx): State<ApiContext>,
    Json(request): Json<AllocationRequest>,
) -> Result<Json<AllocationPlan>, ApiError> {
    let service = ctx.service();
    let plan = run_blocking(move || {
        Ok(service.optimize_allocation(
            request.hospital_id,
            request.department_id,
            request.use_ai,
            local_now(),
        )?)
    })
    .await?;

    Ok(Json(plan))
}
