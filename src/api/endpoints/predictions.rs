//! `POST /api/predict-wait-time`

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{local_now, run_blocking, ApiContext};
use crate::models::WaitTimePrediction;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub queue_entry_id: Uuid,
    #[serde(default)]
    pub use_ai: bool,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub prediction: WaitTimePrediction,
}

pub async fn predict(
    State(ctx): State<ApiContext>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let service = ctx.service();
    let prediction = run_blocking(move || {
        Ok(service.predict_wait_time(&request.queue_entry_id, request.use_ai, local_now())?)
    })
    .await?;

    Ok(Json(PredictResponse { prediction }))
}
