//! Queue endpoints.
//!
//! - `GET /api/queue`: waiting entries, optionally by hospital/department
//! - `POST /api/queue`: register a patient and predict their wait
//! - `GET /api/queue/status`: hospital waiting-room summary
//! - `GET /api/queue/position/:patient_id`: a patient's place in line
//! - `POST /api/queue/:id/status`: move an entry through its lifecycle

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{local_now, run_blocking, ApiContext, HospitalQuery};
use crate::estimation::QueueStatusSummary;
use crate::models::{NewPatient, QueueEntry, QueueFilter, QueueStatus};
use crate::service::{PatientPosition, QueueEntryView, Registration};

#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    pub hospital_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct QueueResponse {
    pub queue: Vec<QueueEntryView>,
    pub total: usize,
}

/// `GET /api/queue`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueResponse>, ApiError> {
    let queue = ctx.service().queue(&QueueFilter {
        hospital_id: query.hospital_id,
        department_id: query.department_id,
    })?;

    Ok(Json(QueueResponse {
        total: queue.len(),
        queue,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub patient: NewPatient,
    #[serde(default)]
    pub use_ai: bool,
}

/// `POST /api/queue`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let service = ctx.service();
    let registration = run_blocking(move || {
        Ok(service.register_patient(request.patient, request.use_ai, local_now())?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /api/queue/status?hospital_id=`
pub async fn status(
    State(ctx): State<ApiContext>,
    Query(query): Query<HospitalQuery>,
) -> Result<Json<QueueStatusSummary>, ApiError> {
    Ok(Json(ctx.service().queue_status(query.hospital_id)?))
}

/// `GET /api/queue/position/:patient_id`
pub async fn position(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<PatientPosition>, ApiError> {
    Ok(Json(ctx.service().patient_position(&patient_id)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: QueueStatus,
}

/// `POST /api/queue/:id/status`
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Path(entry_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<QueueEntry>, ApiError> {
    Ok(Json(
        ctx.service()
            .update_status(&entry_id, request.status, local_now())?,
    ))
}
