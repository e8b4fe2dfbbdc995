//! Emergency triage endpoints.
//!
//! - `POST /api/emergency-triage`: assess one entry, revise its priority
//! - `GET /api/emergency-triage?hospital_id=`: prioritized emergencies and escalations
//! - `GET /api/emergency-recommendations?hospital_id=`: staff guidance for priority-1 cases

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{local_now, ApiContext, HospitalQuery};
use crate::escalation::{EmergencyAdvice, EmergencyOverview};
use crate::service::{TriageAssessment, TriageOutcome};

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub queue_entry_id: Uuid,
    #[serde(flatten)]
    pub assessment: TriageAssessment,
}

pub async fn assess(
    State(ctx): State<ApiContext>,
    Json(request): Json<TriageRequest>,
) -> Result<Json<TriageOutcome>, ApiError> {
    let outcome =
        ctx.service()
            .assess_triage(&request.queue_entry_id, &request.assessment, local_now())?;
    Ok(Json(outcome))
}

pub async fn overview(
    State(ctx): State<ApiContext>,
    Query(query): Query<HospitalQuery>,
) -> Result<Json<EmergencyOverview>, ApiError> {
    Ok(Json(
        ctx.service()
            .emergency_overview(query.hospital_id, local_now())?,
    ))
}

pub async fn recommendations(
    State(ctx): State<ApiContext>,
    Query(query): Query<HospitalQuery>,
) -> Result<Json<EmergencyAdvice>, ApiError> {
    Ok(Json(
        ctx.service().emergency_recommendations(query.hospital_id)?,
    ))
}
