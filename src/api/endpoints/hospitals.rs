//! Hospital directory.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Department, Hospital};

#[derive(Serialize)]
pub struct HospitalView {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub departments: Vec<Department>,
}

#[derive(Serialize)]
pub struct HospitalsResponse {
    pub hospitals: Vec<HospitalView>,
}

/// `GET /api/hospitals`: every hospital with its departments.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<HospitalsResponse>, ApiError> {
    let service = ctx.service();
    let hospitals = service
        .hospitals()?
        .into_iter()
        .map(|hospital| {
            let departments = service.departments(Some(hospital.id))?;
            Ok(HospitalView {
                hospital,
                departments,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(HospitalsResponse { hospitals }))
}
