//! Shared types for the API layer.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::service::QueueService;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    pub fn service(&self) -> Arc<QueueService> {
        self.core.service().clone()
    }
}

/// `?hospital_id=` query used by hospital-scoped endpoints.
#[derive(Debug, Deserialize)]
pub struct HospitalQuery {
    pub hospital_id: Uuid,
}

/// Local wall-clock time, the clock every queue timestamp uses.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Run service work that may block (enrichment calls) off the async workers.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
