//! Server-sent event streams.
//!
//! - `GET /api/realtime/queue-updates?hospital_id=|patient_id=`: polled
//!   summary or position every few seconds, first event immediately
//! - `GET /api/realtime/emergency-alerts?hospital_id=`: alerts published by
//!   the escalation monitor for that hospital

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::NaiveDateTime;
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{local_now, ApiContext, HospitalQuery};
use crate::db::DatabaseError;
use crate::escalation::{Escalation, EscalationAlert};
use crate::estimation::QueueStatusSummary;
use crate::service::{PatientPosition, QueueService, ServiceError};

/// Poll period for queue updates.
pub const QUEUE_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Deserialize)]
pub struct UpdatesQuery {
    pub hospital_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy)]
enum Subject {
    Patient(Uuid),
    Hospital(Uuid),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum QueueUpdate {
    PatientUpdate {
        patient_id: Uuid,
        /// `None` once the patient is no longer waiting.
        position: Option<PatientPosition>,
        timestamp: NaiveDateTime,
    },
    QueueUpdate {
        hospital_id: Uuid,
        queue_status: QueueStatusSummary,
        timestamp: NaiveDateTime,
    },
}

#[derive(Serialize)]
struct EmergencyAlertEvent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    hospital_id: Uuid,
    escalations: &'a [Escalation],
    count: usize,
    timestamp: NaiveDateTime,
}

fn snapshot(service: &QueueService, subject: Subject) -> Option<QueueUpdate> {
    let timestamp = local_now();
    match subject {
        Subject::Patient(patient_id) => {
            let position = match service.patient_position(&patient_id) {
                Ok(position) => Some(position),
                Err(ServiceError::Database(DatabaseError::NotFound { .. })) => None,
                Err(e) => {
                    tracing::warn!(%patient_id, error = %e, "Patient update failed");
                    return None;
                }
            };
            Some(QueueUpdate::PatientUpdate {
                patient_id,
                position,
                timestamp,
            })
        }
        Subject::Hospital(hospital_id) => match service.queue_status(hospital_id) {
            Ok(queue_status) => Some(QueueUpdate::QueueUpdate {
                hospital_id,
                queue_status,
                timestamp,
            }),
            Err(e) => {
                tracing::warn!(%hospital_id, error = %e, "Queue update failed");
                None
            }
        },
    }
}

pub async fn queue_updates(
    State(ctx): State<ApiContext>,
    Query(query): Query<UpdatesQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Patient takes precedence when both are given.
    let subject = match (query.patient_id, query.hospital_id) {
        (Some(patient_id), _) => Subject::Patient(patient_id),
        (None, Some(hospital_id)) => Subject::Hospital(hospital_id),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "hospital_id or patient_id is required".into(),
            ))
        }
    };

    let service = ctx.service();
    let ticker = tokio::time::interval(QUEUE_UPDATE_INTERVAL);

    let events = stream::unfold((service, ticker), move |(service, mut ticker)| async move {
        loop {
            ticker.tick().await;
            let Some(update) = snapshot(&service, subject) else {
                continue;
            };
            match Event::default().json_data(&update) {
                Ok(event) => return Some((Ok(event), (service, ticker))),
                Err(e) => tracing::warn!(error = %e, "Failed to encode queue update"),
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn alert_event(alert: &EscalationAlert) -> Option<Event> {
    let payload = EmergencyAlertEvent {
        kind: "emergency_alert",
        hospital_id: alert.hospital_id,
        escalations: &alert.escalations,
        count: alert.escalations.len(),
        timestamp: alert.timestamp,
    };
    Event::default()
        .json_data(&payload)
        .map_err(|e| tracing::warn!(error = %e, "Failed to encode emergency alert"))
        .ok()
}

pub async fn emergency_alerts(
    State(ctx): State<ApiContext>,
    Query(query): Query<HospitalQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = ctx.core.subscribe_alerts();
    let hospital_id = query.hospital_id;

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(alert) if alert.hospital_id == hospital_id => {
                    if let Some(event) = alert_event(&alert) {
                        return Some((Ok(event), receiver));
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Alert subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
