use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PriorityLevel, QueueStatus};
use crate::db::DatabaseError;

/// One patient's place in a department queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    pub department_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub priority_level: PriorityLevel,
    pub symptoms: String,
    /// Set once at registration; the store refuses to change it.
    pub arrival_time: NaiveDateTime,
    pub status: QueueStatus,
    /// Minutes, from the latest prediction.
    pub estimated_wait_time: Option<u32>,
    /// Minutes between arrival and consultation start.
    pub actual_wait_time: Option<u32>,
    pub consultation_start_time: Option<NaiveDateTime>,
    pub consultation_end_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl QueueEntry {
    pub fn new(
        patient_id: Uuid,
        hospital_id: Uuid,
        department_id: Uuid,
        priority_level: PriorityLevel,
        symptoms: impl Into<String>,
        arrival_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            hospital_id,
            department_id,
            doctor_id: None,
            priority_level,
            symptoms: symptoms.into(),
            arrival_time,
            status: QueueStatus::Waiting,
            estimated_wait_time: None,
            actual_wait_time: None,
            consultation_start_time: None,
            consultation_end_time: None,
            created_at: arrival_time,
            updated_at: arrival_time,
        }
    }

    /// Whole minutes since arrival. Future arrivals count as zero.
    pub fn waiting_minutes(&self, now: NaiveDateTime) -> u32 {
        elapsed_minutes(self.arrival_time, now)
    }

    pub fn is_waiting(&self) -> bool {
        self.status == QueueStatus::Waiting
    }

    /// Move to `next`, stamping consultation times as the status implies.
    pub fn apply_status(
        &mut self,
        next: QueueStatus,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        if !self.status.can_transition_to(next) {
            return Err(DatabaseError::InvalidTransition {
                from: self.status.as_str().into(),
                to: next.as_str().into(),
            });
        }

        match next {
            QueueStatus::InConsultation => {
                self.consultation_start_time = Some(now);
                self.actual_wait_time = Some(self.waiting_minutes(now));
            }
            QueueStatus::Completed => {
                self.consultation_end_time = Some(now);
            }
            QueueStatus::Waiting | QueueStatus::Cancelled => {}
        }

        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// Whole minutes from `since` to `now`, zero if `since` is in the future.
pub fn elapsed_minutes(since: NaiveDateTime, now: NaiveDateTime) -> u32 {
    let minutes = (now - since).num_minutes();
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Service order: most urgent priority first, then earliest arrival.
pub fn service_order(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    a.priority_level
        .cmp(&b.priority_level)
        .then(a.arrival_time.cmp(&b.arrival_time))
}
