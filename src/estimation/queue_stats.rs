use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Department, PriorityLevel, QueueEntry};

/// Snapshot of a hospital's waiting room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStatusSummary {
    pub total_patients: usize,
    /// Mean of the latest estimates, rounded. Missing estimates count as 0.
    pub avg_wait_time: u32,
    pub critical_count: usize,
    pub urgent_count: usize,
    /// Waiting patients per department name.
    pub department_breakdown: BTreeMap<String, usize>,
}

pub fn queue_status(entries: &[QueueEntry], departments: &[Department]) -> QueueStatusSummary {
    let waiting: Vec<&QueueEntry> = entries.iter().filter(|e| e.is_waiting()).collect();

    let avg_wait_time = if waiting.is_empty() {
        0
    } else {
        let total: u64 = waiting
            .iter()
            .map(|e| u64::from(e.estimated_wait_time.unwrap_or(0)))
            .sum();
        (total as f64 / waiting.len() as f64).round() as u32
    };

    let mut department_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for entry in &waiting {
        let name = departments
            .iter()
            .find(|d| d.id == entry.department_id)
            .map_or("Unknown", |d| d.name.as_str());
        *department_breakdown.entry(name.to_string()).or_insert(0) += 1;
    }

    let count = |level: PriorityLevel| waiting.iter().filter(|e| e.priority_level == level).count();

    QueueStatusSummary {
        total_patients: waiting.len(),
        avg_wait_time,
        critical_count: count(PriorityLevel::Emergency),
        urgent_count: count(PriorityLevel::Urgent),
        department_breakdown,
    }
}

/// 1-based place of the patient's waiting entry among the waiting entries of
/// the same department that are at least as urgent and arrived no later.
pub fn patient_position(entries: &[QueueEntry], patient_id: &Uuid) -> Option<usize> {
    let own = entries
        .iter()
        .find(|e| e.patient_id == *patient_id && e.is_waiting())?;

    Some(
        entries
            .iter()
            .filter(|e| {
                e.is_waiting()
                    && e.department_id == own.department_id
                    && e.priority_level <= own.priority_level
                    && e.arrival_time <= own.arrival_time
            })
            .count(),
    )
}
