//! Wait-time estimation for a single queue entry.
//!
//! Combines the patient's position among equal-or-higher priority entries,
//! the department's available doctors and their average consultation time,
//! a priority multiplier and a time-of-day load factor.

use chrono::{NaiveDateTime, Timelike};

use crate::models::{
    service_order, Doctor, PredictionFactors, PriorityLevel, QueueEntry, WaitTimePrediction,
};

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Estimate returned when the department has no available doctor (minutes).
pub const NO_DOCTOR_WAIT_MINUTES: u32 = 120;

/// Confidence returned when the department has no available doctor.
pub const NO_DOCTOR_CONFIDENCE: f64 = 0.3;

/// Consultation time reported in the factors of a no-doctor fallback.
const FALLBACK_CONSULTATION_MINUTES: u32 = 20;

/// Changeover time between consecutive patients (minutes per position).
const TRANSITION_BUFFER_MINUTES: f64 = 5.0;

const BASE_CONFIDENCE: f64 = 0.8;
const MIN_CONFIDENCE: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.95;

// ═══════════════════════════════════════════════════════════
// Factors
// ═══════════════════════════════════════════════════════════

/// Emergency cases are pulled forward, follow-ups pushed back.
pub fn priority_multiplier(priority: PriorityLevel) -> f64 {
    match priority {
        PriorityLevel::Emergency => 0.2,
        PriorityLevel::Urgent => 0.5,
        PriorityLevel::Routine => 1.0,
        PriorityLevel::FollowUp => 1.2,
    }
}

/// Clinic load by hour: mornings 9-11 and afternoons 14-16 are peak,
/// before 8 and after 18 are quiet.
pub fn time_of_day_factor(hour: u32) -> f64 {
    if (9..=11).contains(&hour) || (14..=16).contains(&hour) {
        1.3
    } else if hour < 8 || hour > 18 {
        0.8
    } else {
        1.0
    }
}

fn confidence(queue_length: usize, doctor_count: usize, priority: PriorityLevel) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if queue_length > 10 {
        confidence -= 0.1;
    }
    if queue_length > 20 {
        confidence -= 0.1;
    }
    if doctor_count > 3 {
        confidence += 0.1;
    }
    if priority == PriorityLevel::Emergency {
        confidence += 0.1;
    }
    round_two(confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
}

pub(crate) fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn clock_label(now: NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}

// ═══════════════════════════════════════════════════════════
// Estimation
// ═══════════════════════════════════════════════════════════

/// Predict how long `entry` will wait.
///
/// `current_queue` may hold entries from any department and status; only
/// waiting entries of the same department with equal or more urgent priority
/// count. `doctors` likewise is filtered to the department's available ones.
pub fn predict_wait_time(
    entry: &QueueEntry,
    current_queue: &[QueueEntry],
    doctors: &[Doctor],
    now: NaiveDateTime,
) -> WaitTimePrediction {
    let mut relevant: Vec<&QueueEntry> = current_queue
        .iter()
        .filter(|e| {
            e.department_id == entry.department_id
                && e.priority_level <= entry.priority_level
                && e.is_waiting()
        })
        .collect();

    let department_doctors: Vec<&Doctor> = doctors
        .iter()
        .filter(|d| d.department_id == entry.department_id && d.is_available)
        .collect();

    let queue_length = relevant.len();

    if department_doctors.is_empty() {
        return WaitTimePrediction {
            patient_id: entry.patient_id,
            queue_entry_id: entry.id,
            estimated_wait_time: NO_DOCTOR_WAIT_MINUTES,
            confidence: NO_DOCTOR_CONFIDENCE,
            factors: PredictionFactors {
                queue_length: queue_length as u32,
                doctor_availability: 0,
                priority_level: entry.priority_level,
                avg_consultation_time: FALLBACK_CONSULTATION_MINUTES,
                time_of_day: clock_label(now),
                ai_insights: None,
                fallback_reason: None,
            },
        };
    }

    let doctor_count = department_doctors.len();
    let avg_consultation = department_doctors
        .iter()
        .map(|d| f64::from(d.avg_consultation_time))
        .sum::<f64>()
        / doctor_count as f64;

    relevant.sort_by(|a, b| service_order(a, b));
    let position = relevant
        .iter()
        .position(|e| e.id == entry.id)
        .map_or(queue_length + 1, |i| i + 1) as f64;

    let mut estimate = position * avg_consultation / doctor_count as f64;
    estimate *= priority_multiplier(entry.priority_level);
    estimate *= time_of_day_factor(now.hour());
    estimate += position * TRANSITION_BUFFER_MINUTES;

    WaitTimePrediction {
        patient_id: entry.patient_id,
        queue_entry_id: entry.id,
        estimated_wait_time: estimate.round() as u32,
        confidence: confidence(queue_length, doctor_count, entry.priority_level),
        factors: PredictionFactors {
            queue_length: queue_length as u32,
            doctor_availability: doctor_count as u32,
            priority_level: entry.priority_level,
            avg_consultation_time: avg_consultation.round() as u32,
            time_of_day: clock_label(now),
            ai_insights: None,
            fallback_reason: None,
        },
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
