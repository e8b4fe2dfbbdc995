use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PriorityLevel;

/// Estimated wait for one queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitTimePrediction {
    pub patient_id: Uuid,
    pub queue_entry_id: Uuid,
    /// Whole minutes.
    pub estimated_wait_time: u32,
    /// In [0.3, 0.95], two decimals.
    pub confidence: f64,
    pub factors: PredictionFactors,
}

/// Inputs the estimate was derived from, kept for display and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactors {
    pub queue_length: u32,
    pub doctor_availability: u32,
    pub priority_level: PriorityLevel,
    pub avg_consultation_time: u32,
    /// Local wall clock, "HH:MM".
    pub time_of_day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
    /// Why enrichment was skipped, when it was requested but failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    pub patient_advice: Option<String>,
    pub reasoning: Option<String>,
}

/// A prediction as stored alongside the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitPredictionRecord {
    pub id: Uuid,
    pub queue_entry_id: Uuid,
    pub predicted_wait_time: u32,
    pub confidence: f64,
    pub factors: PredictionFactors,
    pub created_at: NaiveDateTime,
}

impl WaitPredictionRecord {
    pub fn from_prediction(prediction: &WaitTimePrediction, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue_entry_id: prediction.queue_entry_id,
            predicted_wait_time: prediction.estimated_wait_time,
            confidence: prediction.confidence,
            factors: prediction.factors.clone(),
            created_at,
        }
    }
}
