use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scorer::{calculate_triage_score, TriageInput, TriageScore};
use crate::models::{elapsed_minutes, Consciousness, PriorityLevel, VitalSigns};

/// A waiting patient as seen by triage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageCandidate {
    pub entry_id: Uuid,
    pub patient_id: Uuid,
    #[serde(default)]
    pub patient_name: Option<String>,
    pub priority_level: PriorityLevel,
    pub symptoms: String,
    pub age: Option<u32>,
    pub arrival_time: NaiveDateTime,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub pain_level: Option<u8>,
    #[serde(default)]
    pub consciousness: Option<Consciousness>,
}

impl TriageCandidate {
    pub fn score_at(&self, now: NaiveDateTime) -> (u32, TriageScore) {
        let wait = elapsed_minutes(self.arrival_time, now);
        let score = calculate_triage_score(&TriageInput {
            symptoms: &self.symptoms,
            age: self.age,
            vital_signs: self.vital_signs.as_ref(),
            pain_level: self.pain_level,
            consciousness: self.consciousness,
            wait_time: Some(wait),
        });
        (wait, score)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrioritizedPatient {
    pub patient: TriageCandidate,
    /// Minutes waited as of the evaluation time.
    pub wait_time: u32,
    pub triage_score: TriageScore,
    /// 1-based.
    pub queue_position: usize,
}

/// Score every candidate and order them most severe first.
/// Equal scores keep arrival order.
pub fn prioritize_patients(
    candidates: Vec<TriageCandidate>,
    now: NaiveDateTime,
) -> Vec<PrioritizedPatient> {
    let mut scored: Vec<(TriageCandidate, u32, TriageScore)> = candidates
        .into_iter()
        .map(|c| {
            let (wait, score) = c.score_at(now);
            (c, wait, score)
        })
        .collect();

    scored.sort_by(|(a, _, sa), (b, _, sb)| {
        sb.score
            .cmp(&sa.score)
            .then(a.arrival_time.cmp(&b.arrival_time))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (patient, wait_time, triage_score))| PrioritizedPatient {
            patient,
            wait_time,
            triage_score,
            queue_position: i + 1,
        })
        .collect()
}
