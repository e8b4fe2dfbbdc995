use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{PriorityLevel, TriageCategory};
use crate::triage::{
    prioritize_patients, requires_immediate_escalation, EscalationCheck, PrioritizedPatient,
    TriageCandidate, TriageScore,
};

/// A prioritized patient that needs escalation now.
#[derive(Debug, Clone, Serialize)]
pub struct Escalation {
    pub patient: TriageCandidate,
    pub queue_position: usize,
    pub triage_score: TriageScore,
    /// Result of the immediate-escalation rules. `required` may be false when
    /// the triage score alone triggered the escalation.
    pub escalation: EscalationCheck,
}

/// Emergency picture for one hospital.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyOverview {
    pub total_emergencies: usize,
    pub prioritized_patients: Vec<PrioritizedPatient>,
    /// Each patient at most once, in prioritized order.
    pub escalations: Vec<Escalation>,
    pub critical_count: usize,
    pub emergent_count: usize,
}

/// Re-scores emergency and urgent entries and picks out those needing
/// escalation. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    /// Least urgent priority still considered an emergency case.
    pub max_priority: PriorityLevel,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            max_priority: PriorityLevel::Urgent,
        }
    }
}

impl EscalationPolicy {
    pub fn evaluate(&self, candidates: Vec<TriageCandidate>, now: NaiveDateTime) -> EmergencyOverview {
        let emergencies: Vec<TriageCandidate> = candidates
            .into_iter()
            .filter(|c| c.priority_level <= self.max_priority)
            .collect();
        let total_emergencies = emergencies.len();

        let prioritized_patients = prioritize_patients(emergencies, now);

        let escalations: Vec<Escalation> = prioritized_patients
            .iter()
            .filter_map(|p| {
                let check = requires_immediate_escalation(
                    &p.patient.symptoms,
                    p.wait_time,
                    p.patient.vital_signs.as_ref(),
                );
                (p.triage_score.escalation_required || check.required).then(|| Escalation {
                    patient: p.patient.clone(),
                    queue_position: p.queue_position,
                    triage_score: p.triage_score.clone(),
                    escalation: check,
                })
            })
            .collect();

        let count = |category: TriageCategory| {
            prioritized_patients
                .iter()
                .filter(|p| p.triage_score.category == category)
                .count()
        };
        let critical_count = count(TriageCategory::Resuscitation);
        let emergent_count = count(TriageCategory::Emergent);

        EmergencyOverview {
            total_emergencies,
            prioritized_patients,
            escalations,
            critical_count,
            emergent_count,
        }
    }
}
