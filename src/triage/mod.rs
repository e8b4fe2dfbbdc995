//! Triage scoring: severity score and category, emergency protocol lookup,
//! immediate-escalation check and severity-ordered patient lists.

pub mod escalation;
pub mod keywords;
pub mod prioritize;
pub mod protocols;
pub mod scorer;

pub use escalation::{requires_immediate_escalation, EscalationCheck};
pub use prioritize::{prioritize_patients, PrioritizedPatient, TriageCandidate};
pub use protocols::{applicable_protocols, EmergencyProtocol};
pub use scorer::{calculate_triage_score, FactorBreakdown, TriageInput, TriageScore};
