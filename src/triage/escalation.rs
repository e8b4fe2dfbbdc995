//! Immediate escalation check.
//!
//! Fires on the symptom text, the wait so far and, when available, oxygen
//! saturation. Rules are checked in order and the first match wins.

use serde::Serialize;

use super::keywords::{contains_any, first_match, HIGH_PRIORITY_SYMPTOMS, LIFE_THREATENING_SYMPTOMS};
use super::protocols::{first_protocol_for, EmergencyProtocol};
use crate::models::VitalSigns;

/// Outcome of [`requires_immediate_escalation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationCheck {
    pub required: bool,
    /// Which rule fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<&'static EmergencyProtocol>,
}

impl EscalationCheck {
    pub fn not_required() -> Self {
        Self {
            required: false,
            rule_id: None,
            reason: None,
            protocol: None,
        }
    }
}

struct EscalationRule {
    id: &'static str,
    condition: EscalationCondition,
}

enum EscalationCondition {
    /// Any life-threatening keyword, named in the reason.
    LifeThreateningKeyword,
    /// Waited longer than `minutes` with a high-priority complaint.
    ProlongedHighPriorityWait { minutes: u32 },
    /// Oxygen saturation strictly below `percent`.
    OxygenBelow { percent: f64 },
}

fn rules() -> [EscalationRule; 3] {
    [
        EscalationRule {
            id: "ESC-001",
            condition: EscalationCondition::LifeThreateningKeyword,
        },
        EscalationRule {
            id: "ESC-002",
            condition: EscalationCondition::ProlongedHighPriorityWait { minutes: 60 },
        },
        EscalationRule {
            id: "ESC-003",
            condition: EscalationCondition::OxygenBelow { percent: 90.0 },
        },
    ]
}

struct Fired {
    reason: String,
    protocol: Option<&'static EmergencyProtocol>,
}

impl EscalationCondition {
    fn evaluate(
        &self,
        symptoms: &str,
        lower: &str,
        wait_minutes: u32,
        vitals: Option<&VitalSigns>,
    ) -> Option<Fired> {
        match self {
            Self::LifeThreateningKeyword => {
                first_match(lower, LIFE_THREATENING_SYMPTOMS).map(|kw| Fired {
                    reason: format!("Critical symptom detected: {kw}"),
                    protocol: first_protocol_for(lower),
                })
            }
            Self::ProlongedHighPriorityWait { minutes } => {
                (wait_minutes > *minutes && contains_any(lower, HIGH_PRIORITY_SYMPTOMS)).then(|| {
                    Fired {
                        reason: format!("High-priority patient waiting over 1 hour: {symptoms}"),
                        protocol: None,
                    }
                })
            }
            Self::OxygenBelow { percent } => vitals
                .is_some_and(|v| v.oxygen_below(*percent))
                .then(|| Fired {
                    reason: "Critical oxygen saturation level".into(),
                    protocol: None,
                }),
        }
    }
}

/// Whether the patient must be seen now, and why.
pub fn requires_immediate_escalation(
    symptoms: &str,
    wait_minutes: u32,
    vitals: Option<&VitalSigns>,
) -> EscalationCheck {
    let lower = symptoms.to_lowercase();

    for rule in rules() {
        if let Some(fired) = rule.condition.evaluate(symptoms, &lower, wait_minutes, vitals) {
            tracing::warn!(
                rule_id = rule.id,
                protocol = fired.protocol.map(|p| p.id),
                "Immediate escalation rule fired"
            );
            return EscalationCheck {
                required: true,
                rule_id: Some(rule.id),
                reason: Some(fired.reason),
                protocol: fired.protocol,
            };
        }
    }

    EscalationCheck::not_required()
}
