//! Additive triage scoring.
//!
//! Six independent factors each contribute a capped number of points. Each
//! factor is an ordered rule table of (predicate, points, recommendation);
//! symptom tiers, pain bands, consciousness and wait bands are first-match,
//! vital-sign rules stack.

use serde::{Deserialize, Serialize};

use super::keywords::{
    contains_any, CRITICAL_SYMPTOMS, DISCOMFORT_SYMPTOMS, HIGH_PRIORITY_SYMPTOMS,
};
use crate::models::{Consciousness, TriageCategory, VitalSigns};

/// Score at or above which escalation is always required.
pub const ESCALATION_SCORE: u32 = 7;
/// Prior wait, in minutes, above which escalation is required regardless of score.
pub const ESCALATION_WAIT_MINUTES: u32 = 90;

/// Everything the scorer looks at for one patient.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriageInput<'a> {
    pub symptoms: &'a str,
    pub age: Option<u32>,
    pub vital_signs: Option<&'a VitalSigns>,
    /// 0-10 scale.
    pub pain_level: Option<u8>,
    pub consciousness: Option<Consciousness>,
    /// Minutes already waited.
    pub wait_time: Option<u32>,
}

/// Points contributed by each factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub symptoms: u32,
    pub vital_signs: u32,
    pub pain_level: u32,
    pub consciousness: u32,
    pub age: u32,
    pub wait_time: u32,
}

impl FactorBreakdown {
    pub fn total(&self) -> u32 {
        self.symptoms
            + self.vital_signs
            + self.pain_level
            + self.consciousness
            + self.age
            + self.wait_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageScore {
    pub score: u32,
    pub category: TriageCategory,
    pub factors: FactorBreakdown,
    /// In the order the rules fired. Not deduplicated.
    pub recommendations: Vec<String>,
    pub escalation_required: bool,
}

// ── Rule tables ─────────────────────────────────────────────

struct SymptomTier {
    keywords: &'static [&'static str],
    points: u32,
    recommendation: Option<&'static str>,
}

/// Checked top to bottom; the first tier that matches is the only one applied.
static SYMPTOM_TIERS: &[SymptomTier] = &[
    SymptomTier {
        keywords: CRITICAL_SYMPTOMS,
        points: 4,
        recommendation: Some("Immediate medical attention required"),
    },
    SymptomTier {
        keywords: HIGH_PRIORITY_SYMPTOMS,
        points: 3,
        recommendation: Some("Urgent medical evaluation needed"),
    },
    SymptomTier {
        keywords: DISCOMFORT_SYMPTOMS,
        points: 2,
        recommendation: None,
    },
];

/// Points when no tier matches.
const BASELINE_SYMPTOM_POINTS: u32 = 1;

struct VitalRule {
    abnormal: fn(&VitalSigns) -> bool,
    points: u32,
    recommendation: &'static str,
}

fn low_oxygen(v: &VitalSigns) -> bool {
    v.oxygen_below(95.0)
}

/// Every rule is evaluated; points stack.
static VITAL_RULES: &[VitalRule] = &[
    VitalRule {
        abnormal: VitalSigns::heart_rate_abnormal,
        points: 2,
        recommendation: "Abnormal heart rate detected",
    },
    VitalRule {
        abnormal: VitalSigns::blood_pressure_abnormal,
        points: 2,
        recommendation: "Blood pressure abnormality",
    },
    VitalRule {
        abnormal: low_oxygen,
        points: 3,
        recommendation: "Low oxygen saturation - oxygen therapy needed",
    },
    VitalRule {
        abnormal: VitalSigns::temperature_abnormal,
        points: 1,
        recommendation: "Temperature abnormality",
    },
];

/// (minimum inclusive, points, recommendation), highest band first.
static PAIN_BANDS: &[(u8, u32, &str)] = &[
    (8, 2, "Severe pain management required"),
    (5, 1, "Pain management needed"),
];

/// (minimum exclusive, points, recommendation), highest band first.
static WAIT_BANDS: &[(u32, u32, &str)] = &[
    (120, 2, "Extended wait time - priority escalation"),
    (60, 1, "Monitor for condition changes"),
];

// ── Scoring ─────────────────────────────────────────────────

/// Score a patient. Total function: missing inputs contribute nothing.
pub fn calculate_triage_score(input: &TriageInput<'_>) -> TriageScore {
    let mut factors = FactorBreakdown::default();
    let mut recommendations: Vec<String> = Vec::new();
    let mut note = |r: &str| recommendations.push(r.to_string());

    let lower = input.symptoms.to_lowercase();
    match SYMPTOM_TIERS.iter().find(|t| contains_any(&lower, t.keywords)) {
        Some(tier) => {
            factors.symptoms = tier.points;
            if let Some(r) = tier.recommendation {
                note(r);
            }
        }
        None => factors.symptoms = BASELINE_SYMPTOM_POINTS,
    }

    if let Some(vitals) = input.vital_signs {
        for rule in VITAL_RULES.iter().filter(|r| (r.abnormal)(vitals)) {
            factors.vital_signs += rule.points;
            note(rule.recommendation);
        }
    }

    if let Some(pain) = input.pain_level {
        if let Some(&(_, points, r)) = PAIN_BANDS.iter().find(|(min, _, _)| pain >= *min) {
            factors.pain_level = points;
            note(r);
        }
    }

    match input.consciousness {
        Some(Consciousness::Unconscious) => {
            factors.consciousness = 3;
            note("Altered consciousness - immediate evaluation");
        }
        Some(Consciousness::Confused) => {
            factors.consciousness = 2;
            note("Mental status changes noted");
        }
        Some(Consciousness::Alert) | None => {}
    }

    if input.age.is_some_and(|age| age < 2 || age > 65) {
        factors.age = 1;
        note("Age-related priority consideration");
    }

    if let Some(wait) = input.wait_time {
        if let Some(&(_, points, r)) = WAIT_BANDS.iter().find(|(over, _, _)| wait > *over) {
            factors.wait_time = points;
            note(r);
        }
    }

    let score = factors.total();
    let escalation_required = score >= ESCALATION_SCORE
        || input.wait_time.is_some_and(|w| w > ESCALATION_WAIT_MINUTES);

    TriageScore {
        score,
        category: TriageCategory::from_score(score),
        factors,
        recommendations,
        escalation_required,
    }
}
