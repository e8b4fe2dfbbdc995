use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::triage::keywords::{contains_any, ADVICE_CRITICAL, ADVICE_HIGH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Critical,
    High,
    Moderate,
}

pub fn urgency_level(symptoms: &str) -> UrgencyLevel {
    let lower = symptoms.to_lowercase();
    if contains_any(&lower, ADVICE_CRITICAL) {
        UrgencyLevel::Critical
    } else if contains_any(&lower, ADVICE_HIGH) {
        UrgencyLevel::High
    } else {
        UrgencyLevel::Moderate
    }
}

/// (keyword, staff guidance), first match wins.
static GUIDANCE: &[(&str, &str)] = &[
    (
        "chest pain",
        "Immediate cardiac evaluation required. Monitor vital signs continuously.",
    ),
    (
        "difficulty breathing",
        "Respiratory assessment needed. Ensure oxygen availability.",
    ),
    (
        "severe pain",
        "Pain management and underlying cause investigation required.",
    ),
];

const STANDARD_GUIDANCE: &str = "Standard emergency protocol. Monitor patient condition.";

pub fn staff_recommendation(symptoms: &str) -> &'static str {
    let lower = symptoms.to_lowercase();
    GUIDANCE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map_or(STANDARD_GUIDANCE, |&(_, text)| text)
}

/// A priority-1 case to advise on.
#[derive(Debug, Clone)]
pub struct EmergencyCase {
    pub entry_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: Option<String>,
    pub symptoms: String,
    pub arrival_time: NaiveDateTime,
    /// Latest predicted wait, if any prediction was made.
    pub predicted_wait: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyRecommendation {
    pub entry_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: Option<String>,
    pub symptoms: String,
    pub arrival_time: NaiveDateTime,
    pub wait_time: u32,
    pub urgency_level: UrgencyLevel,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyAdvice {
    pub total_emergencies: usize,
    /// Earliest arrival first.
    pub recommendations: Vec<EmergencyRecommendation>,
}

pub fn emergency_recommendations(mut cases: Vec<EmergencyCase>) -> EmergencyAdvice {
    cases.sort_by_key(|c| c.arrival_time);
    let recommendations: Vec<EmergencyRecommendation> = cases
        .into_iter()
        .map(|c| EmergencyRecommendation {
            urgency_level: urgency_level(&c.symptoms),
            recommendation: staff_recommendation(&c.symptoms),
            wait_time: c.predicted_wait.unwrap_or(0),
            entry_id: c.entry_id,
            patient_id: c.patient_id,
            patient_name: c.patient_name,
            symptoms: c.symptoms,
            arrival_time: c.arrival_time,
        })
        .collect();

    EmergencyAdvice {
        total_emergencies: recommendations.len(),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn case(symptoms: &str, minutes_ago: i64, predicted: Option<u32>) -> EmergencyCase {
        let now = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        EmergencyCase {
            entry_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: Some("Pat".into()),
            symptoms: symptoms.into(),
            arrival_time: now - Duration::minutes(minutes_ago),
            predicted_wait: predicted,
        }
    }

    #[test]
    fn urgency_bands() {
        assert_eq!(urgency_level("Heart attack suspected"), UrgencyLevel::Critical);
        assert_eq!(urgency_level("allergic reaction to nuts"), UrgencyLevel::High);
        assert_eq!(urgency_level("sprained wrist"), UrgencyLevel::Moderate);
    }

    #[test]
    fn guidance_first_match() {
        assert!(staff_recommendation("chest pain, difficulty breathing").starts_with("Immediate cardiac"));
        assert!(staff_recommendation("difficulty breathing").starts_with("Respiratory"));
        assert!(staff_recommendation("severe pain in leg").starts_with("Pain management"));
        assert_eq!(staff_recommendation("stroke"), STANDARD_GUIDANCE);
    }

    #[test]
    fn sorted_by_arrival_with_default_wait() {
        let late = case("chest pain", 5, Some(12));
        let early = case("high fever", 30, None);
        let advice = emergency_recommendations(vec![late.clone(), early.clone()]);
        assert_eq!(advice.total_emergencies, 2);
        assert_eq!(advice.recommendations[0].entry_id, early.entry_id);
        assert_eq!(advice.recommendations[0].wait_time, 0);
        assert_eq!(advice.recommendations[0].urgency_level, UrgencyLevel::High);
        assert_eq!(advice.recommendations[1].wait_time, 12);

        let json = serde_json::to_value(&advice.recommendations[1]).unwrap();
        assert_eq!(json["urgency_level"], "critical");
    }
}
