//! Optional LLM enrichment of predictions and allocation plans.
//!
//! The engine always produces a local result first. An [`Enricher`] may then
//! adjust it; any failure leaves the local result in place.

pub mod ollama;
pub mod parser;
pub mod prompt;

pub use ollama::{LlmClient, LlmEnricher, MockLlmClient, OllamaClient};
pub use parser::{parse_allocation_response, parse_prediction_response};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::estimation::wait_time::round_two;
use crate::estimation::Allocation;
use crate::models::{AiInsights, PriorityLevel, WaitTimePrediction};

/// Floor for an enriched estimate (minutes).
pub const MIN_ENRICHED_WAIT_MINUTES: i64 = 5;

const MIN_ENRICHED_CONFIDENCE: f64 = 0.3;
const MAX_ENRICHED_CONFIDENCE: f64 = 0.95;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Enrichment service is not reachable at {0}")]
    Unavailable(String),

    #[error("Enrichment request timed out after {0}s")]
    Timeout(u64),

    #[error("Enrichment service returned error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed enrichment response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    Json(String),

    #[error("Enrichment response is missing '{0}'")]
    MissingField(&'static str),
}

// ── Prediction ──────────────────────────────────────────

/// What the model is told about one waiting patient.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    pub symptoms: String,
    pub priority_level: PriorityLevel,
    pub age: Option<u32>,
    pub department_name: Option<String>,
    pub queue_length: usize,
    pub available_doctors: usize,
    pub time_of_day: String,
    pub basic_estimate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionEnrichment {
    /// Minutes added to the local estimate. May be negative.
    #[serde(default)]
    pub time_adjustment: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub patient_advice: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

// ── Allocation ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AllocationPatient {
    pub patient_id: Uuid,
    pub name: Option<String>,
    pub priority_level: PriorityLevel,
    pub symptoms: String,
    pub wait_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct AllocationDoctor {
    pub doctor_id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
    pub avg_consultation_time: u32,
    pub department_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct AllocationContext {
    pub patients: Vec<AllocationPatient>,
    pub doctors: Vec<AllocationDoctor>,
    pub basic: Vec<Allocation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRecommendation {
    pub doctor_id: Uuid,
    #[serde(default)]
    pub patient_ids: Vec<Uuid>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationEnrichment {
    pub recommendations: Vec<DoctorRecommendation>,
    pub overall_strategy: Option<String>,
}

/// Strategy for asking an external model to refine local results.
pub trait Enricher: Send + Sync {
    fn try_enrich_prediction(
        &self,
        ctx: &PredictionContext,
    ) -> Result<PredictionEnrichment, EnrichmentError>;

    fn try_enrich_allocation(
        &self,
        ctx: &AllocationContext,
    ) -> Result<AllocationEnrichment, EnrichmentError>;

    /// Whether the backing model can currently be reached.
    fn is_ready(&self) -> bool {
        true
    }
}

// ── Fallback combinators ────────────────────────────────

/// Fold a successful enrichment into the local prediction.
pub fn apply_prediction_enrichment(
    mut prediction: WaitTimePrediction,
    enrichment: PredictionEnrichment,
) -> WaitTimePrediction {
    // `as` saturates on out-of-range floats; the add must saturate too.
    let adjustment = enrichment
        .time_adjustment
        .filter(|a| a.is_finite())
        .unwrap_or(0.0)
        .round() as i64;
    let adjusted = i64::from(prediction.estimated_wait_time)
        .saturating_add(adjustment)
        .max(MIN_ENRICHED_WAIT_MINUTES);
    prediction.estimated_wait_time = u32::try_from(adjusted).unwrap_or(u32::MAX);

    if let Some(confidence) = enrichment.confidence.filter(|c| c.is_finite()) {
        prediction.confidence =
            round_two(confidence.clamp(MIN_ENRICHED_CONFIDENCE, MAX_ENRICHED_CONFIDENCE));
    }

    prediction.factors.ai_insights = Some(AiInsights {
        patient_advice: enrichment.patient_advice,
        reasoning: enrichment.reasoning,
    });
    prediction.factors.fallback_reason = None;
    prediction
}

/// Enrich the prediction, or return it unchanged with `fallback_reason` set.
pub fn enrich_prediction(
    enricher: &dyn Enricher,
    ctx: &PredictionContext,
    prediction: WaitTimePrediction,
) -> WaitTimePrediction {
    match enricher.try_enrich_prediction(ctx) {
        Ok(enrichment) => apply_prediction_enrichment(prediction, enrichment),
        Err(e) => {
            tracing::debug!(
                queue_entry_id = %prediction.queue_entry_id,
                error = %e,
                "Prediction enrichment failed, keeping local estimate"
            );
            let mut prediction = prediction;
            prediction.factors.fallback_reason = Some(e.to_string());
            prediction
        }
    }
}

/// Attach model reasoning to the local plan.
///
/// Patient assignments always come from the local optimizer; recommendations
/// for doctors missing from the plan are ignored.
pub fn apply_allocation_enrichment(
    mut allocations: Vec<Allocation>,
    enrichment: &AllocationEnrichment,
) -> Vec<Allocation> {
    for allocation in &mut allocations {
        if let Some(rec) = enrichment
            .recommendations
            .iter()
            .find(|r| r.doctor_id == allocation.doctor_id)
        {
            allocation.reasoning = rec.reasoning.clone();
        }
    }
    allocations
}

/// Enrich the plan. Returns the (possibly annotated) plan and the overall
/// strategy, if any.
pub fn enrich_allocation(
    enricher: &dyn Enricher,
    ctx: &AllocationContext,
    allocations: Vec<Allocation>,
) -> (Vec<Allocation>, Option<String>) {
    match enricher.try_enrich_allocation(ctx) {
        Ok(enrichment) => {
            let strategy = enrichment.overall_strategy.clone();
            (apply_allocation_enrichment(allocations, &enrichment), strategy)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Allocation enrichment failed, keeping local plan");
            (allocations, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PredictionFactors;

    fn prediction(estimate: u32) -> WaitTimePrediction {
        WaitTimePrediction {
            patient_id: Uuid::new_v4(),
            queue_entry_id: Uuid::new_v4(),
            estimated_wait_time: estimate,
            confidence: 0.8,
            factors: PredictionFactors {
                queue_length: 3,
                doctor_availability: 2,
                priority_level: PriorityLevel::Routine,
                avg_consultation_time: 20,
                time_of_day: "10:00".into(),
                ai_insights: None,
                fallback_reason: None,
            },
        }
    }

    fn context() -> PredictionContext {
        PredictionContext {
            symptoms: "cough".into(),
            priority_level: PriorityLevel::Routine,
            age: Some(40),
            department_name: Some("General Medicine".into()),
            queue_length: 3,
            available_doctors: 2,
            time_of_day: "10:00".into(),
            basic_estimate: 30,
        }
    }

    struct FailingEnricher;

    impl Enricher for FailingEnricher {
        fn try_enrich_prediction(
            &self,
            _ctx: &PredictionContext,
        ) -> Result<PredictionEnrichment, EnrichmentError> {
            Err(EnrichmentError::Timeout(20))
        }

        fn try_enrich_allocation(
            &self,
            _ctx: &AllocationContext,
        ) -> Result<AllocationEnrichment, EnrichmentError> {
            Err(EnrichmentError::Unavailable("http://localhost:11434".into()))
        }
    }

    #[test]
    fn adjustment_is_floored_at_five_minutes() {
        let enriched = apply_prediction_enrichment(
            prediction(12),
            PredictionEnrichment {
                time_adjustment: Some(-30.0),
                ..Default::default()
            },
        );
        assert_eq!(enriched.estimated_wait_time, 5);
        assert_eq!(enriched.confidence, 0.8);
        assert!(enriched.factors.ai_insights.is_some());
    }

    #[test]
    fn huge_adjustments_saturate_instead_of_wrapping() {
        let apply = |reply: &str| {
            let enrichment = parse_prediction_response(reply).unwrap();
            apply_prediction_enrichment(prediction(25), enrichment).estimated_wait_time
        };

        assert_eq!(apply(r#"{"timeAdjustment": 1e300}"#), u32::MAX);
        assert_eq!(apply(r#"{"timeAdjustment": 5000000000}"#), u32::MAX);
        assert_eq!(apply(r#"{"timeAdjustment": -1e300}"#), 5);
    }

    #[test]
    fn confidence_override_is_clamped() {
        let high = apply_prediction_enrichment(
            prediction(30),
            PredictionEnrichment {
                time_adjustment: Some(10.4),
                confidence: Some(1.5),
                patient_advice: Some("Stay hydrated".into()),
                reasoning: None,
            },
        );
        assert_eq!(high.estimated_wait_time, 40);
        assert_eq!(high.confidence, 0.95);
        assert_eq!(
            high.factors.ai_insights.unwrap().patient_advice.as_deref(),
            Some("Stay hydrated")
        );

        let low = apply_prediction_enrichment(
            prediction(30),
            PredictionEnrichment {
                confidence: Some(0.1),
                ..Default::default()
            },
        );
        assert_eq!(low.confidence, 0.3);
    }

    #[test]
    fn failure_keeps_local_prediction_with_reason() {
        let local = prediction(42);
        let result = enrich_prediction(&FailingEnricher, &context(), local.clone());
        assert_eq!(result.estimated_wait_time, 42);
        assert_eq!(result.confidence, local.confidence);
        assert!(result.factors.ai_insights.is_none());
        assert!(result
            .factors
            .fallback_reason
            .unwrap()
            .contains("timed out"));
    }

    #[test]
    fn allocation_reasoning_only_annotates() {
        let doctor = Uuid::new_v4();
        let patient = Uuid::new_v4();
        let plan = vec![Allocation {
            doctor_id: doctor,
            patient_ids: vec![patient],
            reasoning: None,
        }];
        let enrichment = AllocationEnrichment {
            recommendations: vec![
                DoctorRecommendation {
                    doctor_id: doctor,
                    patient_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
                    reasoning: Some("Emergency first".into()),
                },
                DoctorRecommendation {
                    doctor_id: Uuid::new_v4(),
                    patient_ids: vec![],
                    reasoning: Some("Unknown doctor".into()),
                },
            ],
            overall_strategy: Some("Balance load".into()),
        };

        let annotated = apply_allocation_enrichment(plan, &enrichment);
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].patient_ids, vec![patient]);
        assert_eq!(annotated[0].reasoning.as_deref(), Some("Emergency first"));
    }

    #[test]
    fn allocation_failure_returns_plan_untouched() {
        let plan = vec![Allocation {
            doctor_id: Uuid::new_v4(),
            patient_ids: vec![Uuid::new_v4()],
            reasoning: None,
        }];
        let ctx = AllocationContext {
            patients: vec![],
            doctors: vec![],
            basic: plan.clone(),
        };
        let (result, strategy) = enrich_allocation(&FailingEnricher, &ctx, plan.clone());
        assert_eq!(result, plan);
        assert!(strategy.is_none());
    }
}
