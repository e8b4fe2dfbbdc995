//! Queue service: composes the store, the queue engine and optional
//! enrichment into the operations exposed over HTTP and used by the
//! escalation monitor.
//!
//! All methods are synchronous. Methods that may call an [`Enricher`] block
//! on network I/O and must run on a blocking thread inside the runtime.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{DatabaseError, QueueRepository};
use crate::enrichment::{
    enrich_allocation, enrich_prediction, AllocationContext, AllocationDoctor, AllocationPatient,
    Enricher, PredictionContext,
};
use crate::escalation::{
    emergency_recommendations, EmergencyAdvice, EmergencyCase, EmergencyOverview, EscalationPolicy,
};
use crate::estimation::{self, Allocation, QueueStatusSummary};
use crate::models::*;
use crate::triage::{
    applicable_protocols, calculate_triage_score, requires_immediate_escalation, EmergencyProtocol,
    EscalationCheck, TriageCandidate, TriageInput, TriageScore,
};

/// Oldest age accepted at registration.
const MAX_PATIENT_AGE: u32 = 150;

/// Highest value on the pain scale.
const MAX_PAIN_LEVEL: u8 = 10;

const ENRICHMENT_NOT_CONFIGURED: &str = "Enrichment is not configured";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// Request and response types
// ═══════════════════════════════════════════════════════════

/// A queue entry joined with the names a front desk needs.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntryView {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub patient: Option<Patient>,
    pub department_name: Option<String>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub patient: Patient,
    pub queue_entry: QueueEntry,
    pub prediction: WaitTimePrediction,
}

/// Bedside observations for a triage assessment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriageAssessment {
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub pain_level: Option<u8>,
    #[serde(default)]
    pub consciousness: Option<Consciousness>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub queue_entry_id: Uuid,
    pub triage_score: TriageScore,
    pub escalation: EscalationCheck,
    pub protocols: Vec<&'static EmergencyProtocol>,
    pub priority_updated: bool,
    pub new_priority_level: PriorityLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationPlan {
    pub allocations: Vec<Allocation>,
    pub total_patients: usize,
    pub available_doctors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub optimization_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientPosition {
    pub patient_id: Uuid,
    pub queue_entry_id: Uuid,
    pub position: usize,
    pub estimated_wait_time: Option<u32>,
    pub priority_level: PriorityLevel,
}

// ═══════════════════════════════════════════════════════════
// QueueService
// ═══════════════════════════════════════════════════════════

pub struct QueueService {
    store: Arc<dyn QueueRepository>,
    enricher: Option<Arc<dyn Enricher>>,
    policy: EscalationPolicy,
}

impl QueueService {
    pub fn new(store: Arc<dyn QueueRepository>) -> Self {
        Self {
            store,
            enricher: None,
            policy: EscalationPolicy::default(),
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `None` when no enricher is configured.
    pub fn enrichment_ready(&self) -> Option<bool> {
        self.enricher.as_ref().map(|e| e.is_ready())
    }

    pub fn hospitals(&self) -> Result<Vec<Hospital>, ServiceError> {
        Ok(self.store.hospitals()?)
    }

    pub fn departments(&self, hospital_id: Option<Uuid>) -> Result<Vec<Department>, ServiceError> {
        Ok(self.store.departments(hospital_id)?)
    }

    /// Waiting entries in service order, joined with patient, department
    /// and doctor names.
    pub fn queue(&self, filter: &QueueFilter) -> Result<Vec<QueueEntryView>, ServiceError> {
        let mut entries = self.store.waiting_entries(filter)?;
        entries.sort_by(service_order);

        let departments: HashMap<Uuid, String> = self
            .store
            .departments(filter.hospital_id)?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        let doctors: HashMap<Uuid, String> = self
            .store
            .doctors(&DoctorFilter {
                hospital_id: filter.hospital_id,
                ..Default::default()
            })?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        entries
            .into_iter()
            .map(|entry| {
                Ok(QueueEntryView {
                    patient: self.store.get_patient(&entry.patient_id)?,
                    department_name: departments.get(&entry.department_id).cloned(),
                    doctor_name: entry.doctor_id.and_then(|id| doctors.get(&id).cloned()),
                    entry,
                })
            })
            .collect()
    }

    // ── Registration ────────────────────────────────────

    pub fn register_patient(
        &self,
        new: NewPatient,
        use_enrichment: bool,
        now: NaiveDateTime,
    ) -> Result<Registration, ServiceError> {
        validate_registration(&new)?;

        let (patient, entry) = self.store.register_patient(new, now)?;
        let prediction = self.predict_for(&entry, Some(&patient), use_enrichment, now)?;
        let queue_entry = self.store.get_entry(&entry.id)?.unwrap_or(entry);

        Ok(Registration {
            patient,
            queue_entry,
            prediction,
        })
    }

    // ── Wait-time prediction ────────────────────────────

    /// Predict, persist the prediction and store the estimate on the entry.
    pub fn predict_wait_time(
        &self,
        entry_id: &Uuid,
        use_enrichment: bool,
        now: NaiveDateTime,
    ) -> Result<WaitTimePrediction, ServiceError> {
        let entry = self.require_entry(entry_id)?;
        let patient = self.store.get_patient(&entry.patient_id)?;
        self.predict_for(&entry, patient.as_ref(), use_enrichment, now)
    }

    fn predict_for(
        &self,
        entry: &QueueEntry,
        patient: Option<&Patient>,
        use_enrichment: bool,
        now: NaiveDateTime,
    ) -> Result<WaitTimePrediction, ServiceError> {
        let current_queue = self.store.waiting_entries(&QueueFilter {
            hospital_id: Some(entry.hospital_id),
            department_id: Some(entry.department_id),
        })?;
        let doctors = self.store.doctors(&DoctorFilter {
            hospital_id: Some(entry.hospital_id),
            department_id: Some(entry.department_id),
            available_only: true,
        })?;

        let mut prediction = estimation::predict_wait_time(entry, &current_queue, &doctors, now);

        if use_enrichment {
            prediction = match &self.enricher {
                Some(enricher) => {
                    let ctx = PredictionContext {
                        symptoms: entry.symptoms.clone(),
                        priority_level: entry.priority_level,
                        age: patient.and_then(|p| p.age),
                        department_name: self.department_name(entry)?,
                        queue_length: current_queue.len(),
                        available_doctors: doctors.len(),
                        time_of_day: prediction.factors.time_of_day.clone(),
                        basic_estimate: prediction.estimated_wait_time,
                    };
                    enrich_prediction(enricher.as_ref(), &ctx, prediction)
                }
                None => {
                    prediction.factors.fallback_reason = Some(ENRICHMENT_NOT_CONFIGURED.into());
                    prediction
                }
            };
        }

        self.store
            .append_prediction(WaitPredictionRecord::from_prediction(&prediction, now))?;
        let estimate = prediction.estimated_wait_time;
        self.store.update_entry_with(&entry.id, &mut |e| {
            e.estimated_wait_time = Some(estimate);
            e.updated_at = now;
            Ok(())
        })?;

        tracing::info!(
            queue_entry_id = %entry.id,
            estimated_wait_time = estimate,
            confidence = prediction.confidence,
            "Wait time predicted"
        );
        Ok(prediction)
    }

    fn department_name(&self, entry: &QueueEntry) -> Result<Option<String>, ServiceError> {
        Ok(self
            .store
            .departments(Some(entry.hospital_id))?
            .into_iter()
            .find(|d| d.id == entry.department_id)
            .map(|d| d.name))
    }

    // ── Triage ──────────────────────────────────────────

    /// Score the entry with fresh observations and revise its priority to
    /// match the triage category. Only waiting entries are re-prioritized.
    pub fn assess_triage(
        &self,
        entry_id: &Uuid,
        assessment: &TriageAssessment,
        now: NaiveDateTime,
    ) -> Result<TriageOutcome, ServiceError> {
        if assessment.pain_level.is_some_and(|p| p > MAX_PAIN_LEVEL) {
            return Err(ServiceError::Validation(format!(
                "pain_level must be between 0 and {MAX_PAIN_LEVEL}"
            )));
        }

        let entry = self.require_entry(entry_id)?;
        let age = self.store.get_patient(&entry.patient_id)?.and_then(|p| p.age);

        let mut scored: Option<(TriageScore, u32, bool, PriorityLevel)> = None;
        self.store.update_entry_with(entry_id, &mut |e| {
            let wait = e.waiting_minutes(now);
            let score = calculate_triage_score(&TriageInput {
                symptoms: &e.symptoms,
                age,
                vital_signs: assessment.vital_signs.as_ref(),
                pain_level: assessment.pain_level,
                consciousness: assessment.consciousness,
                wait_time: Some(wait),
            });
            let revised = PriorityLevel::from_category(score.category);
            let updated = e.is_waiting() && revised != e.priority_level;
            if updated {
                e.priority_level = revised;
                e.updated_at = now;
            }
            scored = Some((score, wait, updated, revised));
            Ok(())
        })?;

        let (triage_score, wait, priority_updated, new_priority_level) = scored.ok_or_else(|| {
            ServiceError::Database(DatabaseError::not_found("queue_entry", entry_id))
        })?;

        let escalation =
            requires_immediate_escalation(&entry.symptoms, wait, assessment.vital_signs.as_ref());

        if priority_updated {
            tracing::info!(
                queue_entry_id = %entry_id,
                from = entry.priority_level.level(),
                to = new_priority_level.level(),
                "Priority revised by triage"
            );
        }

        Ok(TriageOutcome {
            queue_entry_id: *entry_id,
            triage_score,
            escalation,
            protocols: applicable_protocols(&entry.symptoms),
            priority_updated,
            new_priority_level,
        })
    }

    // ── Emergencies ─────────────────────────────────────

    fn candidates(&self, hospital_id: Uuid) -> Result<Vec<TriageCandidate>, ServiceError> {
        self.store
            .waiting_entries(&QueueFilter::hospital(hospital_id))?
            .into_iter()
            .map(|e| {
                let patient = self.store.get_patient(&e.patient_id)?;
                Ok(TriageCandidate {
                    entry_id: e.id,
                    patient_id: e.patient_id,
                    patient_name: patient.as_ref().map(|p| p.name.clone()),
                    priority_level: e.priority_level,
                    symptoms: e.symptoms,
                    age: patient.and_then(|p| p.age),
                    arrival_time: e.arrival_time,
                    vital_signs: None,
                    pain_level: None,
                    consciousness: None,
                })
            })
            .collect()
    }

    pub fn emergency_overview(
        &self,
        hospital_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<EmergencyOverview, ServiceError> {
        let candidates = self.candidates(hospital_id)?;
        Ok(self.policy.evaluate(candidates, now))
    }

    /// Staff guidance for every waiting priority-1 case.
    pub fn emergency_recommendations(
        &self,
        hospital_id: Uuid,
    ) -> Result<EmergencyAdvice, ServiceError> {
        let cases = self
            .store
            .waiting_entries(&QueueFilter::hospital(hospital_id))?
            .into_iter()
            .filter(|e| e.priority_level == PriorityLevel::Emergency)
            .map(|e| {
                let patient_name = self.store.get_patient(&e.patient_id)?.map(|p| p.name);
                let predicted_wait = self
                    .store
                    .latest_prediction(&e.id)?
                    .map(|r| r.predicted_wait_time);
                Ok(EmergencyCase {
                    entry_id: e.id,
                    patient_id: e.patient_id,
                    patient_name,
                    symptoms: e.symptoms,
                    arrival_time: e.arrival_time,
                    predicted_wait,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(emergency_recommendations(cases))
    }

    // ── Allocation ──────────────────────────────────────

    pub fn optimize_allocation(
        &self,
        hospital_id: Uuid,
        department_id: Option<Uuid>,
        use_enrichment: bool,
        now: NaiveDateTime,
    ) -> Result<AllocationPlan, ServiceError> {
        let entries = self.store.waiting_entries(&QueueFilter {
            hospital_id: Some(hospital_id),
            department_id,
        })?;
        let doctors = self.store.doctors(&DoctorFilter {
            hospital_id: Some(hospital_id),
            department_id,
            available_only: true,
        })?;

        if entries.is_empty() {
            return Ok(AllocationPlan {
                allocations: Vec::new(),
                total_patients: 0,
                available_doctors: doctors.len(),
                overall_strategy: None,
                message: Some("No patients in queue".into()),
                optimization_timestamp: now,
            });
        }

        let mut allocations = estimation::optimize_allocation(&entries, &doctors);
        let mut overall_strategy = None;

        if use_enrichment {
            if let Some(enricher) = &self.enricher {
                let ctx = self.allocation_context(&entries, &doctors, &allocations, now)?;
                let (enriched, strategy) = enrich_allocation(enricher.as_ref(), &ctx, allocations);
                allocations = enriched;
                overall_strategy = strategy;
            }
        }

        tracing::info!(
            %hospital_id,
            patients = entries.len(),
            doctors = doctors.len(),
            "Allocation optimized"
        );

        Ok(AllocationPlan {
            allocations,
            total_patients: entries.len(),
            available_doctors: doctors.len(),
            overall_strategy,
            message: None,
            optimization_timestamp: now,
        })
    }

    fn allocation_context(
        &self,
        entries: &[QueueEntry],
        doctors: &[Doctor],
        basic: &[Allocation],
        now: NaiveDateTime,
    ) -> Result<AllocationContext, ServiceError> {
        let patients = entries
            .iter()
            .map(|e| {
                Ok(AllocationPatient {
                    patient_id: e.patient_id,
                    name: self.store.get_patient(&e.patient_id)?.map(|p| p.name),
                    priority_level: e.priority_level,
                    symptoms: e.symptoms.clone(),
                    wait_minutes: e.waiting_minutes(now),
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(AllocationContext {
            patients,
            doctors: doctors
                .iter()
                .map(|d| AllocationDoctor {
                    doctor_id: d.id,
                    name: d.name.clone(),
                    specialization: d.specialization.clone(),
                    avg_consultation_time: d.avg_consultation_time,
                    department_id: d.department_id,
                })
                .collect(),
            basic: basic.to_vec(),
        })
    }

    // ── Status and statistics ───────────────────────────

    pub fn update_status(
        &self,
        entry_id: &Uuid,
        status: QueueStatus,
        now: NaiveDateTime,
    ) -> Result<QueueEntry, ServiceError> {
        let entry = self
            .store
            .update_entry_with(entry_id, &mut |e| e.apply_status(status, now))?;
        tracing::info!(queue_entry_id = %entry_id, status = %status.as_str(), "Queue status changed");
        Ok(entry)
    }

    pub fn queue_status(&self, hospital_id: Uuid) -> Result<QueueStatusSummary, ServiceError> {
        let entries = self.store.waiting_entries(&QueueFilter::hospital(hospital_id))?;
        let departments = self.store.departments(Some(hospital_id))?;
        Ok(estimation::queue_status(&entries, &departments))
    }

    pub fn patient_position(&self, patient_id: &Uuid) -> Result<PatientPosition, ServiceError> {
        let entries = self.store.waiting_entries(&QueueFilter::default())?;
        let not_waiting = || DatabaseError::not_found("waiting_patient", patient_id);

        let own = entries
            .iter()
            .find(|e| e.patient_id == *patient_id)
            .ok_or_else(not_waiting)?;
        let position = estimation::patient_position(&entries, patient_id).ok_or_else(not_waiting)?;

        Ok(PatientPosition {
            patient_id: *patient_id,
            queue_entry_id: own.id,
            position,
            estimated_wait_time: own.estimated_wait_time,
            priority_level: own.priority_level,
        })
    }

    fn require_entry(&self, entry_id: &Uuid) -> Result<QueueEntry, ServiceError> {
        self.store
            .get_entry(entry_id)?
            .ok_or_else(|| DatabaseError::not_found("queue_entry", entry_id).into())
    }
}

fn validate_registration(new: &NewPatient) -> Result<(), ServiceError> {
    if new.name.trim().is_empty() {
        return Err(ServiceError::Validation("name is required".into()));
    }
    if new.symptoms.trim().is_empty() {
        return Err(ServiceError::Validation("symptoms are required".into()));
    }
    if new.age.is_some_and(|a| a > MAX_PATIENT_AGE) {
        return Err(ServiceError::Validation(format!(
            "age must be at most {MAX_PATIENT_AGE}"
        )));
    }
    Ok(())
}
