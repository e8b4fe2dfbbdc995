use std::fmt::Write;

use super::{AllocationContext, PredictionContext};

pub const PREDICTION_SYSTEM_PROMPT: &str = "You are a medical operations assistant helping \
estimate hospital wait times. Give practical, evidence-based insights and be considerate of \
patient concerns. Answer with a single JSON object and nothing else.";

pub const ALLOCATION_SYSTEM_PROMPT: &str = "You are a medical operations assistant optimizing \
patient flow in a hospital. Focus on patient safety, efficient use of staff and shorter waits. \
Answer with a single JSON object and nothing else.";

/// Build the wait-time prompt for one patient.
pub fn build_prediction_prompt(ctx: &PredictionContext) -> String {
    let age = ctx
        .age
        .map_or_else(|| "Unknown".to_string(), |a| a.to_string());
    let department = ctx.department_name.as_deref().unwrap_or("Unknown");

    format!(
        r#"Patient:
- Symptoms: {symptoms}
- Priority level: {priority} (1=emergency, 2=urgent, 3=routine, 4=follow-up)
- Age: {age}

Department situation:
- Department: {department}
- Patients waiting ahead or alongside: {queue_length}
- Available doctors: {doctors}
- Time of day: {time}

Local estimate: {estimate} minutes

Consider symptom complexity and possible complications, advice for the patient while
waiting, and how certain the estimate is.

Respond with JSON:
{{ "timeAdjustment": number, "confidence": number, "patientAdvice": string, "reasoning": string }}"#,
        symptoms = ctx.symptoms,
        priority = ctx.priority_level.level(),
        queue_length = ctx.queue_length,
        doctors = ctx.available_doctors,
        time = ctx.time_of_day,
        estimate = ctx.basic_estimate,
    )
}

/// Build the allocation prompt for a department or hospital.
pub fn build_allocation_prompt(ctx: &AllocationContext) -> String {
    let mut prompt = String::from("Patients waiting:\n");
    for p in &ctx.patients {
        let _ = writeln!(
            prompt,
            "- {} ({}), priority {}, waiting {} min: {}",
            p.name.as_deref().unwrap_or("Unnamed"),
            p.patient_id,
            p.priority_level.level(),
            p.wait_minutes,
            p.symptoms,
        );
    }

    prompt.push_str("\nAvailable doctors:\n");
    for d in &ctx.doctors {
        let _ = writeln!(
            prompt,
            "- Dr. {} ({}), {}, avg consultation {} min, department {}",
            d.name,
            d.doctor_id,
            d.specialization.as_deref().unwrap_or("general"),
            d.avg_consultation_time,
            d.department_id,
        );
    }

    prompt.push_str("\nCurrent allocation:\n");
    for a in &ctx.basic {
        let _ = writeln!(
            prompt,
            "- Doctor {}: {} patients assigned",
            a.doctor_id,
            a.patient_ids.len()
        );
    }

    prompt.push_str(
        r#"
Recommend improvements considering patient priority and symptom complexity, doctor
specialization, workload balance and emergency handling. Use the ids exactly as given.

Respond with JSON:
{ "recommendations": [{"doctorId": string, "patientIds": [string], "reasoning": string}], "overallStrategy": string }"#,
    );
    prompt
}
