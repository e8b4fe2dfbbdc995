use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PriorityLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub medical_record_number: String,
}

/// Registration payload: creates a patient and their queue entry in one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub symptoms: String,
    pub priority_level: PriorityLevel,
    pub hospital_id: Uuid,
    pub department_id: Uuid,
}
