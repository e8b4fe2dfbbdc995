use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DepartmentType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub department_type: DepartmentType,
    /// Maximum simultaneous patients the department is staffed for.
    pub capacity: u32,
}
