use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
    /// Average consultation length in minutes. Always > 0.
    pub avg_consultation_time: u32,
    pub is_available: bool,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
}

impl Doctor {
    /// Reject rosters that would make capacity or wait math meaningless.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.avg_consultation_time == 0 {
            return Err(DatabaseError::ConstraintViolation(format!(
                "doctor {} has a zero average consultation time",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(avg: u32, start: (u32, u32), end: (u32, u32)) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            name: "Dr. Test".into(),
            specialization: None,
            avg_consultation_time: avg,
            is_available: true,
            shift_start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn zero_consultation_time_is_rejected() {
        assert!(doctor(0, (9, 0), (17, 0)).validate().is_err());
        assert!(doctor(15, (9, 0), (17, 0)).validate().is_ok());
    }
}
