use uuid::Uuid;

use super::doctor::Doctor;
use super::queue_entry::QueueEntry;

#[derive(Debug, Default, Clone, Copy)]
pub struct QueueFilter {
    pub hospital_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl QueueFilter {
    pub fn hospital(hospital_id: Uuid) -> Self {
        Self {
            hospital_id: Some(hospital_id),
            department_id: None,
        }
    }

    pub fn matches(&self, entry: &QueueEntry) -> bool {
        self.hospital_id.map_or(true, |id| entry.hospital_id == id)
            && self.department_id.map_or(true, |id| entry.department_id == id)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DoctorFilter {
    pub hospital_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub available_only: bool,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        self.hospital_id.map_or(true, |id| doctor.hospital_id == id)
            && self.department_id.map_or(true, |id| doctor.department_id == id)
            && (!self.available_only || doctor.is_available)
    }
}
