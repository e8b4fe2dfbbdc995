use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::{DatabaseError, EntryUpdate, QueueRepository};
use crate::models::*;

#[derive(Default)]
struct StoreState {
    hospitals: Vec<Hospital>,
    departments: Vec<Department>,
    doctors: Vec<Doctor>,
    patients: HashMap<Uuid, Patient>,
    /// Registration order.
    entries: Vec<QueueEntry>,
    predictions: HashMap<Uuid, Vec<WaitPredictionRecord>>,
}

/// In-memory queue store backed by a single RwLock.
/// Every write happens under the write guard, so a read-modify-write
/// through `update_entry_with` is never interleaved with another write.
pub struct InMemoryQueueStore {
    state: RwLock<StoreState>,
}

impl Default for InMemoryQueueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, DatabaseError> {
        self.state.read().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, DatabaseError> {
        self.state.write().map_err(|_| DatabaseError::LockPoisoned)
    }

    pub fn insert_hospital(&self, hospital: Hospital) -> Result<(), DatabaseError> {
        self.write()?.hospitals.push(hospital);
        Ok(())
    }

    pub fn insert_department(&self, department: Department) -> Result<(), DatabaseError> {
        let mut state = self.write()?;
        if !state.hospitals.iter().any(|h| h.id == department.hospital_id) {
            return Err(DatabaseError::not_found("Hospital", department.hospital_id));
        }
        state.departments.push(department);
        Ok(())
    }

    pub fn insert_patient(&self, patient: Patient) -> Result<(), DatabaseError> {
        self.write()?.patients.insert(patient.id, patient);
        Ok(())
    }

    /// Insert an entry as-is (demo data, imports). Registration goes through
    /// [`QueueRepository::register_patient`].
    pub fn insert_entry(&self, entry: QueueEntry) -> Result<(), DatabaseError> {
        let mut state = self.write()?;
        if !state.patients.contains_key(&entry.patient_id) {
            return Err(DatabaseError::not_found("Patient", entry.patient_id));
        }
        if state.entries.iter().any(|e| e.id == entry.id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "queue entry {} already exists",
                entry.id
            )));
        }
        state.entries.push(entry);
        Ok(())
    }
}

impl QueueRepository for InMemoryQueueStore {
    fn hospitals(&self) -> Result<Vec<Hospital>, DatabaseError> {
        Ok(self.read()?.hospitals.clone())
    }

    fn departments(&self, hospital_id: Option<Uuid>) -> Result<Vec<Department>, DatabaseError> {
        let state = self.read()?;
        Ok(state
            .departments
            .iter()
            .filter(|d| hospital_id.map_or(true, |id| d.hospital_id == id))
            .cloned()
            .collect())
    }

    fn doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DatabaseError> {
        let state = self.read()?;
        Ok(state
            .doctors
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    fn insert_doctor(&self, doctor: Doctor) -> Result<(), DatabaseError> {
        doctor.validate()?;
        let mut state = self.write()?;
        if !state.departments.iter().any(|d| d.id == doctor.department_id) {
            return Err(DatabaseError::not_found("Department", doctor.department_id));
        }
        state.doctors.push(doctor);
        Ok(())
    }

    fn get_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        Ok(self.read()?.patients.get(id).cloned())
    }

    fn register_patient(
        &self,
        new: NewPatient,
        now: NaiveDateTime,
    ) -> Result<(Patient, QueueEntry), DatabaseError> {
        let mut state = self.write()?;

        let department_known = state
            .departments
            .iter()
            .any(|d| d.id == new.department_id && d.hospital_id == new.hospital_id);
        if !department_known {
            return Err(DatabaseError::not_found("Department", new.department_id));
        }

        let patient_id = Uuid::new_v4();
        let patient = Patient {
            id: patient_id,
            name: new.name,
            phone: new.phone,
            age: new.age,
            gender: new.gender,
            medical_record_number: medical_record_number(&patient_id),
        };

        let assigned = state
            .doctors
            .iter()
            .find(|d| d.department_id == new.department_id && d.is_available)
            .map(|d| d.id);

        let mut entry = QueueEntry::new(
            patient_id,
            new.hospital_id,
            new.department_id,
            new.priority_level,
            new.symptoms,
            now,
        );
        entry.doctor_id = assigned;

        state.patients.insert(patient_id, patient.clone());
        state.entries.push(entry.clone());

        tracing::info!(
            entry_id = %entry.id,
            department_id = %entry.department_id,
            priority = entry.priority_level.level(),
            "Patient registered in queue"
        );

        Ok((patient, entry))
    }

    fn entries(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, DatabaseError> {
        let state = self.read()?;
        Ok(state
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    fn get_entry(&self, id: &Uuid) -> Result<Option<QueueEntry>, DatabaseError> {
        Ok(self.read()?.entries.iter().find(|e| e.id == *id).cloned())
    }

    fn update_entry_with(
        &self,
        id: &Uuid,
        update: EntryUpdate<'_>,
    ) -> Result<QueueEntry, DatabaseError> {
        let mut state = self.write()?;
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| DatabaseError::not_found("QueueEntry", id))?;

        // Work on a copy so a failed update leaves the stored entry intact.
        let mut draft = slot.clone();
        update(&mut draft)?;

        if draft.id != slot.id {
            return Err(DatabaseError::ConstraintViolation(
                "queue entry id is immutable".into(),
            ));
        }
        if draft.arrival_time != slot.arrival_time {
            return Err(DatabaseError::ConstraintViolation(
                "arrival_time is immutable once set".into(),
            ));
        }

        *slot = draft;
        Ok(slot.clone())
    }

    fn append_prediction(&self, record: WaitPredictionRecord) -> Result<(), DatabaseError> {
        let mut state = self.write()?;
        if !state.entries.iter().any(|e| e.id == record.queue_entry_id) {
            return Err(DatabaseError::not_found("QueueEntry", record.queue_entry_id));
        }
        state
            .predictions
            .entry(record.queue_entry_id)
            .or_default()
            .push(record);
        Ok(())
    }

    fn predictions_for(&self, entry_id: &Uuid) -> Result<Vec<WaitPredictionRecord>, DatabaseError> {
        Ok(self
            .read()?
            .predictions
            .get(entry_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn medical_record_number(patient_id: &Uuid) -> String {
    let simple = patient_id.simple().to_string();
    format!("MR{}", simple[..10].to_uppercase())
}
