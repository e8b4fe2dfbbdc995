use chrono::NaiveDateTime;
use uuid::Uuid;

use super::DatabaseError;
use crate::models::*;

/// Closure applied to an entry under the store's write lock.
pub type EntryUpdate<'a> = &'a mut dyn FnMut(&mut QueueEntry) -> Result<(), DatabaseError>;

/// Storage seam for the queue service. Implementations must be safe to
/// share across request handlers and the escalation monitor.
pub trait QueueRepository: Send + Sync {
    fn hospitals(&self) -> Result<Vec<Hospital>, DatabaseError>;

    fn departments(&self, hospital_id: Option<Uuid>) -> Result<Vec<Department>, DatabaseError>;

    /// Doctors matching `filter`, in roster order.
    fn doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DatabaseError>;

    /// Rejects doctors that fail [`Doctor::validate`].
    fn insert_doctor(&self, doctor: Doctor) -> Result<(), DatabaseError>;

    fn get_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError>;

    /// Create the patient record and a waiting queue entry arriving at `now`.
    /// The entry is pre-assigned to the first available doctor of the
    /// department, if any.
    fn register_patient(
        &self,
        new: NewPatient,
        now: NaiveDateTime,
    ) -> Result<(Patient, QueueEntry), DatabaseError>;

    /// Entries in any status.
    fn entries(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, DatabaseError>;

    fn waiting_entries(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, DatabaseError> {
        Ok(self
            .entries(filter)?
            .into_iter()
            .filter(QueueEntry::is_waiting)
            .collect())
    }

    fn get_entry(&self, id: &Uuid) -> Result<Option<QueueEntry>, DatabaseError>;

    /// Read-modify-write of one entry, atomic with respect to other writers.
    /// The update is discarded if it fails or touches `id` / `arrival_time`.
    fn update_entry_with(&self, id: &Uuid, update: EntryUpdate<'_>)
        -> Result<QueueEntry, DatabaseError>;

    fn append_prediction(&self, record: WaitPredictionRecord) -> Result<(), DatabaseError>;

    /// Oldest first.
    fn predictions_for(&self, entry_id: &Uuid) -> Result<Vec<WaitPredictionRecord>, DatabaseError>;

    fn latest_prediction(
        &self,
        entry_id: &Uuid,
    ) -> Result<Option<WaitPredictionRecord>, DatabaseError> {
        Ok(self.predictions_for(entry_id)?.pop())
    }
}
