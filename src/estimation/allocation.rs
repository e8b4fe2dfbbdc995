use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{service_order, Doctor, QueueEntry};

/// Shift length used to size a doctor's capacity (minutes).
pub const SHIFT_MINUTES: u32 = 480;

/// Patients assigned to one doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub doctor_id: Uuid,
    /// In service order.
    pub patient_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// How many patients fit into one shift for this doctor.
pub fn shift_capacity(doctor: &Doctor) -> usize {
    SHIFT_MINUTES
        .checked_div(doctor.avg_consultation_time)
        .unwrap_or(0) as usize
}

/// Greedy single pass: each available doctor, in the given order, takes up
/// to a shift's worth of patients from the front of their department's queue.
///
/// Patients already in consultation are not considered and do not reduce a
/// doctor's capacity. Unavailable doctors get no row at all.
pub fn optimize_allocation(entries: &[QueueEntry], doctors: &[Doctor]) -> Vec<Allocation> {
    let mut by_department: HashMap<Uuid, Vec<&QueueEntry>> = HashMap::new();
    for entry in entries.iter().filter(|e| e.is_waiting()) {
        by_department.entry(entry.department_id).or_default().push(entry);
    }

    let mut queues: HashMap<Uuid, VecDeque<&QueueEntry>> = by_department
        .into_iter()
        .map(|(department, mut queue)| {
            queue.sort_by(|a, b| service_order(a, b));
            (department, VecDeque::from(queue))
        })
        .collect();

    doctors
        .iter()
        .filter(|d| d.is_available)
        .map(|doctor| {
            let capacity = shift_capacity(doctor);
            let patient_ids = match queues.get_mut(&doctor.department_id) {
                Some(queue) => {
                    let take = capacity.min(queue.len());
                    queue.drain(..take).map(|e| e.patient_id).collect()
                }
                None => Vec::new(),
            };
            Allocation {
                doctor_id: doctor.id,
                patient_ids,
                reasoning: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriorityLevel, QueueStatus};
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
    use std::collections::HashSet;

    fn at(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn doctor(department_id: Uuid, avg: u32, available: bool) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            hospital_id: Uuid::nil(),
            department_id,
            name: "Dr. Test".into(),
            specialization: None,
            avg_consultation_time: avg,
            is_available: available,
            shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        }
    }

    fn entry(department_id: Uuid, priority: PriorityLevel, minute: i64) -> QueueEntry {
        QueueEntry::new(
            Uuid::new_v4(),
            Uuid::nil(),
            department_id,
            priority,
            "cough",
            at(minute),
        )
    }

    #[test]
    fn capacity_from_shift_length() {
        let dept = Uuid::new_v4();
        assert_eq!(shift_capacity(&doctor(dept, 20, true)), 24);
        assert_eq!(shift_capacity(&doctor(dept, 100, true)), 4);
        assert_eq!(shift_capacity(&doctor(dept, 0, true)), 0);
    }

    #[test]
    fn first_doctor_takes_most_urgent_then_earliest() {
        let dept = Uuid::new_v4();
        let routine = entry(dept, PriorityLevel::Routine, 0);
        let urgent_late = entry(dept, PriorityLevel::Urgent, 30);
        let urgent_early = entry(dept, PriorityLevel::Urgent, 10);
        // 480 / 240 = 2 patients per doctor
        let doctors = vec![doctor(dept, 240, true), doctor(dept, 240, true)];

        let plan = optimize_allocation(&[routine.clone(), urgent_late.clone(), urgent_early.clone()], &doctors);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].patient_ids, vec![urgent_early.patient_id, urgent_late.patient_id]);
        assert_eq!(plan[1].patient_ids, vec![routine.patient_id]);
    }

    #[test]
    fn unavailable_doctor_gets_no_row_and_idle_doctor_gets_empty_list() {
        let dept = Uuid::new_v4();
        let off = doctor(dept, 20, false);
        let busy = doctor(dept, 20, true);
        let idle = doctor(dept, 20, true);
        let plan = optimize_allocation(
            &[entry(dept, PriorityLevel::Routine, 0)],
            &[off.clone(), busy.clone(), idle.clone()],
        );
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].doctor_id, busy.id);
        assert_eq!(plan[0].patient_ids.len(), 1);
        assert_eq!(plan[1].doctor_id, idle.id);
        assert!(plan[1].patient_ids.is_empty());
    }

    #[test]
    fn departments_do_not_mix() {
        let cardio = Uuid::new_v4();
        let general = Uuid::new_v4();
        let c = entry(cardio, PriorityLevel::Urgent, 0);
        let g = entry(general, PriorityLevel::Routine, 0);
        let plan = optimize_allocation(&[c.clone(), g.clone()], &[doctor(general, 15, true)]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].patient_ids, vec![g.patient_id]);
    }

    #[test]
    fn no_duplicates_and_capacity_respected() {
        let dept = Uuid::new_v4();
        let entries: Vec<_> = (0..40)
            .map(|i| {
                let priority = match i % 4 {
                    0 => PriorityLevel::Emergency,
                    1 => PriorityLevel::Urgent,
                    2 => PriorityLevel::Routine,
                    _ => PriorityLevel::FollowUp,
                };
                entry(dept, priority, i)
            })
            .collect();
        let doctors = vec![doctor(dept, 30, true), doctor(dept, 45, true), doctor(dept, 60, true)];
        let plan = optimize_allocation(&entries, &doctors);

        let mut seen = HashSet::new();
        let input: HashSet<_> = entries.iter().map(|e| e.patient_id).collect();
        for (alloc, doc) in plan.iter().zip(&doctors) {
            assert!(alloc.patient_ids.len() <= shift_capacity(doc));
            for id in &alloc.patient_ids {
                assert!(seen.insert(*id), "patient assigned twice");
                assert!(input.contains(id));
            }
        }
        // 16 + 10 + 8 = 34 of 40 placed
        assert_eq!(seen.len(), 34);
    }

    #[test]
    fn in_progress_patients_are_ignored() {
        let dept = Uuid::new_v4();
        let mut seeing = entry(dept, PriorityLevel::Emergency, 0);
        seeing.status = QueueStatus::InConsultation;
        let waiting = entry(dept, PriorityLevel::Routine, 5);
        let plan = optimize_allocation(&[seeing, waiting.clone()], &[doctor(dept, 20, true)]);
        assert_eq!(plan[0].patient_ids, vec![waiting.patient_id]);
    }
}
