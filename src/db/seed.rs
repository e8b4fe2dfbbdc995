//! Demo data: one staffed hospital with three departments and a short queue.
//!
//! Ids are fixed so the demo can be driven from the command line across
//! restarts. Arrival times are relative to the `now` passed in.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::{DatabaseError, InMemoryQueueStore, QueueRepository};
use crate::models::*;

pub const CITY_GENERAL: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_000000000001);
pub const METRO_EMERGENCY: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_000000000002);

pub const EMERGENCY_DEPARTMENT: Uuid = Uuid::from_u128(0x0000_0002_0000_4000_8000_000000000001);
pub const GENERAL_MEDICINE: Uuid = Uuid::from_u128(0x0000_0002_0000_4000_8000_000000000002);
pub const CARDIOLOGY: Uuid = Uuid::from_u128(0x0000_0002_0000_4000_8000_000000000003);

struct SeedDoctor {
    id: u128,
    department_id: Uuid,
    name: &'static str,
    specialization: &'static str,
    avg_consultation_time: u32,
}

struct SeedPatient {
    id: u128,
    entry_id: u128,
    name: &'static str,
    age: u32,
    gender: &'static str,
    phone: &'static str,
    department_id: Uuid,
    priority: PriorityLevel,
    symptoms: &'static str,
    minutes_ago: i64,
    estimated_wait: u32,
}

const DOCTORS: &[SeedDoctor] = &[
    SeedDoctor {
        id: 0x0000_0003_0000_4000_8000_000000000001,
        department_id: EMERGENCY_DEPARTMENT,
        name: "Dr. Sarah Johnson",
        specialization: "Emergency Medicine",
        avg_consultation_time: 20,
    },
    SeedDoctor {
        id: 0x0000_0003_0000_4000_8000_000000000002,
        department_id: EMERGENCY_DEPARTMENT,
        name: "Dr. Michael Chen",
        specialization: "Emergency Medicine",
        avg_consultation_time: 18,
    },
    SeedDoctor {
        id: 0x0000_0003_0000_4000_8000_000000000003,
        department_id: GENERAL_MEDICINE,
        name: "Dr. Emily Rodriguez",
        specialization: "Internal Medicine",
        avg_consultation_time: 15,
    },
    SeedDoctor {
        id: 0x0000_0003_0000_4000_8000_000000000005,
        department_id: CARDIOLOGY,
        name: "Dr. Robert Kim",
        specialization: "Cardiology",
        avg_consultation_time: 25,
    },
];

const PATIENTS: &[SeedPatient] = &[
    SeedPatient {
        id: 0x0000_0004_0000_4000_8000_000000000001,
        entry_id: 0x0000_0005_0000_4000_8000_000000000001,
        name: "John Smith",
        age: 45,
        gender: "Male",
        phone: "+1-555-1001",
        department_id: EMERGENCY_DEPARTMENT,
        priority: PriorityLevel::Emergency,
        symptoms: "Chest pain, shortness of breath",
        minutes_ago: 45,
        estimated_wait: 25,
    },
    SeedPatient {
        id: 0x0000_0004_0000_4000_8000_000000000002,
        entry_id: 0x0000_0005_0000_4000_8000_000000000002,
        name: "Maria Garcia",
        age: 32,
        gender: "Female",
        phone: "+1-555-1002",
        department_id: GENERAL_MEDICINE,
        priority: PriorityLevel::Routine,
        symptoms: "Annual checkup",
        minutes_ago: 30,
        estimated_wait: 45,
    },
    SeedPatient {
        id: 0x0000_0004_0000_4000_8000_000000000003,
        entry_id: 0x0000_0005_0000_4000_8000_000000000003,
        name: "William Johnson",
        age: 67,
        gender: "Male",
        phone: "+1-555-1003",
        department_id: CARDIOLOGY,
        priority: PriorityLevel::Urgent,
        symptoms: "Heart palpitations",
        minutes_ago: 20,
        estimated_wait: 35,
    },
];

/// Build a store populated with the demo hospitals, roster and queue.
pub fn demo_store(now: NaiveDateTime) -> Result<InMemoryQueueStore, DatabaseError> {
    let store = InMemoryQueueStore::new();

    store.insert_hospital(Hospital {
        id: CITY_GENERAL,
        name: "City General Hospital".into(),
        address: Some("123 Main Street, Downtown".into()),
        phone: Some("+1-555-0100".into()),
    })?;
    store.insert_hospital(Hospital {
        id: METRO_EMERGENCY,
        name: "Metro Emergency Center".into(),
        address: Some("456 Oak Avenue, Midtown".into()),
        phone: Some("+1-555-0200".into()),
    })?;

    for (id, name, department_type, capacity) in [
        (EMERGENCY_DEPARTMENT, "Emergency Department", DepartmentType::Emergency, 30),
        (GENERAL_MEDICINE, "General Medicine", DepartmentType::Opd, 50),
        (CARDIOLOGY, "Cardiology", DepartmentType::Specialist, 20),
    ] {
        store.insert_department(Department {
            id,
            hospital_id: CITY_GENERAL,
            name: name.into(),
            department_type,
            capacity,
        })?;
    }

    let shift = |h| {
        NaiveTime::from_hms_opt(h, 0, 0)
            .ok_or_else(|| DatabaseError::ConstraintViolation(format!("invalid shift hour {h}")))
    };
    let (shift_start, shift_end) = (shift(9)?, shift(17)?);
    for d in DOCTORS {
        store.insert_doctor(Doctor {
            id: Uuid::from_u128(d.id),
            hospital_id: CITY_GENERAL,
            department_id: d.department_id,
            name: d.name.into(),
            specialization: Some(d.specialization.into()),
            avg_consultation_time: d.avg_consultation_time,
            is_available: true,
            shift_start,
            shift_end,
        })?;
    }

    for (n, p) in PATIENTS.iter().enumerate() {
        let patient_id = Uuid::from_u128(p.id);
        store.insert_patient(Patient {
            id: patient_id,
            name: p.name.into(),
            phone: Some(p.phone.into()),
            age: Some(p.age),
            gender: Some(p.gender.into()),
            medical_record_number: format!("MR{:03}", n + 1),
        })?;

        let doctor_id = DOCTORS
            .iter()
            .find(|d| d.department_id == p.department_id)
            .map(|d| Uuid::from_u128(d.id));

        let mut entry = QueueEntry::new(
            patient_id,
            CITY_GENERAL,
            p.department_id,
            p.priority,
            p.symptoms,
            now - Duration::minutes(p.minutes_ago),
        );
        entry.id = Uuid::from_u128(p.entry_id);
        entry.doctor_id = doctor_id;
        entry.estimated_wait_time = Some(p.estimated_wait);
        store.insert_entry(entry)?;
    }

    tracing::info!(
        hospitals = store.hospitals()?.len(),
        doctors = DOCTORS.len(),
        waiting = PATIENTS.len(),
        "Demo data loaded"
    );

    Ok(store)
}
