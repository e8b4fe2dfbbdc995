use serde::Serialize;

/// A standing emergency protocol and what activating it requires.
#[derive(Debug, PartialEq, Serialize)]
pub struct EmergencyProtocol {
    pub id: &'static str,
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    /// Ordered.
    pub actions: &'static [&'static str],
    /// Minutes within which the protocol must be started.
    pub time_limit_minutes: u32,
    pub required_personnel: &'static [&'static str],
}

pub static PROTOCOLS: &[EmergencyProtocol] = &[
    EmergencyProtocol {
        id: "cardiac-arrest",
        name: "Cardiac Arrest Protocol",
        triggers: &["cardiac arrest", "no pulse", "cpr needed"],
        actions: &[
            "Immediate CPR",
            "Call code blue",
            "Prepare defibrillator",
            "IV access",
            "Intubation if needed",
        ],
        time_limit_minutes: 2,
        required_personnel: &["Emergency Physician", "Nurse", "Respiratory Therapist"],
    },
    EmergencyProtocol {
        id: "stroke-alert",
        name: "Stroke Alert Protocol",
        triggers: &["stroke", "facial drooping", "speech difficulty", "weakness"],
        actions: &[
            "Immediate CT scan",
            "Neurologist consult",
            "Blood work",
            "IV access",
            "Monitor vitals",
        ],
        time_limit_minutes: 15,
        required_personnel: &["Emergency Physician", "Neurologist", "CT Technician"],
    },
    EmergencyProtocol {
        id: "trauma-alert",
        name: "Trauma Alert Protocol",
        triggers: &["severe trauma", "multiple injuries", "motor vehicle accident"],
        actions: &[
            "Trauma team activation",
            "X-rays and CT",
            "Blood type and cross-match",
            "IV access",
            "Surgery consult",
        ],
        time_limit_minutes: 10,
        required_personnel: &["Trauma Surgeon", "Emergency Physician", "Anesthesiologist"],
    },
];

impl EmergencyProtocol {
    fn triggered_by(&self, lower: &str) -> bool {
        self.triggers.iter().any(|t| lower.contains(t))
    }
}

/// Protocols whose triggers appear in the symptom text, in table order.
pub fn applicable_protocols(symptoms: &str) -> Vec<&'static EmergencyProtocol> {
    let lower = symptoms.to_lowercase();
    PROTOCOLS.iter().filter(|p| p.triggered_by(&lower)).collect()
}

pub(crate) fn first_protocol_for(lower: &str) -> Option<&'static EmergencyProtocol> {
    PROTOCOLS.iter().find(|p| p.triggered_by(lower))
}
