//! Escalation: the policy over emergency and urgent entries, staff advice
//! for priority-1 cases, and the background monitor that publishes alerts.

pub mod advice;
pub mod monitor;
pub mod policy;

pub use advice::{
    emergency_recommendations, staff_recommendation, urgency_level, EmergencyAdvice,
    EmergencyCase, EmergencyRecommendation, UrgencyLevel,
};
pub use monitor::{
    scan_hospitals, start_escalation_monitor, EscalationAlert, MonitorHandle,
    ALERT_CHANNEL_CAPACITY, DEFAULT_MONITOR_INTERVAL_SECS,
};
pub use policy::{EmergencyOverview, Escalation, EscalationPolicy};
