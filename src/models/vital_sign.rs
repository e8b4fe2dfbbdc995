use serde::{Deserialize, Serialize};

/// Normal heart rate window (bpm, inclusive).
pub const HEART_RATE_RANGE: (u32, u32) = (50, 120);
/// Normal systolic window (mmHg, inclusive).
pub const SYSTOLIC_RANGE: (u32, u32) = (90, 180);
/// Normal diastolic window (mmHg, inclusive).
pub const DIASTOLIC_RANGE: (u32, u32) = (60, 110);
/// Normal body temperature window (°F, inclusive).
pub const TEMPERATURE_RANGE_F: (f64, f64) = (95.0, 103.0);

/// Blood pressure reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl BloodPressure {
    pub fn is_abnormal(&self) -> bool {
        !in_range(self.systolic, SYSTOLIC_RANGE) || !in_range(self.diastolic, DIASTOLIC_RANGE)
    }
}

/// Bedside vital signs captured at triage. Every reading is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Beats per minute.
    pub heart_rate: Option<u32>,
    pub blood_pressure: Option<BloodPressure>,
    /// Degrees Fahrenheit.
    pub temperature: Option<f64>,
    /// SpO2 percentage.
    pub oxygen_saturation: Option<f64>,
}

impl VitalSigns {
    pub fn heart_rate_abnormal(&self) -> bool {
        self.heart_rate
            .is_some_and(|hr| !in_range(hr, HEART_RATE_RANGE))
    }

    pub fn blood_pressure_abnormal(&self) -> bool {
        self.blood_pressure.is_some_and(|bp| bp.is_abnormal())
    }

    pub fn oxygen_below(&self, threshold: f64) -> bool {
        self.oxygen_saturation.is_some_and(|spo2| spo2 < threshold)
    }

    pub fn temperature_abnormal(&self) -> bool {
        let (low, high) = TEMPERATURE_RANGE_F;
        self.temperature.is_some_and(|t| t < low || t > high)
    }
}

fn in_range(value: u32, (low, high): (u32, u32)) -> bool {
    value >= low && value <= high
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vitals_are_never_abnormal() {
        let v = VitalSigns::default();
        assert!(!v.heart_rate_abnormal());
        assert!(!v.blood_pressure_abnormal());
        assert!(!v.oxygen_below(95.0));
        assert!(!v.temperature_abnormal());
    }

    #[test]
    fn heart_rate_bounds_are_inclusive() {
        let at = |hr| VitalSigns { heart_rate: Some(hr), ..Default::default() };
        assert!(!at(50).heart_rate_abnormal());
        assert!(!at(120).heart_rate_abnormal());
        assert!(at(49).heart_rate_abnormal());
        assert!(at(121).heart_rate_abnormal());
    }

    #[test]
    fn blood_pressure_checks_both_readings() {
        assert!(!BloodPressure { systolic: 120, diastolic: 80 }.is_abnormal());
        assert!(BloodPressure { systolic: 185, diastolic: 80 }.is_abnormal());
        assert!(BloodPressure { systolic: 85, diastolic: 80 }.is_abnormal());
        assert!(BloodPressure { systolic: 120, diastolic: 115 }.is_abnormal());
        assert!(BloodPressure { systolic: 120, diastolic: 55 }.is_abnormal());
    }

    #[test]
    fn temperature_window() {
        let at = |t| VitalSigns { temperature: Some(t), ..Default::default() };
        assert!(!at(98.6).temperature_abnormal());
        assert!(!at(103.0).temperature_abnormal());
        assert!(at(103.5).temperature_abnormal());
        assert!(at(94.0).temperature_abnormal());
    }

    #[test]
    fn vitals_deserialize_with_missing_fields() {
        let v: VitalSigns = serde_json::from_str(r#"{"oxygen_saturation": 88}"#).unwrap();
        assert_eq!(v.oxygen_saturation, Some(88.0));
        assert!(v.heart_rate.is_none());
        assert!(v.oxygen_below(90.0));
    }
}
