use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire form (serde) is the same string as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(QueueStatus {
    Waiting => "waiting",
    InConsultation => "in_consultation",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(TriageCategory {
    Resuscitation => "resuscitation",
    Emergent => "emergent",
    Urgent => "urgent",
    LessUrgent => "less-urgent",
    NonUrgent => "non-urgent",
});

str_enum!(Consciousness {
    Alert => "alert",
    Confused => "confused",
    Unconscious => "unconscious",
});

str_enum!(DepartmentType {
    Emergency => "emergency",
    Opd => "opd",
    Specialist => "specialist",
});

impl QueueStatus {
    /// Status only moves forward: waiting → in_consultation → completed,
    /// or waiting → cancelled.
    pub fn can_transition_to(self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (QueueStatus::Waiting, QueueStatus::InConsultation)
                | (QueueStatus::Waiting, QueueStatus::Cancelled)
                | (QueueStatus::InConsultation, QueueStatus::Completed)
        )
    }
}

impl TriageCategory {
    /// Map a total triage score onto its clinical category.
    pub fn from_score(score: u32) -> Self {
        if score >= 9 {
            TriageCategory::Resuscitation
        } else if score >= 7 {
            TriageCategory::Emergent
        } else if score >= 5 {
            TriageCategory::Urgent
        } else if score >= 3 {
            TriageCategory::LessUrgent
        } else {
            TriageCategory::NonUrgent
        }
    }

    /// 0 = most severe.
    pub fn severity_rank(self) -> u8 {
        match self {
            TriageCategory::Resuscitation => 0,
            TriageCategory::Emergent => 1,
            TriageCategory::Urgent => 2,
            TriageCategory::LessUrgent => 3,
            TriageCategory::NonUrgent => 4,
        }
    }

    /// True when `self` is as severe as `other` or more.
    pub fn is_at_least(self, other: TriageCategory) -> bool {
        self.severity_rank() <= other.severity_rank()
    }
}

/// Queue priority. Lower number = more urgent; serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriorityLevel {
    Emergency = 1,
    Urgent = 2,
    Routine = 3,
    FollowUp = 4,
}

impl PriorityLevel {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Priority implied by a triage category.
    pub fn from_category(category: TriageCategory) -> Self {
        match category {
            TriageCategory::Resuscitation | TriageCategory::Emergent => PriorityLevel::Emergency,
            TriageCategory::Urgent => PriorityLevel::Urgent,
            TriageCategory::LessUrgent => PriorityLevel::Routine,
            TriageCategory::NonUrgent => PriorityLevel::FollowUp,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityLevel::Emergency => "emergency",
            PriorityLevel::Urgent => "urgent",
            PriorityLevel::Routine => "routine",
            PriorityLevel::FollowUp => "follow-up",
        }
    }
}

impl TryFrom<u8> for PriorityLevel {
    type Error = DatabaseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriorityLevel::Emergency),
            2 => Ok(PriorityLevel::Urgent),
            3 => Ok(PriorityLevel::Routine),
            4 => Ok(PriorityLevel::FollowUp),
            other => Err(DatabaseError::InvalidEnum {
                field: "PriorityLevel".into(),
                value: other.to_string(),
            }),
        }
    }
}

impl From<PriorityLevel> for u8 {
    fn from(priority: PriorityLevel) -> Self {
        priority.level()
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}
