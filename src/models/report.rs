use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::db::DatabaseError;

/// The classifier's binary output, rendered as its two fixed labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    HeartDisease,
    NoHeartDisease,
}

impl Diagnosis {
    /// The label shown to users and stored in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeartDisease => "Heart Disease Detected",
            Self::NoHeartDisease => "No Heart Disease",
        }
    }

    /// Map the model's binary output to a label.
    pub fn from_label_index(label: u8) -> Self {
        if label == 1 {
            Self::HeartDisease
        } else {
            Self::NoHeartDisease
        }
    }
}

impl std::str::FromStr for Diagnosis {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Heart Disease Detected" => Ok(Self::HeartDisease),
            "No Heart Disease" => Ok(Self::NoHeartDisease),
            _ => Err(DatabaseError::InvalidEnum {
                field: "Diagnosis".into(),
                value: s.into(),
            }),
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filed report: one immutable row per doctor submission.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: Uuid,
    pub patient_name: String,
    pub diagnosis: Diagnosis,
    pub diet_plan: String,
    pub medication_plan: String,
    pub created_at: NaiveDateTime,
}
