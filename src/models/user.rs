use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;

/// The two account roles. Doctors file reports, patients read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            _ => Err(DatabaseError::InvalidEnum {
                field: "Role".into(),
                value: s.into(),
            }),
        }
    }
}

/// A registered account. Created at registration, never mutated.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}
