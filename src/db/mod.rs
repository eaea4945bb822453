pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("username already taken: {username}")]
    DuplicateUsername { username: String },

    #[error("invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),
}
