use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Role, User};

/// Insert a new user. A UNIQUE violation on the username surfaces as
/// `DuplicateUsername`; any other failure rolls the transaction back.
pub fn insert_user(conn: &mut Connection, user: &User) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    let result = tx.execute(
        "INSERT INTO users (id, username, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.username,
            user.password_hash,
            user.role.as_str(),
            user.created_at,
        ],
    );
    match result {
        Ok(_) => {
            tx.commit()?;
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DatabaseError::DuplicateUsername {
                username: user.username.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a user by (username, role).
pub fn find_user(
    conn: &Connection,
    username: &str,
    role: Role,
) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, username, password_hash, role, created_at
             FROM users WHERE username = ?1 AND role = ?2",
            params![username, role.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, NaiveDateTime>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, username, password_hash, role, created_at)) = row else {
        return Ok(None);
    };

    Ok(Some(User {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        username,
        password_hash,
        role: Role::from_str(&role)?,
        created_at,
    }))
}
