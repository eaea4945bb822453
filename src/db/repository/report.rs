use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Diagnosis, Report};

/// Insert a new immutable report row.
pub fn insert_report(conn: &mut Connection, report: &Report) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO reports (id, patient_name, diagnosis, diet_plan, medication_plan, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id.to_string(),
            report.patient_name,
            report.diagnosis.as_str(),
            report.diet_plan,
            report.medication_plan,
            report.created_at,
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// The most recent report filed for a patient, if any.
///
/// Multiple reports may share a patient name; ties on timestamp break by
/// row id so the result is stable.
pub fn latest_report_for_patient(
    conn: &Connection,
    patient_name: &str,
) -> Result<Option<Report>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_name, diagnosis, diet_plan, medication_plan, created_at
             FROM reports WHERE patient_name = ?1
             ORDER BY created_at DESC, id DESC LIMIT 1",
            params![patient_name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, NaiveDateTime>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, patient_name, diagnosis, diet_plan, medication_plan, created_at)) = row else {
        return Ok(None);
    };

    Ok(Some(Report {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_name,
        diagnosis: Diagnosis::from_str(&diagnosis)?,
        diet_plan,
        medication_plan,
        created_at,
    }))
}
