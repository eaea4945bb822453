//! Report filing.

use std::str::FromStr;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::ViewResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentSession};
use crate::db::repository;
use crate::models::{Diagnosis, Report, Role};

#[derive(Debug, Deserialize)]
pub struct SendReportForm {
    pub patient_name: String,
    pub diagnosis: String,
    pub diet_plan: String,
    pub medication_plan: String,
}

/// `POST /send_report` — persist a confirmed prediction as an immutable
/// report, then redirect back to the doctor dashboard.
///
/// The patient name must belong to a registered patient account;
/// otherwise the report would never be readable by anyone.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    form: Result<Form<SendReportForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Some(identity) = session.filter(|s| s.role == Role::Doctor) else {
        return Ok(Json(ViewResponse::login()).into_response());
    };

    let Form(form) = form.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let patient_name = form.patient_name.trim().to_string();
    if patient_name.is_empty() {
        return Err(ApiError::InvalidInput("patient_name is required".into()));
    }
    let diagnosis = Diagnosis::from_str(&form.diagnosis)
        .map_err(|_| ApiError::InvalidInput(format!("unknown diagnosis: {}", form.diagnosis)))?;

    let report = Report {
        id: Uuid::new_v4(),
        patient_name: patient_name.clone(),
        diagnosis,
        diet_plan: form.diet_plan,
        medication_plan: form.medication_plan,
        created_at: Utc::now().naive_utc(),
    };

    {
        let mut conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("db lock".into()))?;
        if repository::find_user(&conn, &patient_name, Role::Patient)?.is_none() {
            return Err(ApiError::InvalidInput(format!(
                "no registered patient named {patient_name}"
            )));
        }
        repository::insert_report(&mut conn, &report)?;
    }

    tracing::info!(
        doctor = %identity.username,
        patient = %patient_name,
        diagnosis = diagnosis.as_str(),
        "report filed"
    );
    Ok(Redirect::to("/doctor_dashboard").into_response())
}
