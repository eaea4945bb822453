//! Patient workflow: the report dashboard.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::endpoints::ViewResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentSession};
use crate::db::repository;
use crate::models::Role;

#[derive(Debug, Serialize)]
pub struct ReportView {
    pub patient_name: String,
    pub diagnosis: String,
    pub diet_plan: String,
    pub medication_plan: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct PatientDashboard {
    pub view: &'static str,
    pub username: String,
    pub report: Option<ReportView>,
}

/// `GET /patient_dashboard` — the session patient's most recent report,
/// or the default view for anyone without a patient session.
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Result<Response, ApiError> {
    let Some(identity) = session.filter(|s| s.role == Role::Patient) else {
        return Ok(Json(ViewResponse::login()).into_response());
    };

    let report = {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("db lock".into()))?;
        repository::latest_report_for_patient(&conn, &identity.username)?
    };

    Ok(Json(PatientDashboard {
        view: "patient_dashboard",
        username: identity.username,
        report: report.map(|r| ReportView {
            patient_name: r.patient_name,
            diagnosis: r.diagnosis.as_str().to_string(),
            diet_plan: r.diet_plan,
            medication_plan: r.medication_plan,
            created_at: r.created_at,
        }),
    })
    .into_response())
}
