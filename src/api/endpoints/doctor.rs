//! Doctor workflow: dashboard view and prediction submission.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::endpoints::ViewResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentSession};
use crate::models::{ClinicalFeatures, Role};
use crate::plans::clean_plan_text;

/// One prediction submission: the patient plus the thirteen measurements.
/// Typed at the boundary: a missing or non-numeric field rejects the
/// request before the classifier is ever consulted.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub patient_name: String,
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
}

impl PredictForm {
    pub fn features(&self) -> ClinicalFeatures {
        ClinicalFeatures {
            age: self.age,
            sex: self.sex,
            cp: self.cp,
            trestbps: self.trestbps,
            chol: self.chol,
            fbs: self.fbs,
            restecg: self.restecg,
            thalach: self.thalach,
            exang: self.exang,
            oldpeak: self.oldpeak,
            slope: self.slope,
            ca: self.ca,
            thal: self.thal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub view: &'static str,
    pub patient_name: String,
    pub diagnosis: String,
    pub diet_plan: String,
    pub medication_plan: String,
}

/// `GET /doctor_dashboard` — the doctor view, or the default view for
/// anyone without a doctor session.
pub async fn dashboard(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<ViewResponse> {
    match session.filter(|s| s.role == Role::Doctor) {
        Some(identity) => {
            Json(ViewResponse::new("doctor_dashboard").with_username(identity.username))
        }
        None => Json(ViewResponse::login()),
    }
}

/// `POST /doctor_dashboard` — classify a measurement vector and generate
/// both plans. The diet and medication generations run concurrently.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Some(identity) = session.filter(|s| s.role == Role::Doctor) else {
        return Ok(Json(ViewResponse::login()).into_response());
    };

    let Form(form) = form.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let patient_name = form.patient_name.trim().to_string();
    if patient_name.is_empty() {
        return Err(ApiError::InvalidInput("patient_name is required".into()));
    }

    let diagnosis = ctx.model.predict(&form.features());
    tracing::info!(
        doctor = %identity.username,
        patient = %patient_name,
        diagnosis = diagnosis.as_str(),
        "classified submission"
    );

    let (diet, medication) = ctx.plans.generate_pair(diagnosis).await?;

    Ok(Json(PredictionResponse {
        view: "doctor_dashboard",
        patient_name,
        diagnosis: diagnosis.as_str().to_string(),
        diet_plan: clean_plan_text(&diet),
        medication_plan: clean_plan_text(&medication),
    })
    .into_response())
}
