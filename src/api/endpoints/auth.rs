//! Registration, login and logout.

use std::str::FromStr;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::ViewResponse;
use crate::api::error::ApiError;
use crate::api::middleware::session;
use crate::api::types::ApiContext;
use crate::crypto::{hash_password, verify_password};
use crate::db::repository;
use crate::models::{Role, User};

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// `GET /` — the login view.
pub async fn index() -> Json<ViewResponse> {
    Json(ViewResponse::login())
}

/// `GET /register` — the registration view.
pub async fn register_view() -> Json<ViewResponse> {
    Json(ViewResponse::new("register"))
}

/// `GET /login` — the login view.
pub async fn login_view() -> Json<ViewResponse> {
    Json(ViewResponse::login())
}

/// `POST /register` — create an account, then redirect to login.
pub async fn register(
    State(ctx): State<ApiContext>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let username = form.username.trim().to_string();
    if username.is_empty() || form.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "username and password are required".into(),
        ));
    }
    let role = Role::from_str(&form.role)
        .map_err(|_| ApiError::InvalidInput(format!("unknown role: {}", form.role)))?;

    // PBKDF2 is deliberately slow; keep it off the async workers.
    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = User {
        id: Uuid::new_v4(),
        username: username.clone(),
        password_hash,
        role,
        created_at: Utc::now().naive_utc(),
    };

    {
        let mut conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("db lock".into()))?;
        repository::insert_user(&mut conn, &user)?;
    }

    tracing::info!(username = %username, role = role.as_str(), "registered user");
    Ok(Redirect::to("/login"))
}

/// `POST /login` — verify credentials, start a session, redirect to the
/// role dashboard. Any failure renders the same generic message.
pub async fn login(
    State(ctx): State<ApiContext>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let role = Role::from_str(&form.role).map_err(|_| ApiError::InvalidCredentials)?;

    let user = {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("db lock".into()))?;
        repository::find_user(&conn, form.username.trim(), role)?
    };

    let Some(user) = user else {
        tracing::debug!(username = %form.username, "login failed: no such user for role");
        return Err(ApiError::InvalidCredentials);
    };

    let password = form.password;
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !verified {
        tracing::debug!(username = %user.username, "login failed: bad password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?
        .start(user.username.clone(), user.role);

    let destination = match user.role {
        Role::Doctor => "/doctor_dashboard",
        Role::Patient => "/patient_dashboard",
    };

    let headers = AppendHeaders([(header::SET_COOKIE, session::session_cookie(&token))]);
    Ok((headers, Redirect::to(destination)).into_response())
}

/// `GET /logout` — end the session, clear the cookie, back to login.
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = session::session_token(&headers) {
        ctx.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .end(&token);
    }

    let headers = AppendHeaders([(header::SET_COOKIE, session::clear_session_cookie())]);
    Ok((headers, Redirect::to("/")).into_response())
}
