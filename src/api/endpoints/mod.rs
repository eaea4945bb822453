pub mod auth;
pub mod doctor;
pub mod patient;
pub mod reports;

use serde::Serialize;

use crate::config::{APP_NAME, APP_VERSION};

/// Basic view payload. Protected routes render the login variant when no
/// matching session is presented, mirroring what an anonymous visitor
/// sees on `GET /`.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl ViewResponse {
    pub fn new(view: &'static str) -> Self {
        Self {
            service: APP_NAME,
            version: APP_VERSION,
            view,
            username: None,
        }
    }

    /// The default (unauthenticated) view.
    pub fn login() -> Self {
        Self::new("login")
    }

    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }
}
