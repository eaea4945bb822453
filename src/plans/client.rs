//! HTTP client for the generative-text service.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::PlanError;
use crate::config::GenerativeConfig;

/// Text generation seam. The real implementation talks to the Gemini
/// REST API; tests substitute a mock.
pub trait GenerateText: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, PlanError>>;
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Every request carries a bounded timeout; a hanging upstream call fails
/// the request instead of blocking it indefinitely.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GenerativeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
            timeout_secs: config.timeout_secs,
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, PlanError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    PlanError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    PlanError::Timeout(self.timeout_secs)
                } else {
                    PlanError::ResponseParsing(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PlanError::ResponseParsing(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(PlanError::MissingContent)
    }
}

impl GenerateText for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, PlanError>> {
        Box::pin(self.generate_content(prompt))
    }
}

/// Request body for `models/<model>:generateContent`
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body from `models/<model>:generateContent`
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

/// Mock generative client for testing — returns a configurable response.
pub struct MockPlanClient {
    response: String,
    fail: bool,
}

impl MockPlanClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail: false,
        }
    }

    /// A client whose every call fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            fail: true,
        }
    }
}

impl GenerateText for MockPlanClient {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, PlanError>> {
        Box::pin(async move {
            if self.fail {
                Err(PlanError::MissingContent)
            } else {
                Ok(self.response.clone())
            }
        })
    }
}
