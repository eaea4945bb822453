//! Plan generation: wraps the external generative-text service that
//! produces diet and medication plans for a diagnosis.

pub mod client;
pub mod generator;
pub mod sanitize;

pub use client::{GeminiClient, GenerateText, MockPlanClient};
pub use generator::{PlanGenerator, PlanKind};
pub use sanitize::clean_plan_text;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot reach generative service at {0}")]
    Connection(String),

    #[error("generative request timed out after {0}s")]
    Timeout(u64),

    #[error("generative service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("cannot parse generative response: {0}")]
    ResponseParsing(String),

    #[error("generative response contained no text content")]
    MissingContent,
}
