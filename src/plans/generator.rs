//! Builds plan prompts and drives the generative client.

use std::sync::Arc;

use super::client::GenerateText;
use super::PlanError;
use crate::models::Diagnosis;

/// The two plan flavors a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Diet,
    Medication,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Medication => "medication",
        }
    }
}

/// Generates diet and medication plans for a diagnosis.
#[derive(Clone)]
pub struct PlanGenerator {
    client: Arc<dyn GenerateText>,
}

impl PlanGenerator {
    pub fn new(client: Arc<dyn GenerateText>) -> Self {
        Self { client }
    }

    /// Generate one plan. Returns the response trimmed of surrounding
    /// whitespace; presentation cleanup is the caller's concern.
    pub async fn generate(
        &self,
        diagnosis: Diagnosis,
        kind: PlanKind,
    ) -> Result<String, PlanError> {
        let prompt = format!(
            "Generate a {} plan for a patient diagnosed with {}.",
            kind.as_str(),
            diagnosis.as_str(),
        );
        let text = self.client.generate(&prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Generate the diet and medication plans concurrently.
    ///
    /// The two calls are independent, so they run as joined futures; the
    /// first failure cancels the other and fails the pair.
    pub async fn generate_pair(&self, diagnosis: Diagnosis) -> Result<(String, String), PlanError> {
        tokio::try_join!(
            self.generate(diagnosis, PlanKind::Diet),
            self.generate(diagnosis, PlanKind::Medication),
        )
    }
}
