//! Adapter around the pre-trained heart-disease classifier.
//!
//! The model is a standardized logistic regression whose parameters are
//! baked in at compile time from `model.rs`. Prediction is deterministic:
//! the same 13-field vector always yields the same label.

pub mod model;

use crate::models::features::{ClinicalFeatures, FEATURE_COUNT};
use crate::models::Diagnosis;

use model::{COEFFICIENTS, DECISION_THRESHOLD, INTERCEPT, SCALER_MEAN, SCALER_STD};

/// The pre-trained binary classifier.
pub struct HeartDiseaseModel {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    mean: [f64; FEATURE_COUNT],
    std: [f64; FEATURE_COUNT],
}

impl HeartDiseaseModel {
    /// Load the embedded pre-trained parameters.
    pub fn new() -> Self {
        Self {
            coefficients: COEFFICIENTS,
            intercept: INTERCEPT,
            mean: SCALER_MEAN,
            std: SCALER_STD,
        }
    }

    /// Classify a measurement vector into one of the two diagnosis labels.
    pub fn predict(&self, features: &ClinicalFeatures) -> Diagnosis {
        let label = u8::from(self.probability(features) >= DECISION_THRESHOLD);
        Diagnosis::from_label_index(label)
    }

    /// Probability of the positive (disease) class.
    pub fn probability(&self, features: &ClinicalFeatures) -> f64 {
        let x = features.as_vector();
        let mut z = self.intercept;
        for i in 0..FEATURE_COUNT {
            z += self.coefficients[i] * (x[i] - self.mean[i]) / self.std[i];
        }
        sigmoid(z)
    }
}

impl Default for HeartDiseaseModel {
    fn default() -> Self {
        Self::new()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
