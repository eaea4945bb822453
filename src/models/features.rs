use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 13;

/// One clinical measurement vector, submitted per prediction request.
/// Transient, never persisted. Field order matches the model's
/// training column order; `as_vector` is the single place that encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalFeatures {
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

impl ClinicalFeatures {
    /// The thirteen fields in fixed model order.
    pub fn as_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }
}
