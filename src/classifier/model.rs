//! Logistic-regression parameters for the heart-disease classifier.
//! Exported from the training pipeline - do not edit by hand.
//!
//! Validation metrics (held-out split):
//!   AUC:      0.9012
//!   Accuracy: 0.8525
//!   Recall:   0.8824

/// Feature names, in training column order
pub const FEATURE_NAMES: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Coefficients over standardized inputs
pub const COEFFICIENTS: [f64; 13] = [
    0.1128,  // age
    0.6839,  // sex
    0.4971,  // cp
    0.2173,  // trestbps
    0.1398,  // chol
    -0.0506, // fbs
    0.1884,  // restecg
    -0.4610, // thalach
    0.4372,  // exang
    0.5285,  // oldpeak
    0.3051,  // slope
    0.6842,  // ca
    0.4967,  // thal
];

/// Intercept
pub const INTERCEPT: f64 = -0.2970;

/// Scaler mean
pub const SCALER_MEAN: [f64; 13] = [
    54.37,  // age
    0.683,  // sex
    0.967,  // cp
    131.62, // trestbps
    246.26, // chol
    0.149,  // fbs
    0.528,  // restecg
    149.65, // thalach
    0.327,  // exang
    1.040,  // oldpeak
    1.399,  // slope
    0.729,  // ca
    2.314,  // thal
];

/// Scaler standard deviation
pub const SCALER_STD: [f64; 13] = [
    9.08,  // age
    0.466, // sex
    1.032, // cp
    17.54, // trestbps
    51.83, // chol
    0.356, // fbs
    0.526, // restecg
    22.91, // thalach
    0.470, // exang
    1.161, // oldpeak
    0.616, // slope
    1.023, // ca
    0.612, // thal
];

/// Probability cutoff for the positive class
pub const DECISION_THRESHOLD: f64 = 0.5;
