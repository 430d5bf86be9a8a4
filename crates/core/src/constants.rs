//! Constants used throughout the obesity core crate.
//!
//! Default artifact locations, environment variable names and the fixed numeric
//! tolerances the pipeline checks against.

/// Default path of the classifier artifact when no explicit path is configured.
pub const DEFAULT_MODEL_PATH: &str = "models/obesity_risk_model.json";

/// Default path of the optional model metadata sidecar.
pub const DEFAULT_MODEL_INFO_PATH: &str = "models/model_info.json";

/// Environment variable overriding the classifier artifact path.
pub const MODEL_PATH_ENV: &str = "OBESITY_MODEL_PATH";

/// Environment variable overriding the model metadata sidecar path.
pub const MODEL_INFO_PATH_ENV: &str = "OBESITY_MODEL_INFO_PATH";

/// Environment variable selecting the BMI rounding mode (`exact` or `ceiling`).
pub const BMI_ROUNDING_ENV: &str = "OBESITY_BMI_ROUNDING";

/// Allowed deviation of a probability distribution's sum from 1.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Number of obesity classes the classifier distinguishes.
pub const CLASS_COUNT: usize = 7;

/// Shown alongside every assessment.
pub const CLINICAL_DISCLAIMER: &str = "This system is a decision-support tool and does not replace \
evaluation by a qualified health professional. Results must be interpreted in the full clinical \
context of the patient.";
