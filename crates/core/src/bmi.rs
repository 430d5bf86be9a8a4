//! Body-mass index derivation.
//!
//! The rounding mode is chosen once for the whole pipeline (see [`crate::CoreConfig`]) and
//! every consumer of BMI goes through a [`BmiCalculator`] built from that mode.

use crate::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a computed BMI is rounded before it is used anywhere in the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiRounding {
    /// The raw floating-point quotient.
    #[default]
    Exact,
    /// Rounded up to the next whole number.
    Ceiling,
}

impl BmiRounding {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiRounding::Exact => "exact",
            BmiRounding::Ceiling => "ceiling",
        }
    }

    fn apply(self, bmi: f64) -> f64 {
        match self {
            BmiRounding::Exact => bmi,
            BmiRounding::Ceiling => bmi.ceil(),
        }
    }
}

impl fmt::Display for BmiRounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BmiRounding {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(BmiRounding::Exact),
            "ceiling" | "ceil" => Ok(BmiRounding::Ceiling),
            other => Err(RiskError::InvalidConfig(format!(
                "unknown BMI rounding mode {other:?} (expected 'exact' or 'ceiling')"
            ))),
        }
    }
}

/// Computes BMI as `weight_kg / height_m^2` under the given rounding mode.
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] if either input is not a finite, strictly
/// positive number, or if the quotient itself is not finite.
pub fn compute_bmi(weight_kg: f64, height_m: f64, rounding: BmiRounding) -> RiskResult<f64> {
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(RiskError::InvalidInput(format!(
            "height must be greater than 0 m, got {height_m}"
        )));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(RiskError::InvalidInput(format!(
            "weight must be greater than 0 kg, got {weight_kg}"
        )));
    }

    let bmi = weight_kg / (height_m * height_m);
    if !bmi.is_finite() {
        return Err(RiskError::InvalidInput(format!(
            "weight {weight_kg} kg and height {height_m} m do not give a finite BMI"
        )));
    }

    Ok(rounding.apply(bmi))
}

/// BMI calculator bound to the pipeline-wide rounding mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BmiCalculator {
    rounding: BmiRounding,
}

impl BmiCalculator {
    pub fn new(rounding: BmiRounding) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> BmiRounding {
        self.rounding
    }

    pub fn compute(&self, weight_kg: f64, height_m: f64) -> RiskResult<f64> {
        compute_bmi(weight_kg, height_m, self.rounding)
    }
}
