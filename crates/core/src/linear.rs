//! File-backed multinomial linear (softmax) classifier.
//!
//! The artifact is JSON:
//!
//! ```json
//! {
//!   "classes": ["Insufficient_Weight", "Normal_Weight", "..."],
//!   "intercepts": [0.1, 0.4, "..."],
//!   "coefficients": [
//!     { "bmi": -0.9, "physical_activity_freq=high_frequency": 0.3 },
//!     "..."
//!   ]
//! }
//! ```
//!
//! Numeric features are weighted by their value. Categorical features contribute the weight
//! stored under the one-hot key `field=token`. Missing keys weigh 0.

use crate::classifier::Classifier;
use crate::encoder::{CanonicalFeatureVector, FeatureValue};
use crate::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialised form of a [`LinearClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModelArtifact {
    pub classes: Vec<String>,
    pub intercepts: Vec<f64>,
    pub coefficients: Vec<BTreeMap<String, f64>>,
}

#[derive(Clone, Debug)]
pub struct LinearClassifier {
    classes: Vec<String>,
    intercepts: Vec<f64>,
    coefficients: Vec<BTreeMap<String, f64>>,
}

impl LinearClassifier {
    /// Builds a classifier from a parsed artifact.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::ModelUnavailable`] if the artifact has no classes, if the
    /// intercept or coefficient tables do not line up with the class list, or if any weight
    /// is not finite.
    pub fn from_artifact(artifact: LinearModelArtifact) -> RiskResult<Self> {
        let LinearModelArtifact {
            classes,
            intercepts,
            coefficients,
        } = artifact;

        if classes.is_empty() {
            return Err(RiskError::ModelUnavailable(
                "model artifact declares no classes".into(),
            ));
        }
        if intercepts.len() != classes.len() || coefficients.len() != classes.len() {
            return Err(RiskError::ModelUnavailable(format!(
                "model artifact has {} classes, {} intercepts and {} coefficient rows",
                classes.len(),
                intercepts.len(),
                coefficients.len()
            )));
        }
        let weights_finite = intercepts.iter().all(|w| w.is_finite())
            && coefficients
                .iter()
                .flat_map(|row| row.values())
                .all(|w| w.is_finite());
        if !weights_finite {
            return Err(RiskError::ModelUnavailable(
                "model artifact contains non-finite weights".into(),
            ));
        }

        Ok(Self {
            classes,
            intercepts,
            coefficients,
        })
    }

    pub fn from_json_str(json: &str) -> RiskResult<Self> {
        let artifact: LinearModelArtifact = serde_json::from_str(json)
            .map_err(|e| RiskError::ModelUnavailable(format!("invalid model artifact: {e}")))?;
        Self::from_artifact(artifact)
    }

    /// Reads and parses the artifact at `path`.
    pub fn load(path: &Path) -> RiskResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RiskError::ModelUnavailable(format!(
                "cannot read model artifact {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    fn logits(&self, features: &CanonicalFeatureVector) -> Vec<f64> {
        let features = features.features();
        self.intercepts
            .iter()
            .zip(&self.coefficients)
            .map(|(intercept, row)| {
                features
                    .iter()
                    .map(|(name, value)| match value {
                        FeatureValue::Numeric(x) => row.get(*name).copied().unwrap_or(0.0) * x,
                        FeatureValue::Token(token) => row
                            .get(&format!("{name}={token}"))
                            .copied()
                            .unwrap_or(0.0),
                    })
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Classifier for LinearClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &CanonicalFeatureVector) -> RiskResult<String> {
        let logits = self.logits(features);
        let mut best = 0;
        for (i, z) in logits.iter().enumerate() {
            if *z > logits[best] {
                best = i;
            }
        }
        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, features: &CanonicalFeatureVector) -> RiskResult<Vec<f64>> {
        Ok(softmax(&self.logits(features)))
    }
}
