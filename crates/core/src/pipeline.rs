//! The prediction pipeline: profile, BMI, canonical features, classification,
//! interpretation.
//!
//! A [`RiskPipeline`] is built from an already loaded model and the process-wide rounding
//! mode. It holds no mutable state and can be shared freely between requests.

use crate::bmi::{BmiCalculator, BmiRounding};
use crate::classifier::{classify, ClassificationOutcome};
use crate::encoder::{CanonicalFeatureVector, FeatureEncoder};
use crate::interpret::{interpret, InterpretedResult};
use crate::model::LoadedModel;
use crate::profile::PatientProfile;
use crate::RiskResult;
use serde::Serialize;
use std::sync::Arc;

/// Everything produced for one prediction request.
#[derive(Clone, Debug, Serialize)]
pub struct RiskAssessment {
    pub bmi: f64,
    pub features: CanonicalFeatureVector,
    pub outcome: ClassificationOutcome,
    pub result: InterpretedResult,
}

#[derive(Clone, Debug)]
pub struct RiskPipeline {
    model: Arc<LoadedModel>,
    encoder: FeatureEncoder,
}

impl RiskPipeline {
    pub fn new(model: Arc<LoadedModel>, bmi_rounding: BmiRounding) -> Self {
        Self {
            model,
            encoder: FeatureEncoder::new(BmiCalculator::new(bmi_rounding)),
        }
    }

    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    pub fn bmi_calculator(&self) -> BmiCalculator {
        self.encoder.bmi_calculator()
    }

    pub fn encode(&self, profile: &PatientProfile) -> RiskResult<CanonicalFeatureVector> {
        self.encoder.encode(profile)
    }

    pub fn classify(&self, features: &CanonicalFeatureVector) -> RiskResult<ClassificationOutcome> {
        classify(self.model.classifier(), features)
    }

    /// Runs the full pipeline for `profile`.
    ///
    /// # Errors
    ///
    /// Per-request input errors from encoding (`InvalidInput`, `OutOfDomain`,
    /// `InvalidCategory`) and consistency errors from classification (`UnknownClass`,
    /// `ClassifierContract`).
    pub fn assess(&self, profile: &PatientProfile) -> RiskResult<RiskAssessment> {
        let features = self.encode(profile)?;
        let outcome = self.classify(&features)?;
        let result = interpret(&outcome);

        tracing::debug!(label = %result.label, tier = %result.tier, "assessment complete");
        Ok(RiskAssessment {
            bmi: features.bmi(),
            features,
            outcome,
            result,
        })
    }
}
