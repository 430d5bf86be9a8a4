//! # Obesity Core
//!
//! Core logic for the obesity risk assessment service.
//!
//! This crate turns raw patient intake data into a ranked, interpretable risk assessment:
//! - BMI derivation under one pipeline-wide rounding mode
//! - Canonical feature encoding into the classifier's fixed vocabulary
//! - Classification through an opaque [`Classifier`], re-keyed by label
//! - Interpretation into a ranking, a risk tier and recommendations
//!
//! **No API concerns**: HTTP servers and command line handling belong in `api-rest` and `cli`.

pub mod bmi;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod interpret;
pub mod linear;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod recommendations;
pub mod severity;
pub mod vocabulary;

mod error;

pub use bmi::{compute_bmi, BmiCalculator, BmiRounding};
pub use classifier::{classify, ClassProbabilities, ClassificationOutcome, Classifier};
pub use config::CoreConfig;
pub use constants::CLINICAL_DISCLAIMER;
pub use encoder::{CanonicalFeatureVector, FeatureEncoder, FeatureValue};
pub use error::{RiskError, RiskResult};
pub use interpret::{interpret, ConsistencyWarning, InterpretedResult, RankedClass};
pub use linear::LinearClassifier;
pub use model::{FileModelLoader, LoadedModel, ModelInfo, ModelLoader, ModelStore};
pub use pipeline::{RiskAssessment, RiskPipeline};
pub use profile::{Gender, PatientProfile};
pub use recommendations::RecommendationSet;
pub use severity::{ObesityClass, RiskTier, SeverityEntry, SEVERITY_TABLE};
