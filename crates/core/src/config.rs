//! Core runtime configuration.
//!
//! This module defines configuration that is resolved once at process startup and then
//! passed into the pipeline. Request handling never reads environment variables; the BMI
//! rounding mode in particular is fixed here for the whole process.

use crate::bmi::BmiRounding;
use crate::constants::{DEFAULT_MODEL_INFO_PATH, DEFAULT_MODEL_PATH};
use crate::model::FileModelLoader;
use crate::{RiskError, RiskResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    model_path: PathBuf,
    model_info_path: Option<PathBuf>,
    bmi_rounding: BmiRounding,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        model_path: PathBuf,
        model_info_path: Option<PathBuf>,
        bmi_rounding: BmiRounding,
    ) -> RiskResult<Self> {
        if model_path.as_os_str().is_empty() {
            return Err(RiskError::InvalidConfig(
                "model path cannot be empty".into(),
            ));
        }

        Ok(Self {
            model_path,
            model_info_path,
            bmi_rounding,
        })
    }

    /// Builds a configuration from raw (usually environment) values, applying defaults for
    /// anything unset or blank.
    pub fn from_values(
        model_path: Option<String>,
        model_info_path: Option<String>,
        bmi_rounding: Option<String>,
    ) -> RiskResult<Self> {
        let model_path = non_blank(model_path).unwrap_or_else(|| DEFAULT_MODEL_PATH.into());
        let model_info_path =
            non_blank(model_info_path).unwrap_or_else(|| DEFAULT_MODEL_INFO_PATH.into());

        Self::new(
            PathBuf::from(model_path),
            Some(PathBuf::from(model_info_path)),
            bmi_rounding_from_env_value(bmi_rounding)?,
        )
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn model_info_path(&self) -> Option<&Path> {
        self.model_info_path.as_deref()
    }

    pub fn bmi_rounding(&self) -> BmiRounding {
        self.bmi_rounding
    }

    /// Loader for the configured artifact and sidecar.
    pub fn model_loader(&self) -> FileModelLoader {
        FileModelLoader::new(self.model_path.clone(), self.model_info_path.clone())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the BMI rounding mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default ([`BmiRounding::Exact`]).
pub fn bmi_rounding_from_env_value(value: Option<String>) -> RiskResult<BmiRounding> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<BmiRounding>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}
