//! REST wire models.
//!
//! Request bodies are strict (`deny_unknown_fields`) and converted into core domain types
//! before anything else happens. Responses are flat, documented DTOs built from core
//! results; core types never appear on the wire directly.

use obesity_core::{
    Gender, InterpretedResult, PatientProfile, RankedClass, RiskAssessment, RiskError,
    SeverityEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Error kind, e.g. `OutOfDomain` or `InvalidCategory`.
    pub kind: String,
    pub message: String,
}

/// Raw patient intake data.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PredictReq {
    /// Whole years, 1-120.
    pub age: f64,
    /// Metres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    /// `female` or `male`.
    pub gender: String,
    pub family_history_overweight: bool,
    pub frequent_high_caloric_food: bool,
    /// 0-3.
    pub vegetable_consumption: f64,
    /// Litres per day, 0-3.
    pub water_intake: f64,
    /// 1 or more.
    pub meals_per_day: f64,
    /// `no`, `sometimes`, `frequently` or `always`.
    pub snacking: String,
    /// Days per week, 0-7.
    pub physical_activity: f64,
    /// Hours per day, 0-12.
    pub screen_time: f64,
    pub smoker: bool,
    pub calorie_monitoring: bool,
    /// `no`, `sometimes`, `frequently` or `always`.
    pub alcohol: String,
    /// `automobile`, `motorbike`, `bike`, `public_transportation` or `walking`.
    pub transportation: String,
}

fn parse_gender(raw: &str) -> Result<Gender, RiskError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "female" => Ok(Gender::Female),
        "male" => Ok(Gender::Male),
        _ => Err(RiskError::InvalidCategory {
            field: "gender",
            value: raw.to_string(),
        }),
    }
}

impl TryFrom<PredictReq> for PatientProfile {
    type Error = RiskError;

    fn try_from(req: PredictReq) -> Result<Self, Self::Error> {
        Ok(PatientProfile {
            age: req.age,
            height: req.height,
            weight: req.weight,
            gender: parse_gender(&req.gender)?,
            family_history_overweight: req.family_history_overweight,
            frequent_high_caloric_food: req.frequent_high_caloric_food,
            vegetable_consumption: req.vegetable_consumption,
            water_intake: req.water_intake,
            meals_per_day: req.meals_per_day,
            snacking: req.snacking,
            physical_activity: req.physical_activity,
            screen_time: req.screen_time,
            smoker: req.smoker,
            calorie_monitoring: req.calorie_monitoring,
            alcohol: req.alcohol,
            transportation: req.transportation,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RankedClassRes {
    pub label: String,
    pub probability: f64,
    pub severity_rank: u8,
}

impl From<&RankedClass> for RankedClassRes {
    fn from(ranked: &RankedClass) -> Self {
        Self {
            label: ranked.class.label().to_string(),
            probability: ranked.probability,
            severity_rank: ranked.severity_rank,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsistencyWarningRes {
    pub predicted: String,
    pub most_probable: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictRes {
    pub assessment_id: String,
    /// RFC 3339 timestamp.
    pub assessed_at: String,
    pub bmi: f64,
    pub bmi_rounding: String,
    /// Canonical feature record as passed to the classifier.
    #[schema(value_type = Object)]
    pub features: serde_json::Value,
    pub label: String,
    pub tier: String,
    pub description: String,
    /// Probability of every class, keyed by label.
    pub probabilities: BTreeMap<String, f64>,
    /// All seven classes, most probable first.
    pub ranked: Vec<RankedClassRes>,
    pub top_3: Vec<RankedClassRes>,
    pub recommendations: Vec<String>,
    pub consistency_warning: Option<ConsistencyWarningRes>,
    pub disclaimer: String,
}

impl PredictRes {
    pub fn from_assessment(
        assessment: &RiskAssessment,
        bmi_rounding: &str,
    ) -> Result<Self, serde_json::Error> {
        let result: &InterpretedResult = &assessment.result;
        Ok(Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            assessed_at: chrono::Utc::now().to_rfc3339(),
            bmi: assessment.bmi,
            bmi_rounding: bmi_rounding.to_string(),
            features: serde_json::to_value(&assessment.features)?,
            label: result.label.label().to_string(),
            tier: result.tier.as_str().to_string(),
            description: result.description.to_string(),
            probabilities: assessment
                .outcome
                .probabilities()
                .iter()
                .map(|(class, p)| (class.label().to_string(), p))
                .collect(),
            ranked: result.ranked_probabilities.iter().map(Into::into).collect(),
            top_3: result.top(3).iter().map(Into::into).collect(),
            recommendations: result
                .recommendations
                .iter()
                .map(|item| (*item).to_string())
                .collect(),
            consistency_warning: result.consistency_warning.map(|w| ConsistencyWarningRes {
                predicted: w.predicted.label().to_string(),
                most_probable: w.most_probable.label().to_string(),
                message: format!(
                    "predicted {} ({:.3}) but {} is most probable ({:.3})",
                    w.predicted, w.predicted_probability, w.most_probable, w.top_probability
                ),
            }),
            disclaimer: obesity_core::CLINICAL_DISCLAIMER.to_string(),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BmiReq {
    /// Kilograms.
    pub weight: f64,
    /// Metres.
    pub height: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BmiRes {
    pub bmi: f64,
    pub rounding: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SeverityRes {
    pub label: String,
    pub rank: u8,
    pub tier: String,
    pub description: String,
    pub recommendations: Vec<String>,
}

impl From<&SeverityEntry> for SeverityRes {
    fn from(entry: &SeverityEntry) -> Self {
        Self {
            label: entry.label.to_string(),
            rank: entry.rank,
            tier: entry.tier.as_str().to_string(),
            description: entry.description.to_string(),
            recommendations: obesity_core::RecommendationSet::for_tier(entry.tier).to_vec(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelRes {
    /// Canonical class labels in ascending severity.
    pub classes: Vec<String>,
    /// The loaded classifier's own class labels, in its order.
    pub classifier_classes: Vec<String>,
    pub bmi_rounding: String,
    /// Metadata sidecar, if one was found.
    #[schema(value_type = Object)]
    pub info: Option<serde_json::Value>,
}
