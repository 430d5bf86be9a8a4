//! Raw patient intake record.
//!
//! A [`PatientProfile`] is what the intake form collects: continuous slider values, binary
//! answers and discrete selections still expressed as selection keys. Nothing in here is
//! validated; [`crate::FeatureEncoder::encode`] is the single place where the profile is checked
//! against its declared domain and translated into the classifier vocabulary.

use serde::{Deserialize, Serialize};

/// Binary gender as recorded at intake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Numeric code used in the classifier's training data.
    pub fn code(&self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }
}

/// Raw patient intake data for one prediction request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientProfile {
    /// Age in years, as entered. Must be a whole number to encode.
    pub age: f64,
    /// Height in metres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub gender: Gender,
    pub family_history_overweight: bool,
    pub frequent_high_caloric_food: bool,
    /// Vegetable consumption frequency on a 0-3 scale.
    pub vegetable_consumption: f64,
    /// Daily water intake in litres (0-3).
    pub water_intake: f64,
    /// Number of main meals per day (1 or more).
    pub meals_per_day: f64,
    /// Eating between meals: `no`, `sometimes`, `frequently` or `always`.
    pub snacking: String,
    /// Days per week with physical activity (0-7).
    pub physical_activity: f64,
    /// Hours per day spent on electronic devices (0-12).
    pub screen_time: f64,
    pub smoker: bool,
    pub calorie_monitoring: bool,
    /// Alcohol consumption: `no`, `sometimes`, `frequently` or `always`.
    pub alcohol: String,
    /// Main transportation: `automobile`, `motorbike`, `bike`, `public_transportation` or `walking`.
    pub transportation: String,
}
