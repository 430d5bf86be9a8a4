//! Obesity classes, risk tiers and the severity table that orders them.
//!
//! [`SEVERITY_TABLE`] is the only source of ordering in the crate. Nothing indexes a
//! classifier's own class list positionally; labels are always resolved here by string.

use crate::constants::CLASS_COUNT;
use crate::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the seven ordinal obesity classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObesityClass {
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight,
    #[serde(rename = "Normal_Weight")]
    NormalWeight,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII,
}

/// Coarse risk grouping that drives recommendations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    HealthyRange,
    Overweight,
    Obese,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::HealthyRange, RiskTier::Overweight, RiskTier::Obese];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::HealthyRange => "healthy-range",
            RiskTier::Overweight => "overweight",
            RiskTier::Obese => "obese",
        }
    }

    /// Ordinal position of the tier, 0 being the least severe.
    pub fn rank(&self) -> u8 {
        match self {
            RiskTier::HealthyRange => 0,
            RiskTier::Overweight => 1,
            RiskTier::Obese => 2,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A row of the severity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeverityEntry {
    pub class: ObesityClass,
    pub label: &'static str,
    pub rank: u8,
    pub tier: RiskTier,
    pub description: &'static str,
}

/// Process-wide severity table, ordered by rank.
pub const SEVERITY_TABLE: [SeverityEntry; CLASS_COUNT] = [
    SeverityEntry {
        class: ObesityClass::InsufficientWeight,
        label: "Insufficient_Weight",
        rank: 0,
        tier: RiskTier::HealthyRange,
        description: "Below ideal weight. Nutritional assessment is recommended.",
    },
    SeverityEntry {
        class: ObesityClass::NormalWeight,
        label: "Normal_Weight",
        rank: 1,
        tier: RiskTier::HealthyRange,
        description: "Healthy weight. Maintain eating habits and physical activity.",
    },
    SeverityEntry {
        class: ObesityClass::OverweightLevelI,
        label: "Overweight_Level_I",
        rank: 2,
        tier: RiskTier::Overweight,
        description: "Mild overweight. Pay attention to eating habits and exercise.",
    },
    SeverityEntry {
        class: ObesityClass::OverweightLevelII,
        label: "Overweight_Level_II",
        rank: 3,
        tier: RiskTier::Overweight,
        description: "Moderate overweight. Nutritional follow-up is recommended.",
    },
    SeverityEntry {
        class: ObesityClass::ObesityTypeI,
        label: "Obesity_Type_I",
        rank: 4,
        tier: RiskTier::Obese,
        description: "Grade I obesity. Medical follow-up is required.",
    },
    SeverityEntry {
        class: ObesityClass::ObesityTypeII,
        label: "Obesity_Type_II",
        rank: 5,
        tier: RiskTier::Obese,
        description: "Grade II obesity. Urgent medical intervention is required.",
    },
    SeverityEntry {
        class: ObesityClass::ObesityTypeIII,
        label: "Obesity_Type_III",
        rank: 6,
        tier: RiskTier::Obese,
        description: "Grade III (morbid) obesity. Immediate medical intervention is required.",
    },
];

impl ObesityClass {
    /// All classes in ascending severity.
    pub fn all() -> impl Iterator<Item = ObesityClass> {
        SEVERITY_TABLE.iter().map(|entry| entry.class)
    }

    /// Resolves a classifier label against the severity table.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::UnknownClass`] if `label` is not one of the seven canonical labels.
    pub fn from_label(label: &str) -> RiskResult<Self> {
        SEVERITY_TABLE
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.class)
            .ok_or_else(|| RiskError::UnknownClass(label.to_string()))
    }

    pub fn entry(&self) -> &'static SeverityEntry {
        // Every variant has exactly one row; see `test_table_covers_every_class_once`.
        SEVERITY_TABLE
            .iter()
            .find(|entry| entry.class == *self)
            .unwrap_or(&SEVERITY_TABLE[0])
    }

    pub fn label(&self) -> &'static str {
        self.entry().label
    }

    pub fn severity_rank(&self) -> u8 {
        self.entry().rank
    }

    pub fn tier(&self) -> RiskTier {
        self.entry().tier
    }

    pub fn description(&self) -> &'static str {
        self.entry().description
    }
}

impl fmt::Display for ObesityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for ObesityClass {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObesityClass::from_label(s)
    }
}
