//! Outcome interpretation: ranking, tier lookup and recommendations.

use crate::classifier::ClassificationOutcome;
use crate::recommendations::RecommendationSet;
use crate::severity::{ObesityClass, RiskTier};
use serde::Serialize;
use std::cmp::Ordering;

/// One entry of the ranked probability list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RankedClass {
    pub class: ObesityClass,
    pub probability: f64,
    pub severity_rank: u8,
}

/// Raised when the classifier's primary prediction is not the most probable class.
///
/// The prediction is kept as reported; this only records the disagreement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConsistencyWarning {
    pub predicted: ObesityClass,
    pub most_probable: ObesityClass,
    pub predicted_probability: f64,
    pub top_probability: f64,
}

/// Human-interpretable result of one prediction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InterpretedResult {
    pub label: ObesityClass,
    pub ranked_probabilities: Vec<RankedClass>,
    pub tier: RiskTier,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
    pub consistency_warning: Option<ConsistencyWarning>,
}

impl InterpretedResult {
    /// The `n` most probable classes.
    pub fn top(&self, n: usize) -> &[RankedClass] {
        &self.ranked_probabilities[..n.min(self.ranked_probabilities.len())]
    }

    pub fn probability_of(&self, class: ObesityClass) -> f64 {
        self.ranked_probabilities
            .iter()
            .find(|ranked| ranked.class == class)
            .map(|ranked| ranked.probability)
            .unwrap_or(0.0)
    }
}

/// Descending probability; ties go to the lower severity rank.
fn rank_order(a: &RankedClass, b: &RankedClass) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.severity_rank.cmp(&b.severity_rank))
}

/// Interprets a classification outcome.
///
/// The tier comes from the severity table entry of the predicted label, never from the
/// probabilities.
pub fn interpret(outcome: &ClassificationOutcome) -> InterpretedResult {
    let mut ranked: Vec<RankedClass> = outcome
        .probabilities()
        .iter()
        .map(|(class, probability)| RankedClass {
            class,
            probability,
            severity_rank: class.severity_rank(),
        })
        .collect();
    ranked.sort_by(rank_order);

    let predicted = outcome.predicted();
    let predicted_probability = outcome.probabilities().get(predicted);
    // A prediction tied with the top probability is consistent even if the tie-break
    // ranked another class first.
    let consistency_warning = ranked
        .first()
        .filter(|top| predicted_probability < top.probability)
        .map(|top| ConsistencyWarning {
            predicted,
            most_probable: top.class,
            predicted_probability,
            top_probability: top.probability,
        });

    if let Some(warning) = &consistency_warning {
        tracing::warn!(
            predicted = %warning.predicted,
            most_probable = %warning.most_probable,
            "classifier prediction differs from the most probable class"
        );
    }

    let tier = predicted.tier();
    InterpretedResult {
        label: predicted,
        ranked_probabilities: ranked,
        tier,
        description: predicted.description(),
        recommendations: RecommendationSet::for_tier(tier).items,
        consistency_warning,
    }
}
