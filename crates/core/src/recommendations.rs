//! Fixed advisory text per risk tier.

use crate::severity::RiskTier;

/// Ordered, non-empty advisory strings for one risk tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecommendationSet {
    pub tier: RiskTier,
    pub headline: &'static str,
    pub items: &'static [&'static str],
}

const HEALTHY_RANGE: RecommendationSet = RecommendationSet {
    tier: RiskTier::HealthyRange,
    headline: "Within the healthy weight range.",
    items: &[
        "Keep a balanced diet",
        "Keep up regular physical activity",
        "Have periodic preventive check-ups",
    ],
};

const OVERWEIGHT: RecommendationSet = RecommendationSet {
    tier: RiskTier::Overweight,
    headline: "Within the overweight range.",
    items: &[
        "See a nutritionist for dietary guidance",
        "Increase the frequency of physical activity",
        "Reduce consumption of high-calorie foods",
        "Keep adequate hydration",
        "Monitor weight regularly",
    ],
};

const OBESE: RecommendationSet = RecommendationSet {
    tier: RiskTier::Obese,
    headline: "Within the obesity range.",
    items: &[
        "Seek medical advice promptly",
        "Complete health assessment is needed",
        "Specialised nutritional follow-up",
        "Start a supervised exercise programme",
        "Consider psychological support",
        "Monitor health regularly",
    ],
};

impl RecommendationSet {
    /// The recommendation set for `tier`.
    pub fn for_tier(tier: RiskTier) -> &'static RecommendationSet {
        match tier {
            RiskTier::HealthyRange => &HEALTHY_RANGE,
            RiskTier::Overweight => &OVERWEIGHT,
            RiskTier::Obese => &OBESE,
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.iter().map(|item| (*item).to_string()).collect()
    }
}
