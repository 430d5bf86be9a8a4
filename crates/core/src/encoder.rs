//! Canonical feature encoding.
//!
//! Translates a raw [`PatientProfile`] into the fixed-schema record the classifier consumes.
//! Continuous inputs are bucketed through half-open interval tables; discrete selections
//! are translated through fixed lookup tables. A value outside a field's declared domain
//! is rejected rather than mapped to a fallback bucket.

use crate::bmi::BmiCalculator;
use crate::profile::PatientProfile;
use crate::vocabulary::{
    AlcoholConsumption, FoodBetweenMeals, MealsPerDay, PhysicalActivity, TechnologyUse,
    Transportation, VegetableConsumption, Vocabulary, WaterIntake,
};
use crate::{RiskError, RiskResult};
use serde::Serialize;

/// Inclusive lower and upper bound for age in years.
pub const AGE_DOMAIN: (u32, u32) = (1, 120);

/// Checks a raw age against [`AGE_DOMAIN`]; fractional ages are out of domain.
fn whole_years(age: f64) -> RiskResult<u32> {
    let (min, max) = AGE_DOMAIN;
    if !age.is_finite() || age.fract() != 0.0 || age < f64::from(min) || age > f64::from(max) {
        return Err(RiskError::OutOfDomain {
            field: "age",
            value: age.to_string(),
            domain: "whole years in [1, 120]",
        });
    }
    // Range-checked above, so the cast is exact.
    Ok(age as u32)
}

/// Interval table for one continuous input.
///
/// `buckets` holds `(lower_bound, token)` pairs in ascending order. Bucket `i` covers
/// `[lower_bound_i, lower_bound_{i+1})`; the last bucket extends to `max`, inclusive.
/// A value sitting exactly on a boundary therefore falls into the upper bucket.
pub struct BucketTable<T: 'static> {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub domain: &'static str,
    pub buckets: &'static [(f64, T)],
}

impl<T: Copy> BucketTable<T> {
    /// Maps `value` to its bucket token.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::OutOfDomain`] if `value` is not finite or lies outside
    /// `[min, max]`.
    pub fn bucket(&self, value: f64) -> RiskResult<T> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(RiskError::OutOfDomain {
                field: self.field,
                value: value.to_string(),
                domain: self.domain,
            });
        }

        self.buckets
            .iter()
            .rev()
            .find(|(lower, _)| value >= *lower)
            .map(|(_, token)| *token)
            .ok_or_else(|| RiskError::OutOfDomain {
                field: self.field,
                value: value.to_string(),
                domain: self.domain,
            })
    }
}

pub const MEALS_PER_DAY: BucketTable<MealsPerDay> = BucketTable {
    field: "meals_per_day",
    min: 1.0,
    max: f64::INFINITY,
    domain: "[1, inf)",
    buckets: &[
        (1.0, MealsPerDay::OneMeal),
        (2.0, MealsPerDay::TwoMeals),
        (3.0, MealsPerDay::ThreeMeals),
        (4.0, MealsPerDay::FourOrMoreMeals),
    ],
};

pub const VEGETABLE_CONSUMPTION: BucketTable<VegetableConsumption> = BucketTable {
    field: "vegetable_consumption",
    min: 0.0,
    max: 3.0,
    domain: "[0, 3]",
    buckets: &[
        (0.0, VegetableConsumption::Rarely),
        (1.0, VegetableConsumption::Sometimes),
        (2.5, VegetableConsumption::Always),
    ],
};

pub const WATER_INTAKE: BucketTable<WaterIntake> = BucketTable {
    field: "water_intake",
    min: 0.0,
    max: 3.0,
    domain: "[0, 3]",
    buckets: &[
        (0.0, WaterIntake::Low),
        (1.0, WaterIntake::Adequate),
        (2.0, WaterIntake::High),
    ],
};

pub const PHYSICAL_ACTIVITY: BucketTable<PhysicalActivity> = BucketTable {
    field: "physical_activity",
    min: 0.0,
    max: 7.0,
    domain: "[0, 7]",
    buckets: &[
        (0.0, PhysicalActivity::Sedentary),
        (1.0, PhysicalActivity::Low),
        (2.0, PhysicalActivity::Moderate),
        (3.0, PhysicalActivity::High),
    ],
};

pub const SCREEN_TIME: BucketTable<TechnologyUse> = BucketTable {
    field: "screen_time",
    min: 0.0,
    max: 12.0,
    domain: "[0, 12]",
    buckets: &[
        (0.0, TechnologyUse::Low),
        (2.0, TechnologyUse::Moderate),
        (4.5, TechnologyUse::High),
    ],
};

const SNACKING_SELECTIONS: &[(&str, FoodBetweenMeals)] = &[
    ("no", FoodBetweenMeals::No),
    ("sometimes", FoodBetweenMeals::Sometimes),
    ("frequently", FoodBetweenMeals::Frequently),
    ("always", FoodBetweenMeals::Always),
];

const ALCOHOL_SELECTIONS: &[(&str, AlcoholConsumption)] = &[
    ("no", AlcoholConsumption::No),
    ("sometimes", AlcoholConsumption::Sometimes),
    ("frequently", AlcoholConsumption::Frequently),
    ("always", AlcoholConsumption::Always),
];

const TRANSPORTATION_SELECTIONS: &[(&str, Transportation)] = &[
    ("automobile", Transportation::Automobile),
    ("motorbike", Transportation::Motorbike),
    ("bike", Transportation::Bike),
    ("public_transportation", Transportation::PublicTransportation),
    ("walking", Transportation::Walking),
];

/// Translates a discrete selection key through `table`.
///
/// Keys are matched after trimming, ignoring ASCII case.
fn translate<T: Copy>(field: &'static str, table: &[(&str, T)], raw: &str) -> RiskResult<T> {
    let key = raw.trim();
    table
        .iter()
        .find(|(selection, _)| selection.eq_ignore_ascii_case(key))
        .map(|(_, token)| *token)
        .ok_or_else(|| RiskError::InvalidCategory {
            field,
            value: raw.to_string(),
        })
}

/// A single classifier input value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Token(&'static str),
}

/// The fixed-schema record passed to the classifier.
///
/// Only [`FeatureEncoder::encode`] constructs one, so every categorical field is always a
/// member of its declared vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanonicalFeatureVector {
    age: u32,
    gender: u8,
    main_meals_per_day: MealsPerDay,
    vegetable_consumption_freq: VegetableConsumption,
    water_intake: WaterIntake,
    frequent_high_caloric_food: u8,
    food_between_meals: FoodBetweenMeals,
    physical_activity_freq: PhysicalActivity,
    technology_use_time: TechnologyUse,
    smoker: u8,
    calorie_monitoring: u8,
    alcohol_consumption: AlcoholConsumption,
    family_history_overweight: u8,
    transportation_mode: Transportation,
    bmi: f64,
}

impl CanonicalFeatureVector {
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> u8 {
        self.gender
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn family_history_overweight(&self) -> u8 {
        self.family_history_overweight
    }

    pub fn frequent_high_caloric_food(&self) -> u8 {
        self.frequent_high_caloric_food
    }

    pub fn smoker(&self) -> u8 {
        self.smoker
    }

    pub fn calorie_monitoring(&self) -> u8 {
        self.calorie_monitoring
    }

    pub fn main_meals_per_day(&self) -> MealsPerDay {
        self.main_meals_per_day
    }

    pub fn vegetable_consumption_freq(&self) -> VegetableConsumption {
        self.vegetable_consumption_freq
    }

    pub fn water_intake(&self) -> WaterIntake {
        self.water_intake
    }

    pub fn physical_activity_freq(&self) -> PhysicalActivity {
        self.physical_activity_freq
    }

    pub fn technology_use_time(&self) -> TechnologyUse {
        self.technology_use_time
    }

    pub fn food_between_meals(&self) -> FoodBetweenMeals {
        self.food_between_meals
    }

    pub fn alcohol_consumption(&self) -> AlcoholConsumption {
        self.alcohol_consumption
    }

    pub fn transportation_mode(&self) -> Transportation {
        self.transportation_mode
    }

    /// All features as `(name, value)` pairs in schema order.
    pub fn features(&self) -> Vec<(&'static str, FeatureValue)> {
        fn token<V: Vocabulary>(v: V) -> (&'static str, FeatureValue) {
            (V::FIELD, FeatureValue::Token(v.token()))
        }

        vec![
            ("age", FeatureValue::Numeric(f64::from(self.age))),
            ("gender", FeatureValue::Numeric(f64::from(self.gender))),
            token(self.main_meals_per_day),
            token(self.vegetable_consumption_freq),
            token(self.water_intake),
            (
                "frequent_high_caloric_food",
                FeatureValue::Numeric(f64::from(self.frequent_high_caloric_food)),
            ),
            token(self.food_between_meals),
            token(self.physical_activity_freq),
            token(self.technology_use_time),
            ("smoker", FeatureValue::Numeric(f64::from(self.smoker))),
            (
                "calorie_monitoring",
                FeatureValue::Numeric(f64::from(self.calorie_monitoring)),
            ),
            token(self.alcohol_consumption),
            (
                "family_history_overweight",
                FeatureValue::Numeric(f64::from(self.family_history_overweight)),
            ),
            token(self.transportation_mode),
            ("bmi", FeatureValue::Numeric(self.bmi)),
        ]
    }
}

/// Encodes patient profiles under a fixed BMI rounding mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureEncoder {
    bmi: BmiCalculator,
}

impl FeatureEncoder {
    pub fn new(bmi: BmiCalculator) -> Self {
        Self { bmi }
    }

    pub fn bmi_calculator(&self) -> BmiCalculator {
        self.bmi
    }

    /// Encodes `profile` into a [`CanonicalFeatureVector`].
    ///
    /// # Errors
    ///
    /// - [`RiskError::InvalidInput`] if height or weight is not strictly positive.
    /// - [`RiskError::OutOfDomain`] if age or any continuous scale is outside its domain.
    /// - [`RiskError::InvalidCategory`] if a discrete selection is not in its table.
    pub fn encode(&self, profile: &PatientProfile) -> RiskResult<CanonicalFeatureVector> {
        let bmi = self.bmi.compute(profile.weight, profile.height)?;

        let age = whole_years(profile.age)?;

        let vector = CanonicalFeatureVector {
            age,
            gender: profile.gender.code(),
            main_meals_per_day: MEALS_PER_DAY.bucket(profile.meals_per_day)?,
            vegetable_consumption_freq: VEGETABLE_CONSUMPTION
                .bucket(profile.vegetable_consumption)?,
            water_intake: WATER_INTAKE.bucket(profile.water_intake)?,
            frequent_high_caloric_food: u8::from(profile.frequent_high_caloric_food),
            food_between_meals: translate("snacking", SNACKING_SELECTIONS, &profile.snacking)?,
            physical_activity_freq: PHYSICAL_ACTIVITY.bucket(profile.physical_activity)?,
            technology_use_time: SCREEN_TIME.bucket(profile.screen_time)?,
            smoker: u8::from(profile.smoker),
            calorie_monitoring: u8::from(profile.calorie_monitoring),
            alcohol_consumption: translate("alcohol", ALCOHOL_SELECTIONS, &profile.alcohol)?,
            family_history_overweight: u8::from(profile.family_history_overweight),
            transportation_mode: translate(
                "transportation",
                TRANSPORTATION_SELECTIONS,
                &profile.transportation,
            )?,
            bmi,
        };

        tracing::debug!(bmi, "encoded patient profile");
        Ok(vector)
    }
}
