//! Canonical classifier vocabulary.
//!
//! Every categorical feature the classifier consumes is an enum here, so a
//! [`crate::CanonicalFeatureVector`] cannot hold a token outside its field's vocabulary.
//! Token spellings (including their inconsistent capitalisation) are the ones the
//! classifier was trained with and must not be changed.

use serde::{Deserialize, Serialize};

/// A closed set of tokens for one categorical feature.
pub trait Vocabulary: Copy + Sized + 'static {
    /// Feature name as the classifier knows it.
    const FIELD: &'static str;

    /// Every member of the vocabulary, in ordinal order.
    fn all() -> &'static [Self];

    /// The canonical token for this member.
    fn token(&self) -> &'static str;

    /// Looks up a member by its exact canonical token.
    fn from_token(token: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.token() == token)
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl Vocabulary for $name {
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn token(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.token())
            }
        }
    };
}

vocabulary! {
    /// Number of main meals per day.
    MealsPerDay as "main_meals_per_day" {
        OneMeal => "one_meal",
        TwoMeals => "two_meals",
        ThreeMeals => "three_meals",
        FourOrMoreMeals => "four_or_more_meals",
    }
}

vocabulary! {
    /// How often vegetables are eaten with meals.
    VegetableConsumption as "vegetable_consumption_freq" {
        Rarely => "rarely",
        Sometimes => "sometimes",
        Always => "always",
    }
}

vocabulary! {
    /// Daily water intake band.
    WaterIntake as "water_intake" {
        Low => "low_consumption",
        Adequate => "adequate_consumption",
        High => "high_consumption",
    }
}

vocabulary! {
    /// Weekly physical activity band.
    PhysicalActivity as "physical_activity_freq" {
        Sedentary => "sedentary",
        Low => "low_frequency",
        Moderate => "moderate_frequency",
        High => "high_frequency",
    }
}

vocabulary! {
    /// Daily time spent on electronic devices.
    TechnologyUse as "technology_use_time" {
        Low => "low_use",
        Moderate => "moderate_use",
        High => "high_use",
    }
}

vocabulary! {
    /// Eating between main meals.
    FoodBetweenMeals as "food_between_meals" {
        No => "no",
        Sometimes => "Sometimes",
        Frequently => "Frequently",
        Always => "Always",
    }
}

vocabulary! {
    /// Alcohol consumption frequency.
    AlcoholConsumption as "alcohol_consumption" {
        No => "no",
        Sometimes => "Sometimes",
        Frequently => "Frequently",
        Always => "Always",
    }
}

vocabulary! {
    /// Main mode of transportation.
    Transportation as "transportation_mode" {
        Automobile => "Automobile",
        Motorbike => "Motorbike",
        Bike => "Bike",
        PublicTransportation => "Public_Transportation",
        Walking => "Walking",
    }
}
