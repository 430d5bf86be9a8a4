//! Classifier capability and the adapter that normalises its output.
//!
//! The classifier is an opaque collaborator. Its class list is used only as a set to check
//! labels against; probabilities are re-keyed by label string through the severity table,
//! never by position.

use crate::constants::{CLASS_COUNT, PROBABILITY_SUM_TOLERANCE};
use crate::encoder::CanonicalFeatureVector;
use crate::severity::{ObesityClass, SEVERITY_TABLE};
use crate::{RiskError, RiskResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A pre-trained multi-class classifier over canonical feature vectors.
pub trait Classifier: Send + Sync {
    /// The classifier's own class labels, in the order `predict_proba` reports them.
    fn classes(&self) -> &[String];

    /// Primary prediction for `features`.
    fn predict(&self, features: &CanonicalFeatureVector) -> RiskResult<String>;

    /// Probability per entry of [`Classifier::classes`].
    fn predict_proba(&self, features: &CanonicalFeatureVector) -> RiskResult<Vec<f64>>;
}

/// Probability distribution over the seven classes, keyed by class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassProbabilities([f64; CLASS_COUNT]);

impl ClassProbabilities {
    /// Builds a distribution from `(class, probability)` pairs.
    ///
    /// Classes that are not listed get probability 0.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::ClassifierContract`] if a class appears twice, a probability is
    /// outside [0, 1], or the total differs from 1 by more than the tolerance.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ObesityClass, f64)>) -> RiskResult<Self> {
        let mut values = [0.0; CLASS_COUNT];
        let mut seen = [false; CLASS_COUNT];

        for (class, probability) in pairs {
            let slot = usize::from(class.severity_rank());
            if seen[slot] {
                return Err(RiskError::ClassifierContract(format!(
                    "duplicate probability for {class}"
                )));
            }
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(RiskError::ClassifierContract(format!(
                    "probability {probability} for {class} is outside [0, 1]"
                )));
            }
            seen[slot] = true;
            // Adding 0.0 turns -0.0 into 0.0 so equal zeros tie when ranked.
            values[slot] = probability + 0.0;
        }

        let total: f64 = values.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(RiskError::ClassifierContract(format!(
                "probabilities sum to {total}, expected 1"
            )));
        }

        Ok(Self(values))
    }

    pub fn get(&self, class: ObesityClass) -> f64 {
        self.0[usize::from(class.severity_rank())]
    }

    /// `(class, probability)` pairs in ascending severity.
    pub fn iter(&self) -> impl Iterator<Item = (ObesityClass, f64)> + '_ {
        SEVERITY_TABLE
            .iter()
            .map(move |entry| (entry.class, self.0[usize::from(entry.rank)]))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(CLASS_COUNT))?;
        for (class, probability) in self.iter() {
            map.serialize_entry(class.label(), &probability)?;
        }
        map.end()
    }
}

/// Normalised classifier output: the primary prediction plus the full distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassificationOutcome {
    predicted: ObesityClass,
    probabilities: ClassProbabilities,
}

impl ClassificationOutcome {
    pub fn new(predicted: ObesityClass, probabilities: ClassProbabilities) -> Self {
        Self {
            predicted,
            probabilities,
        }
    }

    pub fn predicted(&self) -> ObesityClass {
        self.predicted
    }

    pub fn probabilities(&self) -> &ClassProbabilities {
        &self.probabilities
    }
}

/// Runs `classifier` on `features` and re-keys its output against the severity table.
///
/// # Errors
///
/// - [`RiskError::UnknownClass`] if the classifier reports or predicts a label that is not
///   in the severity table.
/// - [`RiskError::ClassifierContract`] if the probability vector does not line up with the
///   class list, is not a valid distribution, or the prediction is not one of the
///   classifier's own classes.
/// - Any error the classifier itself returns.
pub fn classify(
    classifier: &dyn Classifier,
    features: &CanonicalFeatureVector,
) -> RiskResult<ClassificationOutcome> {
    let classes = classifier.classes();
    let raw = classifier.predict_proba(features)?;

    if raw.len() != classes.len() {
        return Err(RiskError::ClassifierContract(format!(
            "classifier reported {} probabilities for {} classes",
            raw.len(),
            classes.len()
        )));
    }

    let pairs = classes
        .iter()
        .zip(raw.iter().copied())
        .map(|(label, probability)| Ok((ObesityClass::from_label(label)?, probability)))
        .collect::<RiskResult<Vec<_>>>()?;
    let probabilities = ClassProbabilities::from_pairs(pairs)?;

    let predicted_label = classifier.predict(features)?;
    let predicted = ObesityClass::from_label(&predicted_label)?;
    if !classes.iter().any(|label| *label == predicted_label) {
        return Err(RiskError::ClassifierContract(format!(
            "predicted label {predicted_label} is not among the classifier's classes"
        )));
    }

    tracing::debug!(predicted = %predicted, "classified feature vector");
    Ok(ClassificationOutcome::new(predicted, probabilities))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::encoder::tests::sample_profile;
    use crate::encoder::FeatureEncoder;

    /// Classifier returning fixed output regardless of input.
    pub(crate) struct StubClassifier {
        pub classes: Vec<String>,
        pub probabilities: Vec<f64>,
        pub prediction: String,
    }

    impl StubClassifier {
        /// Stub reporting classes in alphabetical order, the way many training libraries do.
        pub(crate) fn alphabetical(prediction: &str, probabilities: &[(&str, f64)]) -> Self {
            let mut classes: Vec<String> = SEVERITY_TABLE
                .iter()
                .map(|entry| entry.label.to_string())
                .collect();
            classes.sort();
            let probabilities = classes
                .iter()
                .map(|label| {
                    probabilities
                        .iter()
                        .find(|(l, _)| *l == label.as_str())
                        .map(|(_, p)| *p)
                        .unwrap_or(0.0)
                })
                .collect();
            Self {
                classes,
                probabilities,
                prediction: prediction.to_string(),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict(&self, _features: &CanonicalFeatureVector) -> RiskResult<String> {
            Ok(self.prediction.clone())
        }

        fn predict_proba(&self, _features: &CanonicalFeatureVector) -> RiskResult<Vec<f64>> {
            Ok(self.probabilities.clone())
        }
    }

    fn features() -> CanonicalFeatureVector {
        FeatureEncoder::default().encode(&sample_profile()).unwrap()
    }

    #[test]
    fn test_probabilities_are_rekeyed_by_label() {
        let stub = StubClassifier::alphabetical(
            "Normal_Weight",
            &[("Normal_Weight", 0.95), ("Overweight_Level_I", 0.05)],
        );
        // Alphabetical order puts Insufficient_Weight first and Normal_Weight second.
        assert_eq!(stub.classes[0], "Insufficient_Weight");

        let outcome = classify(&stub, &features()).expect("classify");
        assert_eq!(outcome.predicted(), ObesityClass::NormalWeight);
        assert_eq!(outcome.probabilities().get(ObesityClass::NormalWeight), 0.95);
        assert_eq!(outcome.probabilities().get(ObesityClass::OverweightLevelI), 0.05);
        assert_eq!(outcome.probabilities().get(ObesityClass::ObesityTypeIII), 0.0);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let stub = StubClassifier::alphabetical(
            "Obesity_Type_I",
            &[
                ("Obesity_Type_I", 0.6),
                ("Obesity_Type_II", 0.3),
                ("Overweight_Level_II", 0.1),
            ],
        );
        let outcome = classify(&stub, &features()).unwrap();
        assert!((outcome.probabilities().sum() - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE);
        assert!(outcome
            .probabilities()
            .iter()
            .all(|(_, p)| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_unknown_label_in_class_list() {
        let stub = StubClassifier {
            classes: vec!["Normal_Weight".into(), "Obesity_Type_IV".into()],
            probabilities: vec![0.5, 0.5],
            prediction: "Normal_Weight".into(),
        };
        let err = classify(&stub, &features()).expect_err("unknown class");
        assert!(matches!(err, RiskError::UnknownClass(label) if label == "Obesity_Type_IV"));
    }

    #[test]
    fn test_unknown_predicted_label() {
        let mut stub = StubClassifier::alphabetical("Normal_Weight", &[("Normal_Weight", 1.0)]);
        stub.prediction = "Very_Heavy".into();
        let err = classify(&stub, &features()).expect_err("unknown prediction");
        assert!(matches!(err, RiskError::UnknownClass(_)));
    }

    #[test]
    fn test_prediction_outside_classifier_classes() {
        let stub = StubClassifier {
            classes: vec!["Normal_Weight".into()],
            probabilities: vec![1.0],
            prediction: "Obesity_Type_I".into(),
        };
        let err = classify(&stub, &features()).expect_err("not in class list");
        assert!(matches!(err, RiskError::ClassifierContract(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let mut stub = StubClassifier::alphabetical("Normal_Weight", &[("Normal_Weight", 1.0)]);
        stub.probabilities.pop();
        let err = classify(&stub, &features()).expect_err("length mismatch");
        assert!(matches!(err, RiskError::ClassifierContract(msg) if msg.contains("probabilities")));
    }

    #[test]
    fn test_duplicate_labels() {
        let stub = StubClassifier {
            classes: vec!["Normal_Weight".into(), "Normal_Weight".into()],
            probabilities: vec![0.5, 0.5],
            prediction: "Normal_Weight".into(),
        };
        let err = classify(&stub, &features()).expect_err("duplicate");
        assert!(matches!(err, RiskError::ClassifierContract(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_distribution_must_sum_to_one() {
        let err = ClassProbabilities::from_pairs([
            (ObesityClass::NormalWeight, 0.5),
            (ObesityClass::ObesityTypeI, 0.4),
        ])
        .expect_err("sums to 0.9");
        assert!(matches!(err, RiskError::ClassifierContract(_)));

        let err = ClassProbabilities::from_pairs([
            (ObesityClass::NormalWeight, 1.2),
            (ObesityClass::ObesityTypeI, -0.2),
        ])
        .expect_err("out of range");
        assert!(matches!(err, RiskError::ClassifierContract(_)));
    }

    #[test]
    fn test_serialises_as_label_map() {
        let probs = ClassProbabilities::from_pairs([(ObesityClass::NormalWeight, 1.0)]).unwrap();
        let json = serde_json::to_value(probs).unwrap();
        let map = json.as_object().expect("object");
        assert_eq!(map.len(), 7);
        assert_eq!(map["Normal_Weight"], 1.0);
        assert_eq!(map["Obesity_Type_III"], 0.0);
    }
}
