//! Single-layer perceptron trained with the online update rule.
//!
//! The classifier emits one of two caller-chosen labels. Internally the labels are
//! mapped to targets 0 (`min`) and 1 (`max`), so an update is always scaled by an
//! error of -1, 0 or +1 no matter how far apart the labels themselves are.

use std::fmt::Debug;

use num_traits::Float;
use tracing::debug;

use crate::common_types::DataPoint;
use crate::config::PerceptronConfig;
use crate::error::{MlError, Result};

/// The pair of labels a binary perceptron can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryLabels<L> {
    /// Emitted when the activation is negative.
    pub min: L,
    /// Emitted when the activation is zero or positive.
    pub max: L,
}

impl<L: PartialEq + Debug> BinaryLabels<L> {
    pub fn new(min: L, max: L) -> Result<Self> {
        if min == max {
            return Err(MlError::InvalidParameter(format!(
                "perceptron labels must differ, got {:?} twice",
                min
            )));
        }
        Ok(BinaryLabels { min, max })
    }

    fn target(&self, label: &L) -> Result<i8> {
        if *label == self.max {
            Ok(1)
        } else if *label == self.min {
            Ok(0)
        } else {
            Err(MlError::UnknownLabel(format!("{:?}", label)))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron<F, L> {
    weights: Vec<F>,
    bias: F,
    learning_rate: F,
    labels: BinaryLabels<L>,
}

impl<F, L> Perceptron<F, L>
where
    F: Float + Debug,
    L: PartialEq + Clone + Debug,
{
    /// Creates a perceptron with every weight at 0.1 and the bias at 1.0.
    pub fn new(feature_count: usize, learning_rate: F, labels: BinaryLabels<L>) -> Result<Self> {
        let initial_weight = F::from(PerceptronConfig::DEFAULT_INITIAL_WEIGHT).unwrap_or_else(F::zero);
        let initial_bias = F::from(PerceptronConfig::DEFAULT_INITIAL_BIAS).unwrap_or_else(F::one);
        Self::with_initial_state(vec![initial_weight; feature_count], initial_bias, learning_rate, labels)
    }

    /// Creates a perceptron from explicit starting weights and bias.
    pub fn with_initial_state(weights: Vec<F>, bias: F, learning_rate: F, labels: BinaryLabels<L>) -> Result<Self> {
        if !(learning_rate > F::zero()) || !learning_rate.is_finite() {
            return Err(MlError::InvalidParameter(format!(
                "learning rate must be finite and positive, got {:?}",
                learning_rate
            )));
        }
        Ok(Perceptron {
            weights,
            bias,
            learning_rate,
            labels,
        })
    }

    pub fn weights(&self) -> &[F] {
        &self.weights
    }

    pub fn bias(&self) -> F {
        self.bias
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    pub fn learning_rate(&self) -> F {
        self.learning_rate
    }

    pub fn labels(&self) -> &BinaryLabels<L> {
        &self.labels
    }

    fn check_features(&self, features: &[F]) -> Result<()> {
        if features.len() != self.weights.len() {
            return Err(MlError::DimensionMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        Ok(())
    }

    /// `bias + w · x`.
    pub fn activation(&self, features: &[F]) -> Result<F> {
        self.check_features(features)?;
        Ok(self
            .weights
            .iter()
            .zip(features.iter())
            .fold(self.bias, |sum, (&w, &x)| sum + w * x))
    }

    /// `max` when the activation is >= 0 (zero included), `min` otherwise.
    pub fn predict(&self, features: &[F]) -> Result<L> {
        let sum = self.activation(features)?;
        if sum >= F::zero() {
            Ok(self.labels.max.clone())
        } else {
            Ok(self.labels.min.clone())
        }
    }

    /// Applies one online update for `features` labeled `desired`.
    ///
    /// Returns `true` when the sample was misclassified (and the model moved).
    pub fn train_one_sample(&mut self, features: &[F], desired: &L) -> Result<bool> {
        let wanted = self.labels.target(desired)?;
        let predicted = self.labels.target(&self.predict(features)?)?;
        let error = wanted - predicted;
        if error == 0 {
            return Ok(false);
        }
        let step = self.learning_rate * F::from(error).unwrap_or_else(F::zero);
        for (w, &x) in self.weights.iter_mut().zip(features.iter()) {
            *w = *w + step * x;
        }
        self.bias = self.bias + step;
        Ok(true)
    }

    /// Runs `epochs` full passes over `dataset` in its given order.
    ///
    /// Every sample is checked (dimensions and label) before the model is touched.
    /// Returns the number of misclassified samples seen during each epoch.
    pub fn train_epochs(&mut self, dataset: &[DataPoint<F, L>], epochs: usize) -> Result<Vec<usize>> {
        for sample in dataset.iter() {
            self.check_features(&sample.features)?;
            self.labels.target(&sample.label)?;
        }

        let mut mistakes_per_epoch = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut mistakes = 0usize;
            for sample in dataset.iter() {
                if self.train_one_sample(&sample.features, &sample.label)? {
                    mistakes += 1;
                }
            }
            debug!(epoch, mistakes, bias = ?self.bias, "perceptron epoch finished");
            mistakes_per_epoch.push(mistakes);
        }
        Ok(mistakes_per_epoch)
    }

    /// Fraction of `dataset` the current model classifies correctly; 0.0 when empty.
    pub fn accuracy(&self, dataset: &[DataPoint<F, L>]) -> Result<f64> {
        if dataset.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for sample in dataset.iter() {
            if self.predict(&sample.features)? == sample.label {
                correct += 1;
            }
        }
        Ok(correct as f64 / dataset.len() as f64)
    }
}

impl Perceptron<f64, i64> {
    /// Builds an integer-labeled perceptron from a [`PerceptronConfig`].
    pub fn from_config(feature_count: usize, config: &PerceptronConfig) -> Result<Self> {
        let labels = BinaryLabels::new(config.label_min, config.label_max)?;
        Self::with_initial_state(
            vec![config.initial_weight; feature_count],
            config.initial_bias,
            config.learning_rate,
            labels,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn default_perceptron(feature_count: usize) -> Perceptron<f64, i64> {
        Perceptron::new(feature_count, 0.1, BinaryLabels::new(1, 2).unwrap()).unwrap()
    }

    fn and_gate() -> Vec<DataPoint<f64, i64>> {
        vec![
            DataPoint::new(vec![0.0, 0.0], 1),
            DataPoint::new(vec![0.0, 1.0], 1),
            DataPoint::new(vec![1.0, 0.0], 1),
            DataPoint::new(vec![1.0, 1.0], 2),
        ]
    }

    #[test]
    fn test_new_uses_reference_initial_state() {
        let p = default_perceptron(3);
        assert_eq!(p.weights(), &[0.1, 0.1, 0.1]);
        assert_eq!(p.bias(), 1.0);
        assert_eq!(p.feature_count(), 3);
        assert_eq!(p.learning_rate(), 0.1);
        assert_eq!(p.labels().max, 2);
    }

    #[test]
    fn test_zero_activation_predicts_max_label() {
        let labels = BinaryLabels::new("low", "high").unwrap();
        let p = Perceptron::with_initial_state(vec![0.0, 0.0], 0.0, 0.1, labels).unwrap();
        assert_eq!(p.predict(&[0.0, 0.0]).unwrap(), "high");

        let p = Perceptron::with_initial_state(vec![1.0, -1.0], 0.0, 0.1, labels).unwrap();
        assert_eq!(p.activation(&[2.0, 2.0]).unwrap(), 0.0);
        assert_eq!(p.predict(&[2.0, 2.0]).unwrap(), "high");
        assert_eq!(p.predict(&[1.0, 2.0]).unwrap(), "low");
    }

    #[test]
    fn test_single_update_moves_weights_and_bias() {
        let mut p = default_perceptron(2);
        // 1.0 + 0.1 + 0.1 >= 0 predicts 2; desired 1 gives error -1
        assert!(p.train_one_sample(&[1.0, 1.0], &1).unwrap());
        assert!((p.weights()[0] - 0.0).abs() < EPSILON);
        assert!((p.weights()[1] - 0.0).abs() < EPSILON);
        assert!((p.bias() - 0.9).abs() < EPSILON);

        // Correct prediction leaves the model untouched
        let before = p.clone();
        assert!(!p.train_one_sample(&[1.0, 1.0], &2).unwrap());
        assert_eq!(p, before);
    }

    #[test]
    fn test_update_magnitude_ignores_label_spacing() {
        let labels = BinaryLabels::new(0_i64, 10_i64).unwrap();
        let mut p = Perceptron::new(1, 0.5, labels).unwrap();
        // activation 1.0 + 0.1 * 2 predicts 10, desired 0
        p.train_one_sample(&[2.0], &0).unwrap();
        assert!((p.weights()[0] - (0.1 - 0.5 * 2.0)).abs() < EPSILON);
        assert!((p.bias() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_training_converges_on_separable_data() {
        let mut p = default_perceptron(2);
        let data = and_gate();
        let mistakes = p.train_epochs(&data, 50).unwrap();
        assert_eq!(mistakes.len(), 50);
        assert_eq!(*mistakes.last().unwrap(), 0);
        assert_eq!(p.accuracy(&data).unwrap(), 1.0);

        let blobs = vec![
            DataPoint::new(vec![2.0, 1.0], 1),
            DataPoint::new(vec![1.0, 3.0], 1),
            DataPoint::new(vec![6.0, 5.0], 2),
            DataPoint::new(vec![7.0, 8.0], 2),
            DataPoint::new(vec![0.0, 0.0], 1),
            DataPoint::new(vec![8.0, 6.0], 2),
        ];
        let mut p = default_perceptron(2);
        p.train_epochs(&blobs, 100).unwrap();
        assert_eq!(p.accuracy(&blobs).unwrap(), 1.0);
    }

    #[test]
    fn test_training_is_order_sensitive_and_deterministic() {
        let data = and_gate();
        let mut a = default_perceptron(2);
        let mut b = default_perceptron(2);
        a.train_epochs(&data, 3).unwrap();
        b.train_epochs(&data, 3).unwrap();
        assert_eq!(a, b);

        let mut reversed = data.clone();
        reversed.reverse();
        let mut c = default_perceptron(2);
        c.train_epochs(&reversed, 3).unwrap();
        let mut d = default_perceptron(2);
        d.train_epochs(&data, 3).unwrap();
        assert_ne!(c, d);
    }

    #[test]
    fn test_accuracy_of_empty_dataset_is_zero() {
        let p = default_perceptron(2);
        assert_eq!(p.accuracy(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut p = default_perceptron(2);
        assert!(matches!(
            p.predict(&[1.0]),
            Err(MlError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(p.train_one_sample(&[1.0, 1.0], &7), Err(MlError::UnknownLabel(_))));

        // A bad sample anywhere aborts training before any update
        let before = p.clone();
        let mut data = and_gate();
        data.push(DataPoint::new(vec![1.0, 1.0], 3));
        assert!(p.train_epochs(&data, 5).is_err());
        assert_eq!(p, before);

        assert!(BinaryLabels::new(1, 1).is_err());
        assert!(Perceptron::new(2, 0.0, BinaryLabels::new(1, 2).unwrap()).is_err());
        assert!(Perceptron::new(2, f64::NAN, BinaryLabels::new(1, 2).unwrap()).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = PerceptronConfig {
            learning_rate: 0.25,
            initial_weight: 0.0,
            initial_bias: -1.0,
            label_min: -1,
            label_max: 1,
            ..PerceptronConfig::default()
        };
        let p = Perceptron::from_config(3, &config).unwrap();
        assert_eq!(p.weights(), &[0.0, 0.0, 0.0]);
        assert_eq!(p.bias(), -1.0);
        assert_eq!(p.predict(&[0.0, 0.0, 0.0]).unwrap(), -1);
    }
}
