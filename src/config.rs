//! Hyperparameters for the learners and for a full experiment run.
//!
//! Every struct has a `Default` matching the reference experiment settings
//! (70/30 split, k in {1, 3, 5, 7, 9, 11}, perceptron labels 1 and 2).

/// k-means settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KMeansConfig {
    pub clusters: usize,
    /// Rounds allowed before the run is reported as non-converging.
    pub max_iterations: usize,
}

impl KMeansConfig {
    pub const DEFAULT_CLUSTERS: usize = 2;
    pub const DEFAULT_MAX_ITERATIONS: usize = 300;
}

impl Default for KMeansConfig {
    fn default() -> Self {
        KMeansConfig {
            clusters: Self::DEFAULT_CLUSTERS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// k-NN experiment settings: which k values to evaluate and how to split.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KnnConfig {
    pub k_values: Vec<usize>,
    /// Fraction of the dataset used as the reference (training) set.
    pub split_ratio: f64,
    /// Seed for the train/test shuffle; `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub normalize: bool,
}

impl KnnConfig {
    pub const DEFAULT_K_VALUES: [usize; 6] = [1, 3, 5, 7, 9, 11];
    pub const DEFAULT_SPLIT_RATIO: f64 = 0.7;
}

impl Default for KnnConfig {
    fn default() -> Self {
        KnnConfig {
            k_values: Self::DEFAULT_K_VALUES.to_vec(),
            split_ratio: Self::DEFAULT_SPLIT_RATIO,
            seed: None,
            normalize: true,
        }
    }
}

/// Perceptron settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PerceptronConfig {
    pub learning_rate: f64,
    /// Value every weight starts at.
    pub initial_weight: f64,
    pub initial_bias: f64,
    pub epochs: usize,
    pub label_min: i64,
    pub label_max: i64,
}

impl PerceptronConfig {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
    pub const DEFAULT_INITIAL_WEIGHT: f64 = 0.1;
    pub const DEFAULT_INITIAL_BIAS: f64 = 1.0;
    pub const DEFAULT_EPOCHS: usize = 100;
    pub const DEFAULT_LABEL_MIN: i64 = 1;
    pub const DEFAULT_LABEL_MAX: i64 = 2;
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        PerceptronConfig {
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            initial_weight: Self::DEFAULT_INITIAL_WEIGHT,
            initial_bias: Self::DEFAULT_INITIAL_BIAS,
            epochs: Self::DEFAULT_EPOCHS,
            label_min: Self::DEFAULT_LABEL_MIN,
            label_max: Self::DEFAULT_LABEL_MAX,
        }
    }
}

/// All settings a driver needs for one experiment sweep.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExperimentConfig {
    pub kmeans: KMeansConfig,
    pub knn: KnnConfig,
    pub perceptron: PerceptronConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_experiment() {
        let config = ExperimentConfig::default();
        assert_eq!(config.knn.k_values, vec![1, 3, 5, 7, 9, 11]);
        assert_eq!(config.knn.split_ratio, 0.7);
        assert!(config.knn.normalize);
        assert_eq!(config.perceptron.label_min, 1);
        assert_eq!(config.perceptron.label_max, 2);
        assert_eq!(config.perceptron.initial_bias, 1.0);
        assert_eq!(config.kmeans.max_iterations, KMeansConfig::DEFAULT_MAX_ITERATIONS);
    }
}
