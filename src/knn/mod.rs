//! k-nearest-neighbors classification over an in-memory reference set.
//!
//! The free functions (`normalize`, `predict`, `accuracy`, `split`) are the core
//! operations; [`KnnClassifier`] bundles `k`, a metric and a fitted reference set
//! for callers that classify many queries against the same data.

pub mod heap_utils;

use num_traits::Float;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::common_types::{validate_dataset, DataPoint};
use crate::distance::{DistanceMetric, KnnDistance};
use crate::error::{MlError, Result};
use heap_utils::KBestNeighbors;

/// Min-max normalizes every feature column to `[0, 1]`.
///
/// A constant column (min == max) maps to 0.0 for every point. The input is left
/// untouched; a new dataset is returned.
pub fn normalize<F, L>(dataset: &[DataPoint<F, L>]) -> Result<Vec<DataPoint<F, L>>>
where
    F: Float,
    L: Clone,
{
    let feature_count = validate_dataset(dataset)?;
    let mut mins = vec![F::max_value(); feature_count];
    let mut maxs = vec![F::min_value(); feature_count];

    for sample in dataset.iter() {
        for (i, &value) in sample.features.iter().enumerate() {
            mins[i] = mins[i].min(value);
            maxs[i] = maxs[i].max(value);
        }
    }

    Ok(dataset
        .iter()
        .map(|sample| {
            let features = sample
                .features
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    let range = maxs[i] - mins[i];
                    if range == F::zero() {
                        F::zero()
                    } else {
                        (value - mins[i]) / range
                    }
                })
                .collect();
            DataPoint::new(features, sample.label.clone())
        })
        .collect())
}

/// Returns the `k` reference points closest to `query` as `(distance, label)` pairs,
/// nearest first. Equal distances keep reference order.
fn nearest_neighbors<'a, F, L, M>(
    query: &[F],
    reference: &'a [DataPoint<F, L>],
    k: usize,
    metric: &M,
) -> Result<Vec<(f64, &'a L)>>
where
    M: DistanceMetric<F> + ?Sized,
{
    let mut best = KBestNeighbors::new(k);
    for sample in reference.iter() {
        let distance = metric.distance(query, &sample.features)?;
        best.add(distance, &sample.label);
    }
    Ok(best.into_sorted())
}

/// Majority vote over neighbors ordered nearest first.
///
/// Labels are tallied in the order they are first met while walking the neighbor
/// list. The highest count wins; among equal counts the label met first (the one
/// owning the nearest tied neighbor) wins.
fn majority_vote<L>(neighbors: &[(f64, &L)]) -> Option<L>
where
    L: PartialEq + Clone,
{
    let mut tallies: Vec<(&L, usize)> = Vec::new();
    for &(_, label) in neighbors.iter() {
        match tallies.iter_mut().find(|(seen, _)| *seen == label) {
            Some(tally) => tally.1 += 1,
            None => tallies.push((label, 1)),
        }
    }

    let mut winner: Option<(&L, usize)> = None;
    for (label, count) in tallies {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((label, count));
        }
    }
    winner.map(|(label, _)| label.clone())
}

/// Predicts the label of `query` by majority vote among its `k` nearest points in
/// `reference`. If `k` exceeds the reference size every point votes.
pub fn predict<F, L, M>(
    query: &[F],
    reference: &[DataPoint<F, L>],
    k: usize,
    metric: &M,
) -> Result<L>
where
    L: PartialEq + Clone,
    M: DistanceMetric<F> + ?Sized,
{
    if k == 0 {
        return Err(MlError::InvalidParameter(
            "k must be greater than 0 for prediction".to_string(),
        ));
    }
    if reference.is_empty() {
        return Err(MlError::EmptyInput("reference set for k-NN prediction"));
    }
    let neighbors = nearest_neighbors(query, reference, k, metric)?;
    trace!(k, nearest = ?neighbors.first().map(|n| n.0), "k-NN neighbors selected");
    majority_vote(&neighbors).ok_or(MlError::EmptyInput("k-NN neighbor list"))
}

/// Fraction of `test` points whose predicted label equals their own label.
///
/// An empty test set scores 0.0.
pub fn accuracy<F, L, M>(
    reference: &[DataPoint<F, L>],
    test: &[DataPoint<F, L>],
    k: usize,
    metric: &M,
) -> Result<f64>
where
    L: PartialEq + Clone,
    M: DistanceMetric<F> + ?Sized,
{
    if test.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for sample in test.iter() {
        if predict(&sample.features, reference, k, metric)? == sample.label {
            correct += 1;
        }
    }
    Ok(correct as f64 / test.len() as f64)
}

/// Shuffles a copy of `dataset` with `rng` and cuts it at `floor(ratio * len)`.
///
/// Returns `(train, test)`.
pub fn split<F, L, R>(
    dataset: &[DataPoint<F, L>],
    ratio: f64,
    rng: &mut R,
) -> Result<(Vec<DataPoint<F, L>>, Vec<DataPoint<F, L>>)>
where
    F: Clone,
    L: Clone,
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&ratio) {
        return Err(MlError::InvalidParameter(format!(
            "split ratio must lie in [0, 1], got {}",
            ratio
        )));
    }
    let mut shuffled = dataset.to_vec();
    shuffled.shuffle(rng);
    let split_index = (shuffled.len() as f64 * ratio).floor() as usize;
    let test = shuffled.split_off(split_index.min(shuffled.len()));
    debug!(train = shuffled.len(), test = test.len(), "dataset split");
    Ok((shuffled, test))
}

/// [`split`] driven by a seeded generator, so the same seed always yields the same partition.
pub fn split_seeded<F, L>(
    dataset: &[DataPoint<F, L>],
    ratio: f64,
    seed: u64,
) -> Result<(Vec<DataPoint<F, L>>, Vec<DataPoint<F, L>>)>
where
    F: Clone,
    L: Clone,
{
    let mut rng = StdRng::seed_from_u64(seed);
    split(dataset, ratio, &mut rng)
}

/// The K-Nearest Neighbors Classifier.
///
/// Stores the reference set handed to [`KnnClassifier::fit`] and classifies queries
/// against it by brute force.
#[derive(Debug, Clone)]
pub struct KnnClassifier<F, L, M = KnnDistance> {
    k: usize,
    training_data: Vec<DataPoint<F, L>>,
    pub distance_metric: M,
}

impl<F, L> KnnClassifier<F, L, KnnDistance> {
    pub const DEFAULT_K: usize = 3;
}

impl<F, L, M> KnnClassifier<F, L, M>
where
    F: Float,
    L: PartialEq + Clone,
    M: DistanceMetric<F>,
{
    pub fn new(k: usize, distance_metric: M) -> Result<Self> {
        if k == 0 {
            return Err(MlError::InvalidParameter(
                "k must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            k,
            training_data: Vec::new(),
            distance_metric,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn training_data(&self) -> &[DataPoint<F, L>] {
        &self.training_data
    }

    /// Replaces the reference set. Points must share one dimensionality.
    pub fn fit(&mut self, training_data: Vec<DataPoint<F, L>>) -> Result<()> {
        let dimensions = validate_dataset(&training_data)?;
        debug!(points = training_data.len(), dimensions, k = self.k, "k-NN classifier fitted");
        self.training_data = training_data;
        Ok(())
    }

    /// Predicts the label for a single test sample.
    pub fn predict_single(&self, test_sample_features: &[F]) -> Result<L> {
        predict(test_sample_features, &self.training_data, self.k, &self.distance_metric)
    }

    /// Predicts labels for a batch of test samples.
    pub fn predict(&self, test_data: &[Vec<F>]) -> Result<Vec<L>> {
        test_data
            .iter()
            .map(|features| self.predict_single(features))
            .collect()
    }

    /// Accuracy of the classifier on a labeled test set.
    pub fn score(&self, test_data: &[DataPoint<F, L>]) -> Result<f64> {
        accuracy(&self.training_data, test_data, self.k, &self.distance_metric)
    }
}
