//! k-means clustering with Lloyd's iteration.
//!
//! Starting membership comes from an [`InitializationStrategy`] (label-seeded by
//! default). Each iteration recomputes centroids from current membership, then
//! reassigns every point to its nearest centroid. The loop stops once no cluster's
//! ordered label sequence changes between two iterations.

pub mod init;

use num_traits::Float;
use tracing::{debug, trace};

use crate::common_types::{validate_dataset, DataPoint};
use crate::config::KMeansConfig;
use crate::distance::DistanceMetric;
use crate::error::{MlError, Result};
pub use init::{InitializationStrategy, LabelSeeded, RandomPartition};

/// Final membership of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering<F, L> {
    /// One slot per cluster, in cluster-index order; slots may be empty.
    pub assignment: Vec<Vec<DataPoint<F, L>>>,
    /// Number of centroid/reassignment rounds performed.
    pub iterations: usize,
}

impl<F, L> Clustering<F, L> {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.assignment.iter().map(Vec::len).collect()
    }
}

/// Coordinate-wise mean of `members`; the zero vector when there are none.
fn mean_vector<'a, F, I>(members: I, dimensions: usize) -> Vec<F>
where
    F: Float + 'a,
    I: IntoIterator<Item = &'a [F]>,
{
    let mut sums = vec![F::zero(); dimensions];
    let mut count = 0usize;
    for features in members {
        for (sum, &value) in sums.iter_mut().zip(features.iter()) {
            *sum = *sum + value;
        }
        count += 1;
    }
    if count == 0 {
        return sums;
    }
    let n = F::from(count).unwrap_or_else(F::one);
    sums.into_iter().map(|sum| sum / n).collect()
}

/// Centroid of every cluster slot. Empty clusters get the zero vector.
pub fn centroids<F, L>(groups: &[Vec<DataPoint<F, L>>], dimensions: usize) -> Vec<Vec<F>>
where
    F: Float,
{
    groups
        .iter()
        .map(|group| mean_vector(group.iter().map(|p| p.features.as_slice()), dimensions))
        .collect()
}

/// Index of the centroid closest to `features`; the lowest index wins ties.
fn nearest_centroid<F, M>(features: &[F], centroids: &[Vec<F>], metric: &M) -> Result<usize>
where
    M: DistanceMetric<F> + ?Sized,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = metric.distance(features, centroid)?;
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
        .ok_or(MlError::EmptyInput("centroid list"))
}

fn assign_indices<F, L, M>(dataset: &[DataPoint<F, L>], centroids: &[Vec<F>], metric: &M) -> Result<Vec<Vec<usize>>>
where
    M: DistanceMetric<F> + ?Sized,
{
    let mut groups = vec![Vec::new(); centroids.len()];
    for (index, point) in dataset.iter().enumerate() {
        let cluster = nearest_centroid(&point.features, centroids, metric)?;
        groups[cluster].push(index);
    }
    Ok(groups)
}

/// Reassigns every point of `dataset` (in dataset order) to its nearest centroid.
pub fn reassign<F, L, M>(
    dataset: &[DataPoint<F, L>],
    centroids: &[Vec<F>],
    metric: &M,
) -> Result<Vec<Vec<DataPoint<F, L>>>>
where
    F: Clone,
    L: Clone,
    M: DistanceMetric<F> + ?Sized,
{
    let groups = assign_indices(dataset, centroids, metric)?;
    Ok(materialize(dataset, &groups))
}

fn materialize<F: Clone, L: Clone>(dataset: &[DataPoint<F, L>], groups: &[Vec<usize>]) -> Vec<Vec<DataPoint<F, L>>> {
    groups
        .iter()
        .map(|group| group.iter().map(|&i| dataset[i].clone()).collect())
        .collect()
}

/// Membership counts as changed when any cluster's ordered label sequence differs.
fn membership_changed<F, L: PartialEq>(dataset: &[DataPoint<F, L>], old: &[Vec<usize>], new: &[Vec<usize>]) -> bool {
    old.iter().zip(new.iter()).any(|(before, after)| {
        before.len() != after.len()
            || before
                .iter()
                .zip(after.iter())
                .any(|(&a, &b)| dataset[a].label != dataset[b].label)
    })
}

/// The k-means engine.
#[derive(Debug, Clone)]
pub struct KMeans<I = LabelSeeded> {
    clusters: usize,
    max_iterations: usize,
    initialization: I,
}

impl KMeans<LabelSeeded> {
    pub const DEFAULT_MAX_ITERATIONS: usize = 300;

    /// Label-seeded engine producing `clusters` clusters.
    pub fn new(clusters: usize) -> Self {
        KMeans {
            clusters,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            initialization: LabelSeeded,
        }
    }

    pub fn from_config(config: &KMeansConfig) -> Self {
        Self::new(config.clusters).with_max_iterations(config.max_iterations)
    }
}

impl<I> KMeans<I> {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initialization<J>(self, initialization: J) -> KMeans<J> {
        KMeans {
            clusters: self.clusters,
            max_iterations: self.max_iterations,
            initialization,
        }
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Runs Lloyd's iteration until membership is stable.
    ///
    /// Returns [`MlError::DidNotConverge`] if membership is still changing after
    /// `max_iterations` rounds.
    pub fn cluster<F, L, M>(&self, dataset: &[DataPoint<F, L>], metric: &M) -> Result<Clustering<F, L>>
    where
        F: Float,
        L: PartialEq + Clone,
        M: DistanceMetric<F> + ?Sized,
        I: InitializationStrategy<L>,
    {
        if self.clusters == 0 {
            return Err(MlError::InvalidParameter(
                "cluster count must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(MlError::InvalidParameter(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if dataset.is_empty() {
            return Err(MlError::EmptyInput("dataset for k-means"));
        }
        let dimensions = validate_dataset(dataset)?;

        let mut groups = self.initialization.initial_groups(dataset, self.clusters)?;
        let mut iterations = 0usize;
        loop {
            if iterations == self.max_iterations {
                return Err(MlError::DidNotConverge { iterations });
            }
            let centers: Vec<Vec<F>> = groups
                .iter()
                .map(|group| mean_vector(group.iter().map(|&i| dataset[i].features.as_slice()), dimensions))
                .collect();
            let next = assign_indices(dataset, &centers, metric)?;
            iterations += 1;

            let changed = membership_changed(dataset, &groups, &next);
            trace!(iteration = iterations, sizes = ?next.iter().map(Vec::len).collect::<Vec<_>>(), "k-means reassignment");
            groups = next;
            if !changed {
                break;
            }
        }

        debug!(clusters = self.clusters, iterations, points = dataset.len(), "k-means converged");
        Ok(Clustering {
            assignment: materialize(dataset, &groups),
            iterations,
        })
    }
}

/// Label-seeded k-means with the default iteration cap.
pub fn cluster<F, L, M>(dataset: &[DataPoint<F, L>], clusters: usize, metric: &M) -> Result<Clustering<F, L>>
where
    F: Float,
    L: Ord + Clone,
    M: DistanceMetric<F> + ?Sized,
{
    KMeans::new(clusters).cluster(dataset, metric)
}
