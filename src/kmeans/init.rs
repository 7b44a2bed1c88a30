//! Strategies producing the starting cluster membership for k-means.
//!
//! A strategy returns one group of dataset indices per cluster slot. Every index
//! appears in exactly one group and each group lists indices in dataset order.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::common_types::DataPoint;
use crate::error::{MlError, Result};

pub trait InitializationStrategy<L> {
    fn initial_groups<F>(&self, dataset: &[DataPoint<F, L>], clusters: usize) -> Result<Vec<Vec<usize>>>;
}

/// Groups points by their existing label, ascending label order, then pads with
/// empty groups up to the cluster count.
///
/// Fails with [`MlError::TooManyLabels`] when there are more distinct labels than clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSeeded;

impl<L: Ord> InitializationStrategy<L> for LabelSeeded {
    fn initial_groups<F>(&self, dataset: &[DataPoint<F, L>], clusters: usize) -> Result<Vec<Vec<usize>>> {
        let mut by_label: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
        for (index, point) in dataset.iter().enumerate() {
            by_label.entry(&point.label).or_default().push(index);
        }
        if by_label.len() > clusters {
            return Err(MlError::TooManyLabels {
                labels: by_label.len(),
                clusters,
            });
        }
        let mut groups: Vec<Vec<usize>> = by_label.into_values().collect();
        groups.resize_with(clusters, Vec::new);
        Ok(groups)
    }
}

/// Shuffles the dataset with a seeded generator and deals points round-robin into
/// the clusters, so every cluster starts non-empty when there are enough points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomPartition {
    pub seed: u64,
}

impl<L> InitializationStrategy<L> for RandomPartition {
    fn initial_groups<F>(&self, dataset: &[DataPoint<F, L>], clusters: usize) -> Result<Vec<Vec<usize>>> {
        if clusters == 0 {
            return Err(MlError::InvalidParameter(
                "cluster count must be greater than 0".to_string(),
            ));
        }
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        let mut groups = vec![Vec::new(); clusters];
        for (turn, index) in order.into_iter().enumerate() {
            groups[turn % clusters].push(index);
        }
        for group in groups.iter_mut() {
            group.sort_unstable();
        }
        Ok(groups)
    }
}
