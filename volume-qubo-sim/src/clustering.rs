//! k-means label assignment over trading volumes.
//!
//! The clustering itself is delegated to `linfa-clustering`. Each volume is a
//! one-dimensional point; the result is a label per sample in `0..k`.

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{QuboError, Result};

/// Scalar trading volume of one trader.
pub type VolumeSample = f64;

/// Cluster label per sample index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    n_clusters: usize,
}

impl ClusterAssignment {
    /// Build an assignment from precomputed labels.
    ///
    /// Fails if any label falls outside `0..n_clusters`.
    pub fn from_labels(labels: Vec<usize>, n_clusters: usize) -> Result<Self> {
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_clusters) {
            return Err(QuboError::Clustering(format!(
                "label {} out of range for {} clusters",
                bad, n_clusters
            )));
        }
        Ok(Self { labels, n_clusters })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of sample `i`, if it exists.
    pub fn label(&self, i: usize) -> Option<usize> {
        self.labels.get(i).copied()
    }

    /// Number of samples carrying each label.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }

    /// Sample indices grouped by label.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.n_clusters];
        for (i, &l) in self.labels.iter().enumerate() {
            groups[l].push(i);
        }
        groups
    }
}

/// Partition `volumes` into `n_clusters` groups with seeded k-means++.
pub fn cluster_volumes(
    volumes: &[VolumeSample],
    n_clusters: usize,
    seed: u64,
) -> Result<ClusterAssignment> {
    if volumes.is_empty() {
        return Err(QuboError::Clustering("no volumes to cluster".into()));
    }
    if n_clusters == 0 || n_clusters > volumes.len() {
        return Err(QuboError::Clustering(format!(
            "cannot form {} clusters from {} samples",
            n_clusters,
            volumes.len()
        )));
    }
    if volumes.iter().any(|v| !v.is_finite()) {
        return Err(QuboError::Clustering("volumes must be finite".into()));
    }

    let records = Array2::from_shape_vec((volumes.len(), 1), volumes.to_vec())
        .map_err(|e| QuboError::Clustering(e.to_string()))?;
    let dataset = DatasetBase::from(records);

    let rng = StdRng::seed_from_u64(seed);
    let model = KMeans::params_with_rng(n_clusters, rng)
        .max_n_iterations(300)
        .tolerance(1e-4)
        .fit(&dataset)
        .map_err(|e| QuboError::Clustering(e.to_string()))?;

    let labels: Array1<usize> = model.predict(dataset.records());
    log::debug!("k-means labels: {}", labels);
    ClusterAssignment::from_labels(labels.to_vec(), n_clusters)
}
