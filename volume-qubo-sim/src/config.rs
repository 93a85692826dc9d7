//! Pipeline configuration.
//!
//! Defaults reproduce the reference experiment: nine traders whose volumes
//! span 1e2..1e10, clustered into nine groups, sampled ten times with a chain
//! strength of 8.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anneal::AnnealSchedule;
use crate::error::{QuboError, Result};

/// Configuration for one clustering-to-QUBO run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuboConfig {
    /// Trading volume per trader (order-of-magnitude scalars).
    pub volumes: Vec<f64>,
    /// Number of k-means clusters.
    pub n_clusters: usize,
    /// Seed for k-means initialisation and the sampler.
    pub seed: u64,
    /// Chain strength forwarded to the sampler.
    pub chain_strength: f64,
    /// Number of sampler reads.
    pub num_reads: usize,
    /// Problem label attached to the sample set.
    pub label: String,
    /// Annealing schedule for the in-process sampler.
    pub anneal: AnnealSchedule,
}

impl Default for QuboConfig {
    fn default() -> Self {
        Self {
            volumes: (2..=10).map(|e| 10f64.powi(e)).collect(),
            n_clusters: 9,
            seed: 0,
            chain_strength: 8.0,
            num_reads: 10,
            label: "Example - Maximum Cut".to_string(),
            anneal: AnnealSchedule::default(),
        }
    }
}

impl QuboConfig {
    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: QuboConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.volumes.is_empty() {
            return Err(QuboError::InvalidConfig("volume list is empty".into()));
        }
        if let Some(v) = self.volumes.iter().find(|v| !v.is_finite()) {
            return Err(QuboError::InvalidConfig(format!(
                "volume {} is not finite",
                v
            )));
        }
        if self.n_clusters == 0 {
            return Err(QuboError::InvalidConfig(
                "n_clusters must be at least 1".into(),
            ));
        }
        if self.n_clusters > self.volumes.len() {
            return Err(QuboError::InvalidConfig(format!(
                "n_clusters ({}) exceeds the number of volumes ({})",
                self.n_clusters,
                self.volumes.len()
            )));
        }
        if self.num_reads == 0 {
            return Err(QuboError::InvalidConfig("num_reads must be at least 1".into()));
        }
        if !self.chain_strength.is_finite() || self.chain_strength <= 0.0 {
            return Err(QuboError::InvalidConfig(format!(
                "chain_strength must be positive, got {}",
                self.chain_strength
            )));
        }
        self.anneal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_experiment() {
        let config = QuboConfig::default();
        assert_eq!(config.volumes.len(), 9);
        assert_eq!(config.volumes[0], 1e2);
        assert_eq!(config.volumes[8], 1e10);
        assert_eq!(config.n_clusters, 9);
        assert_eq!(config.chain_strength, 8.0);
        assert_eq!(config.num_reads, 10);
        assert_eq!(config.label, "Example - Maximum Cut");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let config = QuboConfig::from_toml_str(
            r#"
            volumes = [1.0, 1.1, 50.0, 51.0]
            n_clusters = 2
            num_reads = 4

            [anneal]
            sweeps = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.n_clusters, 2);
        assert_eq!(config.num_reads, 4);
        assert_eq!(config.anneal.sweeps, 50);
        assert_eq!(config.chain_strength, 8.0);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn rejects_more_clusters_than_volumes() {
        let config = QuboConfig {
            volumes: vec![1.0, 2.0],
            n_clusters: 3,
            ..QuboConfig::default()
        };
        assert!(matches!(config.validate(), Err(QuboError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_finite_volume() {
        let config = QuboConfig {
            volumes: vec![1.0, f64::NAN],
            n_clusters: 1,
            ..QuboConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_reads_and_bad_chain_strength() {
        let zero_reads = QuboConfig {
            num_reads: 0,
            ..QuboConfig::default()
        };
        assert!(zero_reads.validate().is_err());

        let bad_chain = QuboConfig {
            chain_strength: -1.0,
            ..QuboConfig::default()
        };
        assert!(bad_chain.validate().is_err());
    }
}
