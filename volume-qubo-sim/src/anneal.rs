//! In-process simulated annealing sampler.
//!
//! Each read starts from random bits and performs single-bit-flip Metropolis
//! sweeps while the inverse temperature β rises geometrically from
//! `beta_start` to `beta_end`. Reads are independent: read `r` seeds its own
//! RNG from `(seed, r)`, so results do not depend on how reads are scheduled
//! across threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{QuboError, Result};
use crate::qubo::QuboMatrix;
use crate::sampler::{QuboSampler, SampleParams, SampleSet};

/// Inverse-temperature schedule for one anneal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealSchedule {
    /// Initial inverse temperature (hot).
    pub beta_start: f64,
    /// Final inverse temperature (cold).
    pub beta_end: f64,
    /// Number of full sweeps over all variables.
    pub sweeps: usize,
}

impl Default for AnnealSchedule {
    fn default() -> Self {
        Self {
            beta_start: 0.1,
            beta_end: 5.0,
            sweeps: 1000,
        }
    }
}

impl AnnealSchedule {
    pub fn validate(&self) -> Result<()> {
        if !(self.beta_start > 0.0 && self.beta_start.is_finite()) {
            return Err(QuboError::InvalidConfig(format!(
                "beta_start must be positive, got {}",
                self.beta_start
            )));
        }
        if !(self.beta_end >= self.beta_start && self.beta_end.is_finite()) {
            return Err(QuboError::InvalidConfig(format!(
                "beta_end ({}) must be finite and >= beta_start ({})",
                self.beta_end, self.beta_start
            )));
        }
        if self.sweeps == 0 {
            return Err(QuboError::InvalidConfig("sweeps must be at least 1".into()));
        }
        Ok(())
    }

    /// β at sweep `t` of `self.sweeps`.
    pub fn beta_at(&self, t: usize) -> f64 {
        if self.sweeps <= 1 {
            return self.beta_end;
        }
        let frac = t as f64 / (self.sweeps - 1) as f64;
        self.beta_start * (self.beta_end / self.beta_start).powf(frac)
    }
}

/// Dense view of a QUBO for fast flip-energy updates.
struct IsingProblem {
    linear: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl IsingProblem {
    fn new(q: &QuboMatrix, variables: &[usize]) -> Self {
        let pos = |v: usize| variables.binary_search(&v).ok();
        let n = variables.len();
        let mut linear = vec![0.0; n];
        let mut neighbors = vec![Vec::new(); n];

        for ((i, j), bias) in q.iter() {
            let (Some(a), Some(b)) = (pos(i), pos(j)) else {
                continue;
            };
            if a == b {
                linear[a] += bias as f64;
            } else {
                neighbors[a].push((b, bias as f64));
                neighbors[b].push((a, bias as f64));
            }
        }

        Self { linear, neighbors }
    }

    fn len(&self) -> usize {
        self.linear.len()
    }

    /// Energy change from flipping bit `k`.
    fn flip_delta(&self, bits: &[u8], k: usize) -> f64 {
        let field: f64 = self.linear[k]
            + self.neighbors[k]
                .iter()
                .map(|&(j, w)| w * bits[j] as f64)
                .sum::<f64>();
        if bits[k] == 0 {
            field
        } else {
            -field
        }
    }
}

/// Simulated annealing stand-in for annealer hardware.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingSampler {
    pub schedule: AnnealSchedule,
    pub seed: u64,
}

impl SimulatedAnnealingSampler {
    pub fn new(schedule: AnnealSchedule, seed: u64) -> Self {
        Self { schedule, seed }
    }

    fn read_seed(&self, read: usize) -> u64 {
        self.seed.wrapping_add(read as u64 * 7919)
    }

    fn anneal_read(&self, problem: &IsingProblem, read: usize) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(self.read_seed(read));
        let n = problem.len();
        let mut bits: Vec<u8> = (0..n).map(|_| rng.gen_range(0..=1u8)).collect();

        for t in 0..self.schedule.sweeps {
            let beta = self.schedule.beta_at(t);
            for k in 0..n {
                let delta = problem.flip_delta(&bits, k);
                if delta <= 0.0 || rng.gen::<f64>() < (-beta * delta).exp() {
                    bits[k] ^= 1;
                }
            }
        }

        bits
    }
}

impl Default for SimulatedAnnealingSampler {
    fn default() -> Self {
        Self::new(AnnealSchedule::default(), 0)
    }
}

impl QuboSampler for SimulatedAnnealingSampler {
    fn name(&self) -> &str {
        "simulated-annealing"
    }

    fn sample_qubo(&self, q: &QuboMatrix, params: &SampleParams) -> Result<SampleSet> {
        self.schedule.validate()?;
        if params.num_reads == 0 {
            return Err(QuboError::Sampler("num_reads must be at least 1".into()));
        }
        if !(params.chain_strength.is_finite() && params.chain_strength > 0.0) {
            return Err(QuboError::Sampler(format!(
                "chain_strength must be positive, got {}",
                params.chain_strength
            )));
        }

        let variables = q.variables();
        let problem = IsingProblem::new(q, &variables);
        log::info!(
            "sampling '{}': {} variables, {} terms, {} reads (chain strength {} unused without embedding)",
            params.label,
            variables.len(),
            q.len(),
            params.num_reads,
            params.chain_strength
        );

        #[cfg(feature = "parallel")]
        let samples: Vec<Vec<u8>> = (0..params.num_reads)
            .into_par_iter()
            .map(|r| self.anneal_read(&problem, r))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let samples: Vec<Vec<u8>> = (0..params.num_reads)
            .map(|r| self.anneal_read(&problem, r))
            .collect();

        let reads = samples
            .into_iter()
            .map(|s| {
                let energy = q.energy_of(&variables, &s);
                (s, energy)
            })
            .collect();

        Ok(SampleSet::from_reads(variables, reads, params.label.clone()))
    }
}
