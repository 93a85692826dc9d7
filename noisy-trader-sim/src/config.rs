//! Trainer configuration.
//!
//! Defaults reproduce the reference run: six assets, 1000 shots, a
//! 1000-step schedule taking the learning rate from 0.01 to 0.001 and the
//! depolarizing error rate from 0.001 to 0.0001, one market sample per
//! second and at most 100 optimiser iterations per sample.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::circuit::Signal;
use crate::error::{Result, TrainerError};
use crate::optimizer::NelderMeadConfig;
use crate::schedule::Schedule;

/// Linear ramp from `start` to `end` over the schedule length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub start: f64,
    pub end: f64,
}

impl RateRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn schedule(&self, len: usize) -> Schedule {
        Schedule::linspace(self.start, self.end, len)
    }
}

/// Chart output at exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: usize,
    pub height: usize,
    /// Also dump the plotted series here.
    pub csv: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 72,
            height: 16,
            csv: None,
        }
    }
}

/// Per-consumer seeds derived from one master seed, so noise sampling,
/// initial weights and market data never share a random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedStreams {
    pub backend: u64,
    pub weights: u64,
    pub market: u64,
}

impl SeedStreams {
    pub fn from_master(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            backend: rng.gen(),
            weights: rng.gen(),
            market: rng.gen(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// One qubit per asset.
    pub n_qubits: usize,
    /// Shots per circuit execution.
    pub shots: usize,
    /// Optimiser iteration budget per market sample.
    pub max_iterations: usize,
    /// Seeds noise sampling, market data and initial weights when set.
    pub seed: Option<u64>,
    /// Number of training iterations.
    pub schedule_len: usize,
    pub learning_rate: RateRange,
    pub error_rate: RateRange,
    /// Delay before each simulated market sample.
    pub fetch_latency_ms: u64,
    pub strategy: Vec<Signal>,
    pub chart: ChartConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_qubits: 6,
            shots: 1000,
            max_iterations: 100,
            seed: None,
            schedule_len: 1000,
            learning_rate: RateRange::new(0.01, 0.001),
            error_rate: RateRange::new(0.001, 0.0001),
            fetch_latency_ms: 1000,
            strategy: [Signal::Hedge, Signal::Flip].repeat(3),
            chart: ChartConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: TrainerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_qubits == 0 {
            return Err(TrainerError::InvalidConfig("n_qubits must be at least 1".into()));
        }
        if self.n_qubits > 63 {
            return Err(TrainerError::InvalidConfig(format!(
                "n_qubits ({}) exceeds the 63 qubits a measurement value can hold",
                self.n_qubits
            )));
        }
        if self.shots == 0 {
            return Err(TrainerError::InvalidConfig("shots must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(TrainerError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.schedule_len == 0 {
            return Err(TrainerError::InvalidConfig(
                "schedule_len must be at least 1".into(),
            ));
        }
        for rate in [self.error_rate.start, self.error_rate.end] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(TrainerError::InvalidNoiseRate(rate));
            }
        }
        for rate in [self.learning_rate.start, self.learning_rate.end] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(TrainerError::InvalidConfig(format!(
                    "learning rate must be positive, got {}",
                    rate
                )));
            }
        }
        if self.strategy.len() != self.n_qubits {
            return Err(TrainerError::InvalidConfig(format!(
                "strategy has {} signals for {} qubits",
                self.strategy.len(),
                self.n_qubits
            )));
        }
        Ok(())
    }

    pub fn learning_rate_schedule(&self) -> Schedule {
        self.learning_rate.schedule(self.schedule_len)
    }

    pub fn error_rate_schedule(&self) -> Schedule {
        self.error_rate.schedule(self.schedule_len)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    pub fn seed_streams(&self) -> Option<SeedStreams> {
        self.seed.map(SeedStreams::from_master)
    }

    pub fn optimizer(&self) -> NelderMeadConfig {
        NelderMeadConfig {
            max_iterations: self.max_iterations,
            initial_step: self.learning_rate.start,
            ..NelderMeadConfig::default()
        }
    }
}
