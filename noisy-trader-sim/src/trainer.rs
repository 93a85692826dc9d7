//! Weight trainer for the noisy trading circuit.
//!
//! The trainer owns exactly one piece of mutable run state, the active
//! [`NoiseModel`], which the training loop replaces through
//! [`QmlTrainer::adjust_noise`] before each optimisation. Simulation failures
//! inside the cost function are logged and scored as zero so a single bad
//! circuit never aborts training.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::CircuitBackend;
use crate::circuit::trading_circuit;
use crate::error::{Result, TrainerError};
use crate::market::MarketSample;
use crate::noise::NoiseModel;
use crate::optimizer::{nelder_mead, Minimum, NelderMeadConfig};
use crate::schedule::{NoiseRateProvider, Schedule};

/// One cost function evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEvaluation {
    pub value: f64,
    /// The circuit could not be built or executed; `value` is 0.
    pub failed: bool,
}

/// Result of optimising the weights for one market sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub weights: Vec<f64>,
    pub cost: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub failed_evaluations: usize,
}

pub struct QmlTrainer<B, P> {
    n_qubits: usize,
    shots: usize,
    backend: B,
    noise_rates: P,
    learning_rates: Option<Schedule>,
    noise: NoiseModel,
    iteration: usize,
    optimizer: NelderMeadConfig,
    rng: StdRng,
}

impl<B: CircuitBackend, P: NoiseRateProvider> QmlTrainer<B, P> {
    /// A trainer that starts noise-free until the first `adjust_noise`.
    pub fn new(n_qubits: usize, shots: usize, backend: B, noise_rates: P) -> Self {
        Self {
            n_qubits,
            shots,
            backend,
            noise_rates,
            learning_rates: None,
            noise: NoiseModel::ideal(),
            iteration: 0,
            optimizer: NelderMeadConfig::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Per-iteration initial simplex step.
    pub fn with_learning_rates(mut self, schedule: Schedule) -> Self {
        self.learning_rates = Some(schedule);
        self
    }

    pub fn with_optimizer(mut self, config: NelderMeadConfig) -> Self {
        self.optimizer = config;
        self
    }

    /// Seed the initial-weight RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    pub fn noise_rates(&self) -> &P {
        &self.noise_rates
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of iterations the noise schedule drives.
    pub fn schedule_len(&self) -> usize {
        self.noise_rates.len()
    }

    /// Install the noise model for `iteration` and return its rate.
    ///
    /// An out-of-range rate still moves the trainer to `iteration` but leaves
    /// the previous noise model in place.
    pub fn adjust_noise(&mut self, iteration: usize) -> Result<f64> {
        let rate = self
            .noise_rates
            .rate_at(iteration)
            .ok_or(TrainerError::ScheduleExhausted {
                iteration,
                len: self.noise_rates.len(),
            })?;
        self.iteration = iteration;
        self.noise = NoiseModel::depolarizing(rate)?;
        log::debug!("iteration {}: depolarizing error rate {}", iteration, rate);
        Ok(rate)
    }

    /// Rate of the active noise model.
    pub fn noise_rate(&self) -> f64 {
        self.noise.rate()
    }

    /// Learning rate for the current iteration, or the configured step.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rates
            .as_ref()
            .and_then(|s| s.get(self.iteration))
            .unwrap_or(self.optimizer.initial_step)
    }

    /// Mean measured value of the trading circuit for `weights`.
    pub fn cost(&mut self, weights: &[f64], sample: &MarketSample) -> CostEvaluation {
        let counts = trading_circuit(self.n_qubits, &sample.data, &sample.strategy, weights)
            .and_then(|circuit| self.backend.execute(&circuit, &self.noise, self.shots));

        match counts.map(|c| c.mean_value()) {
            Ok(Some(value)) => CostEvaluation {
                value,
                failed: false,
            },
            Ok(None) => {
                log::error!("circuit returned no measurements, scoring as 0");
                CostEvaluation {
                    value: 0.0,
                    failed: true,
                }
            }
            Err(e) => {
                log::error!("error in cost function: {}", e);
                CostEvaluation {
                    value: 0.0,
                    failed: true,
                }
            }
        }
    }

    /// Minimise the cost starting from `weights`.
    pub fn optimize(&mut self, weights: &[f64], sample: &MarketSample) -> TrainingOutcome {
        let config = NelderMeadConfig {
            initial_step: self.learning_rate(),
            ..self.optimizer
        };
        let mut failed_evaluations = 0;
        let result = nelder_mead(
            |w| {
                let eval = self.cost(w, sample);
                if eval.failed {
                    failed_evaluations += 1;
                }
                eval.value
            },
            weights,
            &config,
        );
        let min = match result {
            Ok(min) => min,
            Err(e) => {
                log::error!("optimizer failed, keeping starting weights: {}", e);
                let eval = self.cost(weights, sample);
                if eval.failed {
                    failed_evaluations += 1;
                }
                Minimum {
                    x: weights.to_vec(),
                    value: eval.value,
                    iterations: 0,
                    evaluations: 1,
                }
            }
        };
        if failed_evaluations > 0 {
            log::warn!(
                "{} of {} cost evaluations failed",
                failed_evaluations,
                min.evaluations
            );
        }
        TrainingOutcome {
            weights: min.x,
            cost: min.value,
            iterations: min.iterations,
            evaluations: min.evaluations,
            failed_evaluations,
        }
    }

    /// Optimise from random initial weights in `[0, 1)`.
    pub fn train(&mut self, sample: &MarketSample) -> TrainingOutcome {
        let initial: Vec<f64> = (0..self.n_qubits).map(|_| self.rng.gen::<f64>()).collect();
        self.optimize(&initial, sample)
    }
}
