//! Sequential async training loop.
//!
//! Each iteration awaits one market sample, installs the scheduled noise
//! rate, retrains the weights and records the result. Iterations never
//! overlap, and the loop ends after the last scheduled noise rate.

use serde::Serialize;

use crate::backend::CircuitBackend;
use crate::error::{Result, TrainerError};
use crate::market::MarketDataSource;
use crate::schedule::NoiseRateProvider;
use crate::trainer::QmlTrainer;

/// What happened in one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    pub noise_rate: f64,
    pub learning_rate: f64,
    pub weights: Vec<f64>,
    pub cost: f64,
    pub evaluations: usize,
    pub failed_evaluations: usize,
}

/// Reports from a completed run, in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingLog {
    pub reports: Vec<IterationReport>,
}

impl TrainingLog {
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn last(&self) -> Option<&IterationReport> {
        self.reports.last()
    }

    pub fn noise_rates(&self) -> Vec<f64> {
        self.reports.iter().map(|r| r.noise_rate).collect()
    }

    pub fn costs(&self) -> Vec<f64> {
        self.reports.iter().map(|r| r.cost).collect()
    }

    pub fn failed_evaluations(&self) -> usize {
        self.reports.iter().map(|r| r.failed_evaluations).sum()
    }
}

/// Drive `trainer` for every step of its noise schedule.
///
/// Simulation failures are absorbed by the cost function and an out-of-range
/// noise rate keeps the previous model. A failing data source stops the
/// loop and is returned.
pub async fn run_training_loop<B, P, S>(
    trainer: &mut QmlTrainer<B, P>,
    source: &mut S,
) -> Result<TrainingLog>
where
    B: CircuitBackend,
    P: NoiseRateProvider,
    S: MarketDataSource + ?Sized,
{
    let total = trainer.schedule_len();
    let mut history = TrainingLog {
        reports: Vec::with_capacity(total),
    };
    log::info!("starting training loop: {} iterations", total);

    for iteration in 0..total {
        let sample = source.next_market_sample().await?;
        let noise_rate = match trainer.adjust_noise(iteration) {
            Ok(rate) => rate,
            Err(TrainerError::InvalidNoiseRate(rate)) => {
                log::error!(
                    "iteration {}: ignoring noise rate {}, keeping {}",
                    iteration,
                    rate,
                    trainer.noise_rate()
                );
                trainer.noise_rate()
            }
            Err(e) => return Err(e),
        };
        let learning_rate = trainer.learning_rate();
        let outcome = trainer.train(&sample);

        log::info!("Iteration {}, optimal weights: {:?}", iteration, outcome.weights);
        log::debug!(
            "iteration {}: cost {:.4}, {} evaluations, noise rate {:.6}",
            iteration,
            outcome.cost,
            outcome.evaluations,
            noise_rate
        );

        history.reports.push(IterationReport {
            iteration,
            noise_rate,
            learning_rate,
            weights: outcome.weights,
            cost: outcome.cost,
            evaluations: outcome.evaluations,
            failed_evaluations: outcome.failed_evaluations,
        });
    }

    log::info!(
        "training loop finished after {} iterations ({} failed evaluations)",
        history.len(),
        history.failed_evaluations()
    );
    Ok(history)
}
