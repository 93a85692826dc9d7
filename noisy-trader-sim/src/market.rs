//! Market data sources feeding the training loop.

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::circuit::Signal;
use crate::error::{Result, TrainerError};

/// One observation handed to the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSample {
    /// Per-asset features, encoded as rotation angles.
    pub data: Vec<f64>,
    /// Per-asset strategy signals.
    pub strategy: Vec<Signal>,
    /// Portfolio weights. Carried through but not used by the cost.
    pub portfolio: Vec<f64>,
}

/// Asynchronous provider of market samples.
#[async_trait]
pub trait MarketDataSource: Send {
    async fn next_market_sample(&mut self) -> Result<MarketSample>;
}

/// Random market data delivered after a fixed latency.
#[derive(Debug)]
pub struct SimulatedMarketFeed {
    n_assets: usize,
    strategy: Vec<Signal>,
    latency: Duration,
    rng: StdRng,
}

impl SimulatedMarketFeed {
    pub fn new(n_assets: usize, strategy: Vec<Signal>, latency: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            n_assets,
            strategy,
            latency,
            rng,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl MarketDataSource for SimulatedMarketFeed {
    async fn next_market_sample(&mut self) -> Result<MarketSample> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let n = self.n_assets;
        let data = (0..n).map(|_| self.rng.gen::<f64>()).collect();
        let portfolio = (0..n).map(|_| self.rng.gen::<f64>()).collect();
        Ok(MarketSample {
            data,
            strategy: self.strategy.clone(),
            portfolio,
        })
    }
}

/// Replays a fixed list of samples in a cycle, without delay.
#[derive(Debug, Clone)]
pub struct ReplayFeed {
    samples: Vec<MarketSample>,
    next: usize,
}

impl ReplayFeed {
    pub fn new(samples: Vec<MarketSample>) -> Self {
        Self { samples, next: 0 }
    }

    /// Number of samples served so far.
    pub fn served(&self) -> usize {
        self.next
    }
}

#[async_trait]
impl MarketDataSource for ReplayFeed {
    async fn next_market_sample(&mut self) -> Result<MarketSample> {
        if self.samples.is_empty() {
            return Err(TrainerError::DataSource("replay feed has no samples".into()));
        }
        let sample = self.samples[self.next % self.samples.len()].clone();
        self.next += 1;
        Ok(sample)
    }
}
