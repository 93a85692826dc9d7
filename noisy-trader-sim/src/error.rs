//! Error types.
//!
//! `SimulationError` covers a single circuit execution and never escapes the
//! cost function. `TrainerError` covers configuration and the training loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("qubit {qubit} out of range for a {n_qubits}-qubit circuit")]
    QubitOutOfRange { qubit: usize, n_qubits: usize },

    #[error("invalid gate: {0}")]
    InvalidGate(String),

    #[error("simulator error: {0}")]
    Circuit(String),

    #[error("circuit executed with zero shots")]
    NoShots,
}

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("noise rate {0} outside [0, 1]")]
    InvalidNoiseRate(f64),

    #[error("iteration {iteration} is past the end of a {len}-step schedule")]
    ScheduleExhausted { iteration: usize, len: usize },

    #[error("market data source failed: {0}")]
    DataSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("optimizer failed: {0}")]
    Optimizer(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
