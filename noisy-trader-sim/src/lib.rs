//! # noisy-trader-sim
//!
//! Trading-weight optimisation on a noisy parameterised circuit.
//!
//! Each asset is one qubit. Market features are encoded as `RX(w · x)`
//! rotations, the per-asset strategy signal entangles (`-1`) or flips (`1`)
//! the qubit, and the cost is the mean integer value measured over a batch
//! of shots under depolarizing noise. An async loop pulls market samples,
//! steps the noise rate down a schedule and re-optimises the weights with a
//! gradient-free simplex search.
//!
//! ## Usage
//!
//! ```no_run
//! use noisy_trader_sim::prelude::*;
//!
//! # async fn demo() -> Result<(), TrainerError> {
//! let config = TrainerConfig::default();
//! let mut trainer = QmlTrainer::new(
//!     config.n_qubits,
//!     config.shots,
//!     StateVectorBackend::new(0),
//!     config.error_rate_schedule(),
//! )
//! .with_learning_rates(config.learning_rate_schedule())
//! .with_optimizer(config.optimizer());
//! let mut feed = SimulatedMarketFeed::new(
//!     config.n_qubits,
//!     config.strategy.clone(),
//!     config.fetch_latency(),
//!     None,
//! );
//! let log = run_training_loop(&mut trainer, &mut feed).await?;
//! println!("final weights: {:?}", log.last().map(|r| &r.weights));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod chart;
pub mod circuit;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod market;
pub mod noise;
pub mod optimizer;
pub mod schedule;
pub mod trainer;

pub mod prelude {
    pub use crate::backend::*;
    pub use crate::chart::*;
    pub use crate::circuit::*;
    pub use crate::config::*;
    pub use crate::error::{SimulationError, TrainerError};
    pub use crate::event_loop::*;
    pub use crate::market::*;
    pub use crate::noise::*;
    pub use crate::optimizer::*;
    pub use crate::schedule::*;
    pub use crate::trainer::*;
}
