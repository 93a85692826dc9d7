//! # volume-qubo-sim
//!
//! Max-cut QUBO construction over traders grouped by trading volume.
//!
//! Volumes are clustered with k-means, traders sharing a cluster are joined
//! in a similarity graph, and every edge is folded into a QUBO coefficient
//! map using the standard max-cut encoding. The QUBO is then handed to a
//! [`QuboSampler`](sampler::QuboSampler); the crate ships a simulated
//! annealing sampler in place of annealer hardware.
//!
//! ## Usage
//!
//! ```no_run
//! use volume_qubo_sim::prelude::*;
//!
//! let config = QuboConfig::default();
//! let sampler = SimulatedAnnealingSampler::new(config.anneal, config.seed);
//! let report = run_pipeline(&config, &sampler).unwrap();
//! println!("{}", report.response);
//! ```

pub mod anneal;
pub mod clustering;
pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod qubo;
pub mod sampler;

pub mod prelude {
    pub use crate::anneal::*;
    pub use crate::clustering::*;
    pub use crate::config::*;
    pub use crate::error::QuboError;
    pub use crate::graph::*;
    pub use crate::pipeline::*;
    pub use crate::qubo::*;
    pub use crate::sampler::*;
}
