//! Volume clustering into fewer groups than traders, so the QUBO is non-empty.
//!
//! Run with:
//!   cargo run --example volume_maxcut

use volume_qubo_sim::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = QuboConfig {
        volumes: vec![1e2, 2e2, 3e2, 1e5, 2e5, 1e8, 2e8, 3e8, 4e8],
        n_clusters: 3,
        num_reads: 20,
        ..QuboConfig::default()
    };

    let sampler = SimulatedAnnealingSampler::new(config.anneal, config.seed);
    let report = run_pipeline(&config, &sampler)?;

    println!("labels: {:?}", report.assignment.labels());
    println!("edges:  {}", report.edge_count());
    println!("QUBO:");
    for ((i, j), bias) in report.qubo.iter() {
        println!("  ({}, {}) -> {}", i, j, bias);
    }
    println!();
    println!("{}", report.response);
    if let Some(cut) = report.best_cut() {
        println!("best cut: {} / {} edges", cut, report.edge_count());
    }
    Ok(())
}
