//! # Noise Sweep
//!
//! Trains the six-asset trading circuit once per error rate and prints the
//! optimised cost, showing how depolarizing noise shifts the measured mean.
//!
//! Run: `cargo run --example noise_sweep`

use noisy_trader_sim::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample = MarketSample {
        data: vec![0.9, 0.1, 0.6, 0.4, 0.8, 0.3],
        strategy: [Signal::Hedge, Signal::Flip].repeat(3),
        portfolio: vec![1.0 / 6.0; 6],
    };
    let rates = Schedule::new(vec![0.0, 0.001, 0.01, 0.05, 0.1, 0.2]);

    let mut trainer = QmlTrainer::new(6, 200, StateVectorBackend::new(7), rates.clone())
        .with_seed(7)
        .with_optimizer(NelderMeadConfig {
            max_iterations: 20,
            initial_step: 0.1,
            ..NelderMeadConfig::default()
        });

    println!("  {:>10}  {:>10}  {:>6}", "error rate", "cost", "evals");
    println!("  {:─>10}  {:─>10}  {:─>6}", "", "", "");
    let mut costs = Vec::with_capacity(rates.len());
    for i in 0..rates.len() {
        let rate = trainer.adjust_noise(i)?;
        let outcome = trainer.train(&sample);
        println!(
            "  {:>10.4}  {:>10.3}  {:>6}",
            rate, outcome.cost, outcome.evaluations
        );
        costs.push(outcome.cost);
    }
    println!();

    let chart = render_line_chart(
        "Optimised cost by error-rate step",
        &[Series::new("cost", costs)],
        40,
        10,
    );
    println!("{}", chart);
    Ok(())
}
