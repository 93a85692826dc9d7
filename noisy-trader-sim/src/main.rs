//! `qml-trader`: run the noisy trading-weight training loop, then chart the
//! learning-rate and error-rate schedules.

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use noisy_trader_sim::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "qml-trader", about = "Noisy parameterised-circuit trading-weight optimiser")]
struct Args {
    /// TOML config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of training iterations (schedule length).
    #[arg(long)]
    iterations: Option<usize>,

    /// Shots per circuit execution.
    #[arg(long)]
    shots: Option<usize>,

    /// Optimiser iteration budget per market sample.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Simulated market data latency in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Seed for noise, market data and initial weights.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    chart_width: Option<usize>,

    #[arg(long)]
    chart_height: Option<usize>,

    /// Write the plotted schedules as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrainerConfig::load(path)?,
        None => TrainerConfig::default(),
    };
    if let Some(n) = args.iterations {
        config.schedule_len = n;
    }
    if let Some(shots) = args.shots {
        config.shots = shots;
    }
    if let Some(n) = args.max_iterations {
        config.max_iterations = n;
    }
    if let Some(ms) = args.latency_ms {
        config.fetch_latency_ms = ms;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(w) = args.chart_width {
        config.chart.width = w;
    }
    if let Some(h) = args.chart_height {
        config.chart.height = h;
    }
    if args.csv.is_some() {
        config.chart.csv = args.csv;
    }
    config.validate()?;

    let learning_rates = config.learning_rate_schedule();
    let error_rates = config.error_rate_schedule();

    let streams = config.seed_streams();
    let backend = match streams {
        Some(s) => StateVectorBackend::new(s.backend),
        None => StateVectorBackend::from_entropy(),
    };
    let mut trainer = QmlTrainer::new(config.n_qubits, config.shots, backend, error_rates.clone())
        .with_learning_rates(learning_rates.clone())
        .with_optimizer(config.optimizer());
    if let Some(s) = streams {
        trainer = trainer.with_seed(s.weights);
    }
    let mut feed = SimulatedMarketFeed::new(
        config.n_qubits,
        config.strategy.clone(),
        config.fetch_latency(),
        streams.map(|s| s.market),
    );

    match run_training_loop(&mut trainer, &mut feed).await {
        Ok(history) => {
            if let Some(last) = history.last() {
                log::info!(
                    "final cost {:.4} with weights {:?}",
                    last.cost,
                    last.weights
                );
            }
        }
        Err(e) => log::error!("An error occurred: {}", e),
    }

    let series = [
        Series::new("learning rate", learning_rates.as_slice().to_vec()),
        Series::new("error rate", error_rates.as_slice().to_vec()),
    ];
    println!(
        "{}",
        render_line_chart(
            "Learning rate and error rate schedules",
            &series,
            config.chart.width,
            config.chart.height
        )
    );
    if let Some(path) = &config.chart.csv {
        match write_csv(path, &series) {
            Ok(()) => log::info!("wrote schedules to {}", path.display()),
            Err(e) => log::error!("failed to write {}: {}", path.display(), e),
        }
    }

    Ok(())
}
