//! `qubo-maxcut`: cluster trader volumes, build the max-cut QUBO and sample it.

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use volume_qubo_sim::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "qubo-maxcut", about = "Max-cut QUBO over k-means clustered trading volumes")]
struct Args {
    /// TOML config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of k-means clusters.
    #[arg(long)]
    clusters: Option<usize>,

    /// Number of sampler reads.
    #[arg(long)]
    reads: Option<usize>,

    /// Seed for clustering and sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Chain strength passed to the sampler.
    #[arg(long)]
    chain_strength: Option<f64>,

    /// Also print the QUBO coefficients as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => QuboConfig::load(path)?,
        None => QuboConfig::default(),
    };
    if let Some(k) = args.clusters {
        config.n_clusters = k;
    }
    if let Some(reads) = args.reads {
        config.num_reads = reads;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(cs) = args.chain_strength {
        config.chain_strength = cs;
    }

    let sampler = SimulatedAnnealingSampler::new(config.anneal, config.seed);
    let report = run_pipeline(&config, &sampler)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.qubo)?);
    }

    println!("QPU response:");
    println!("{}", report.response);
    if let Some(cut) = report.best_cut() {
        log::info!("best sample cuts {} of {} edges", cut, report.edge_count());
    }

    Ok(())
}
