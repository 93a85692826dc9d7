use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use noisy_trader_sim::prelude::*;

/// Returns the same histogram for every circuit and counts calls.
struct ScriptedBackend {
    values: Vec<u64>,
    calls: Arc<AtomicUsize>,
}

impl CircuitBackend for ScriptedBackend {
    fn execute(
        &mut self,
        _circuit: &Circuit,
        _noise: &NoiseModel,
        _shots: usize,
    ) -> Result<Counts, SimulationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.iter().copied().collect())
    }
}

/// Fails every execution.
struct BrokenBackend;

impl CircuitBackend for BrokenBackend {
    fn execute(
        &mut self,
        _circuit: &Circuit,
        _noise: &NoiseModel,
        _shots: usize,
    ) -> Result<Counts, SimulationError> {
        Err(SimulationError::Circuit("device offline".into()))
    }
}

/// Serves `ok` samples, then fails.
struct FlakyFeed {
    ok: usize,
}

#[async_trait]
impl MarketDataSource for FlakyFeed {
    async fn next_market_sample(&mut self) -> Result<MarketSample, TrainerError> {
        if self.ok == 0 {
            return Err(TrainerError::DataSource("exchange closed".into()));
        }
        self.ok -= 1;
        Ok(sample(2))
    }
}

fn sample(n: usize) -> MarketSample {
    MarketSample {
        data: vec![0.25; n],
        strategy: [Signal::Hedge, Signal::Flip].iter().copied().cycle().take(n).collect(),
        portfolio: vec![1.0 / n as f64; n],
    }
}

fn quick_optimizer() -> NelderMeadConfig {
    NelderMeadConfig {
        max_iterations: 3,
        ..NelderMeadConfig::default()
    }
}

#[tokio::test]
async fn runs_exactly_one_iteration_per_schedule_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = ScriptedBackend {
        values: vec![1, 2],
        calls: calls.clone(),
    };
    let schedule = Schedule::linspace(0.001, 0.0001, 7);
    let mut trainer = QmlTrainer::new(2, 2, backend, schedule.clone())
        .with_seed(0)
        .with_optimizer(quick_optimizer());
    let mut feed = ReplayFeed::new(vec![sample(2)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.len(), 7);
    assert_eq!(feed.served(), 7);
    for (i, report) in history.reports.iter().enumerate() {
        assert_eq!(report.iteration, i);
        assert_eq!(report.noise_rate, schedule.get(i).unwrap());
        assert_eq!(report.weights.len(), 2);
        assert_eq!(report.cost, 1.5);
    }
    let evaluations: usize = history.reports.iter().map(|r| r.evaluations).sum();
    assert_eq!(calls.load(Ordering::SeqCst), evaluations);
}

#[tokio::test]
async fn final_noise_rate_is_last_schedule_entry() {
    let schedule = Schedule::linspace(0.001, 0.0001, 4);
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut trainer = QmlTrainer::new(2, 1, backend, schedule.clone())
        .with_optimizer(quick_optimizer());
    let mut feed = ReplayFeed::new(vec![sample(2)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(trainer.noise_rate(), schedule.last().unwrap());
    assert_eq!(history.last().unwrap().noise_rate, 0.0001);
}

#[tokio::test]
async fn failing_simulation_scores_zero_and_loop_continues() {
    let mut trainer = QmlTrainer::new(2, 10, BrokenBackend, Schedule::new(vec![0.01, 0.005, 0.0]))
        .with_optimizer(quick_optimizer());
    let mut feed = ReplayFeed::new(vec![sample(2)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.len(), 3);
    for report in &history.reports {
        assert_eq!(report.cost, 0.0);
        assert_eq!(report.failed_evaluations, report.evaluations);
    }
    assert!(history.failed_evaluations() > 0);
}

#[tokio::test]
async fn oversized_sample_is_absorbed_by_cost() {
    let backend = ScriptedBackend {
        values: vec![3],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut trainer = QmlTrainer::new(2, 1, backend, Schedule::new(vec![0.0, 0.0]))
        .with_optimizer(quick_optimizer());
    // three features for two qubits never reach the backend
    let mut feed = ReplayFeed::new(vec![sample(3)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.len(), 2);
    assert!(history.costs().iter().all(|&c| c == 0.0));
}

#[tokio::test]
async fn data_source_failure_stops_the_loop() {
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut trainer = QmlTrainer::new(2, 1, backend, Schedule::linspace(0.01, 0.0, 5))
        .with_optimizer(quick_optimizer());
    let mut feed = FlakyFeed { ok: 2 };

    let err = run_training_loop(&mut trainer, &mut feed).await.unwrap_err();

    assert!(matches!(err, TrainerError::DataSource(_)));
    // the third iteration never installed its noise rate
    assert_eq!(trainer.noise_rate(), Schedule::linspace(0.01, 0.0, 5).get(1).unwrap());
}

#[tokio::test]
async fn closure_schedule_drives_the_loop() {
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let provider = FnNoiseRate::new(3, |i| 0.01 / (i + 1) as f64);
    let mut trainer = QmlTrainer::new(2, 1, backend, provider).with_optimizer(quick_optimizer());
    let mut feed = ReplayFeed::new(vec![sample(2)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.noise_rates(), vec![0.01, 0.005, 0.01 / 3.0]);
}

#[tokio::test]
async fn invalid_rate_keeps_previous_model_and_loop_advances() {
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let rates = [0.02, 2.0, 0.005];
    let provider = FnNoiseRate::new(rates.len(), move |i| rates[i]);
    let mut trainer = QmlTrainer::new(2, 1, backend, provider).with_optimizer(quick_optimizer());
    let mut feed = ReplayFeed::new(vec![sample(2)]);

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(feed.served(), 3);
    assert_eq!(history.noise_rates(), vec![0.02, 0.02, 0.005]);
    assert_eq!(trainer.noise_rate(), 0.005);
}

#[tokio::test(start_paused = true)]
async fn seeded_weights_do_not_mirror_seeded_market_data() {
    let config = TrainerConfig {
        n_qubits: 3,
        seed: Some(7),
        strategy: vec![Signal::Hedge, Signal::Flip, Signal::Hedge],
        ..TrainerConfig::default()
    };
    let streams = config.seed_streams().unwrap();
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut trainer = QmlTrainer::new(3, 1, backend, Schedule::new(vec![0.0]))
        .with_seed(streams.weights)
        .with_optimizer(NelderMeadConfig {
            max_iterations: 0,
            ..NelderMeadConfig::default()
        });
    let mut feed = SimulatedMarketFeed::new(
        config.n_qubits,
        config.strategy.clone(),
        config.fetch_latency(),
        Some(streams.market),
    );

    let sample = feed.next_market_sample().await.unwrap();
    let initial = trainer.train(&sample).weights;

    assert_eq!(initial.len(), sample.data.len());
    assert_ne!(initial, sample.data);
}

#[tokio::test]
async fn empty_schedule_runs_nothing() {
    let backend = ScriptedBackend {
        values: vec![0],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut trainer = QmlTrainer::new(2, 1, backend, Schedule::new(Vec::new()));
    let mut feed = ReplayFeed::new(Vec::new());

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert!(history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn simulated_feed_with_state_vector_backend() {
    let config = TrainerConfig {
        n_qubits: 2,
        shots: 4,
        max_iterations: 2,
        seed: Some(11),
        schedule_len: 2,
        strategy: vec![Signal::Hedge, Signal::Flip],
        ..TrainerConfig::default()
    };
    config.validate().unwrap();
    let streams = config.seed_streams().unwrap();

    let mut trainer = QmlTrainer::new(
        config.n_qubits,
        config.shots,
        StateVectorBackend::new(streams.backend),
        config.error_rate_schedule(),
    )
    .with_learning_rates(config.learning_rate_schedule())
    .with_optimizer(config.optimizer())
    .with_seed(streams.weights);
    let mut feed = SimulatedMarketFeed::new(
        config.n_qubits,
        config.strategy.clone(),
        Duration::from_millis(config.fetch_latency_ms),
        Some(streams.market),
    );

    let history = run_training_loop(&mut trainer, &mut feed).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history.failed_evaluations(), 0);
    assert_eq!(history.reports[0].learning_rate, 0.01);
    assert_eq!(history.reports[1].learning_rate, 0.001);
    assert_eq!(history.last().unwrap().noise_rate, 0.0001);
}
