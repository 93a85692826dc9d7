use criterion::{black_box, criterion_group, criterion_main, Criterion};
use noisy_trader_sim::prelude::*;

fn benchmark_execution(c: &mut Criterion) {
    let strategy = [Signal::Hedge, Signal::Flip].repeat(3);
    let data = [0.3, 0.1, 0.7, 0.5, 0.9, 0.2];
    let circuit = trading_circuit(6, &data, &strategy, &[1.0; 6]).unwrap();
    let noise = NoiseModel::depolarizing(0.001).unwrap();
    let mut backend = StateVectorBackend::new(0);

    c.bench_function("trading_circuit_6q_100_shots", |b| {
        b.iter(|| backend.execute(black_box(&circuit), &noise, 100).unwrap());
    });
}

fn benchmark_optimizer(c: &mut Criterion) {
    let config = NelderMeadConfig {
        max_iterations: 100,
        initial_step: 0.1,
        tolerance: 1e-10,
    };
    c.bench_function("nelder_mead_6d_quadratic", |b| {
        b.iter(|| {
            nelder_mead(
                |x: &[f64]| x.iter().enumerate().map(|(i, v)| (v - i as f64).powi(2)).sum(),
                black_box(&[0.0; 6]),
                &config,
            )
            .unwrap()
        });
    });
}

fn benchmark_training_step(c: &mut Criterion) {
    let sample = MarketSample {
        data: vec![0.4; 4],
        strategy: [Signal::Hedge, Signal::Flip].repeat(2),
        portfolio: vec![0.25; 4],
    };
    let mut trainer = QmlTrainer::new(4, 20, StateVectorBackend::new(1), Schedule::new(vec![0.001]))
        .with_seed(1)
        .with_optimizer(NelderMeadConfig {
            max_iterations: 10,
            ..NelderMeadConfig::default()
        });
    trainer.adjust_noise(0).unwrap();

    c.bench_function("train_4q_20_shots_10_iterations", |b| {
        b.iter(|| trainer.train(black_box(&sample)));
    });
}

criterion_group!(
    benches,
    benchmark_execution,
    benchmark_optimizer,
    benchmark_training_step
);
criterion_main!(benches);
