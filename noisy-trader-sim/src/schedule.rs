//! Per-iteration schedules.
//!
//! A [`Schedule`] is a fixed, read-only sequence indexed by iteration. The
//! trainer takes its noise rate from a [`NoiseRateProvider`], which is either
//! a schedule or a closure with an explicit length.

/// Fixed-length sequence of scalars indexed by iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule(Vec<f64>);

impl Schedule {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// `num` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(start: f64, end: f64, num: usize) -> Self {
        match num {
            0 => Self(Vec::new()),
            1 => Self(vec![start]),
            _ => {
                let step = (end - start) / (num - 1) as f64;
                let mut values: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
                values[num - 1] = end;
                Self(values)
            }
        }
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.0.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Schedule {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Source of the noise rate applied at each iteration.
///
/// The training loop runs exactly `len()` iterations.
pub trait NoiseRateProvider {
    fn len(&self) -> usize;

    fn rate_at(&self, iteration: usize) -> Option<f64>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoiseRateProvider for Schedule {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn rate_at(&self, iteration: usize) -> Option<f64> {
        self.get(iteration)
    }
}

/// Noise rate computed by a closure over `0..len`.
pub struct FnNoiseRate<F> {
    len: usize,
    f: F,
}

impl<F: Fn(usize) -> f64> FnNoiseRate<F> {
    pub fn new(len: usize, f: F) -> Self {
        Self { len, f }
    }
}

impl<F: Fn(usize) -> f64> NoiseRateProvider for FnNoiseRate<F> {
    fn len(&self) -> usize {
        self.len
    }

    fn rate_at(&self, iteration: usize) -> Option<f64> {
        (iteration < self.len).then(|| (self.f)(iteration))
    }
}
