//! Depolarizing noise applied by Monte Carlo Kraus sampling.
//!
//! After every noisy gate one Kraus operator (a scaled Pauli) is drawn in
//! proportion to its weight and applied as an extra single-qubit matrix, so
//! one circuit build is one trajectory of the noisy channel.

use num_complex::Complex;
use rand::Rng;

use crate::error::{Result, TrainerError};

/// A single-qubit 2x2 matrix stored as [row0col0, row0col1, row1col0, row1col1].
pub type Matrix2x2 = [Complex<f64>; 4];

/// Kraus operator with its sampling probability.
#[derive(Debug, Clone)]
pub struct KrausOperator {
    pub matrix: Matrix2x2,
    pub probability: f64,
}

/// Single-qubit Pauli operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    pub fn matrix(self) -> Matrix2x2 {
        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        let i = Complex::new(0.0, 1.0);
        match self {
            Pauli::I => [one, zero, zero, one],
            Pauli::X => [zero, one, one, zero],
            Pauli::Y => [zero, -i, i, zero],
            Pauli::Z => [one, zero, zero, -one],
        }
    }
}

/// A quantum noise channel applied to individual qubits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseChannel {
    /// With probability p, replaces the state with the maximally mixed one.
    /// Kraus: {√(1-3p/4)·I, √(p/4)·X, √(p/4)·Y, √(p/4)·Z}
    Depolarizing { p: f64 },
}

impl NoiseChannel {
    /// Generate the Kraus operators for this channel.
    pub fn kraus_operators(&self) -> Vec<KrausOperator> {
        match *self {
            NoiseChannel::Depolarizing { p } => {
                let p = p.clamp(0.0, 1.0);
                Pauli::ALL
                    .iter()
                    .map(|&pauli| {
                        let probability = if pauli == Pauli::I {
                            1.0 - 3.0 * p / 4.0
                        } else {
                            p / 4.0
                        };
                        let scale = Complex::new(probability.sqrt(), 0.0);
                        KrausOperator {
                            matrix: pauli.matrix().map(|c| c * scale),
                            probability,
                        }
                    })
                    .collect()
            }
        }
    }

    /// Sample the Pauli applied on this trajectory.
    ///
    /// A depolarizing event draws uniformly from all four Paulis, so the
    /// identity still turns up on a quarter of them.
    pub fn sample_pauli<R: Rng + ?Sized>(&self, rng: &mut R) -> Pauli {
        match *self {
            NoiseChannel::Depolarizing { p } => {
                let p = p.clamp(0.0, 1.0);
                if p == 0.0 || rng.gen::<f64>() >= p {
                    Pauli::I
                } else {
                    Pauli::ALL[rng.gen_range(0..4)]
                }
            }
        }
    }
}

/// Two-qubit depolarizing channel: with probability p, one of the 16
/// Pauli pairs chosen uniformly. A non-identity pair follows with
/// probability 15p/16.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoQubitDepolarizing {
    pub p: f64,
}

impl TwoQubitDepolarizing {
    /// Sample the Pauli pair applied to (control, target).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (Pauli, Pauli) {
        let p = self.p.clamp(0.0, 1.0);
        if p == 0.0 || rng.gen::<f64>() >= p {
            return (Pauli::I, Pauli::I);
        }
        let k = rng.gen_range(0..16);
        (Pauli::ALL[k / 4], Pauli::ALL[k % 4])
    }
}

/// Per-gate noise: the single-qubit channel follows every
/// `rx` and `x`, the two-qubit channel follows every `cx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseModel {
    rate: f64,
    pub single_qubit: NoiseChannel,
    pub two_qubit: TwoQubitDepolarizing,
}

impl NoiseModel {
    /// Depolarizing noise with the same error rate for 1- and 2-qubit gates.
    pub fn depolarizing(rate: f64) -> Result<Self> {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(TrainerError::InvalidNoiseRate(rate));
        }
        Ok(Self {
            rate,
            single_qubit: NoiseChannel::Depolarizing { p: rate },
            two_qubit: TwoQubitDepolarizing { p: rate },
        })
    }

    /// Noise-free model.
    pub fn ideal() -> Self {
        Self {
            rate: 0.0,
            single_qubit: NoiseChannel::Depolarizing { p: 0.0 },
            two_qubit: TwoQubitDepolarizing { p: 0.0 },
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_ideal(&self) -> bool {
        self.rate == 0.0
    }
}
