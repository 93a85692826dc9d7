//! Circuit execution against the state-vector simulator.
//!
//! Every shot builds the circuit from scratch:
//! 1. Allocate `n` qubits in |0⟩
//! 2. Apply each gate, followed by a Pauli error drawn from the noise model
//! 3. Measure every qubit and pack the bits into one basis-state value
//!
//! Rebuilding per shot lets each shot follow its own noise trajectory.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use ::rand::rngs::StdRng;
use ::rand::SeedableRng;

use qip::builder::{LocalBuilder, Qudit};
use qip::prelude::*;

use crate::circuit::{rx_matrix, Circuit, Gate};
use crate::error::SimulationError;
use crate::noise::{NoiseModel, Pauli};

/// Histogram of measured basis states. Bit `i` of a key is qubit `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts(BTreeMap<u64, usize>);

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: u64) {
        *self.0.entry(value).or_insert(0) += 1;
    }

    pub fn get(&self, value: u64) -> usize {
        self.0.get(&value).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Shot-weighted mean of the measured integers, `None` for no shots.
    pub fn mean_value(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let sum: f64 = self
            .0
            .iter()
            .map(|(&value, &count)| value as f64 * count as f64)
            .sum();
        Some(sum / total as f64)
    }

    pub fn probability(&self, value: u64) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(value) as f64 / total as f64,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<u64> for Counts {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for value in iter {
            counts.record(value);
        }
        counts
    }
}

/// Something that runs a circuit under a noise model and returns counts.
pub trait CircuitBackend {
    fn execute(
        &mut self,
        circuit: &Circuit,
        noise: &NoiseModel,
        shots: usize,
    ) -> Result<Counts, SimulationError>;
}

impl<B: CircuitBackend + ?Sized> CircuitBackend for Box<B> {
    fn execute(
        &mut self,
        circuit: &Circuit,
        noise: &NoiseModel,
        shots: usize,
    ) -> Result<Counts, SimulationError> {
        (**self).execute(circuit, noise, shots)
    }
}

/// Monte Carlo trajectory backend built on `qip`.
///
/// The seed fixes the sampled noise trajectories. Measurement outcomes are
/// drawn by the simulator itself.
#[derive(Debug)]
pub struct StateVectorBackend {
    rng: StdRng,
}

impl StateVectorBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    fn run_shot(&mut self, circuit: &Circuit, noise: &NoiseModel) -> Result<u64, SimulationError> {
        let n = circuit.n_qubits();
        let n_nz = NonZeroUsize::new(n).ok_or_else(|| {
            SimulationError::InvalidGate("circuit has no qubits".to_string())
        })?;

        let mut b = LocalBuilder::<f64>::default();
        let reg = b.register(n_nz);
        let mut qubits: Vec<Option<Qudit>> =
            b.split_all_register(reg).into_iter().map(Some).collect();

        for gate in circuit.gates() {
            match *gate {
                Gate::Rx { qubit, theta } => {
                    let q = take(&mut qubits, qubit)?;
                    let q = b.apply_matrix(q, rx_matrix(theta)).map_err(circuit_error)?;
                    let q = self.single_qubit_error(&mut b, q, noise)?;
                    qubits[qubit] = Some(q);
                }
                Gate::X { qubit } => {
                    let q = take(&mut qubits, qubit)?;
                    let q = b.apply_matrix(q, Pauli::X.matrix()).map_err(circuit_error)?;
                    let q = self.single_qubit_error(&mut b, q, noise)?;
                    qubits[qubit] = Some(q);
                }
                Gate::Cx { control, target } => {
                    let c = take(&mut qubits, control)?;
                    let t = take(&mut qubits, target)?;
                    let (c, t) = b.cnot(c, t).map_err(circuit_error)?;
                    let (pc, pt) = noise.two_qubit.sample(&mut self.rng);
                    qubits[control] = Some(apply_pauli(&mut b, c, pc)?);
                    qubits[target] = Some(apply_pauli(&mut b, t, pt)?);
                }
            }
        }

        let mut handles = Vec::with_capacity(n);
        for (i, q) in qubits.into_iter().enumerate() {
            let q = q.ok_or(SimulationError::QubitOutOfRange { qubit: i, n_qubits: n })?;
            let (_, handle) = b.measure(q);
            handles.push(handle);
        }

        let (_, measured) = b.calculate_state();
        let value = handles
            .into_iter()
            .enumerate()
            .filter(|(_, handle)| measured.get_measurement(*handle).0 == 1)
            .fold(0u64, |acc, (i, _)| acc | (1 << i));
        Ok(value)
    }

    fn single_qubit_error(
        &mut self,
        b: &mut LocalBuilder<f64>,
        q: Qudit,
        noise: &NoiseModel,
    ) -> Result<Qudit, SimulationError> {
        let pauli = noise.single_qubit.sample_pauli(&mut self.rng);
        apply_pauli(b, q, pauli)
    }
}

impl CircuitBackend for StateVectorBackend {
    fn execute(
        &mut self,
        circuit: &Circuit,
        noise: &NoiseModel,
        shots: usize,
    ) -> Result<Counts, SimulationError> {
        if shots == 0 {
            return Err(SimulationError::NoShots);
        }
        if circuit.n_qubits() > 63 {
            return Err(SimulationError::InvalidGate(format!(
                "{} qubits do not fit a 64-bit measurement value",
                circuit.n_qubits()
            )));
        }

        let mut counts = Counts::new();
        for _ in 0..shots {
            counts.record(self.run_shot(circuit, noise)?);
        }
        log::trace!(
            "executed {} gates x {} shots at noise rate {}",
            circuit.len(),
            shots,
            noise.rate()
        );
        Ok(counts)
    }
}

fn take(qubits: &mut [Option<Qudit>], index: usize) -> Result<Qudit, SimulationError> {
    let n_qubits = qubits.len();
    qubits
        .get_mut(index)
        .and_then(Option::take)
        .ok_or(SimulationError::QubitOutOfRange {
            qubit: index,
            n_qubits,
        })
}

fn apply_pauli(
    b: &mut LocalBuilder<f64>,
    q: Qudit,
    pauli: Pauli,
) -> Result<Qudit, SimulationError> {
    if pauli == Pauli::I {
        return Ok(q);
    }
    b.apply_matrix(q, pauli.matrix()).map_err(circuit_error)
}

fn circuit_error<E: std::fmt::Debug>(e: E) -> SimulationError {
    SimulationError::Circuit(format!("{:?}", e))
}
