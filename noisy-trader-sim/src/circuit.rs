//! Gate-level circuit description and the trading circuit ansatz.

use std::convert::TryFrom;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::noise::Matrix2x2;

/// Supported gates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Rotation about X by `theta` radians.
    Rx { qubit: usize, theta: f64 },
    /// Pauli X (NOT).
    X { qubit: usize },
    /// Controlled NOT.
    Cx { control: usize, target: usize },
}

impl Gate {
    /// Qubits the gate acts on.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::Rx { qubit, .. } | Gate::X { qubit } => vec![qubit],
            Gate::Cx { control, target } => vec![control, target],
        }
    }
}

/// RX(θ) = [[cos θ/2, -i sin θ/2], [-i sin θ/2, cos θ/2]].
pub fn rx_matrix(theta: f64) -> Matrix2x2 {
    let c = Complex::new((theta / 2.0).cos(), 0.0);
    let s = Complex::new(0.0, -(theta / 2.0).sin());
    [c, s, s, c]
}

/// Ordered gate sequence over `n_qubits`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    n_qubits: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(n_qubits: usize) -> Self {
        Self {
            n_qubits,
            gates: Vec::new(),
        }
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate after checking its qubit indices.
    pub fn push(&mut self, gate: Gate) -> Result<(), SimulationError> {
        for qubit in gate.qubits() {
            if qubit >= self.n_qubits {
                return Err(SimulationError::QubitOutOfRange {
                    qubit,
                    n_qubits: self.n_qubits,
                });
            }
        }
        if let Gate::Cx { control, target } = gate {
            if control == target {
                return Err(SimulationError::InvalidGate(format!(
                    "cx control and target are both qubit {}",
                    control
                )));
            }
        }
        if let Gate::Rx { theta, .. } = gate {
            if !theta.is_finite() {
                return Err(SimulationError::InvalidGate(format!(
                    "rx angle {} is not finite",
                    theta
                )));
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    pub fn rx(&mut self, qubit: usize, theta: f64) -> Result<&mut Self, SimulationError> {
        self.push(Gate::Rx { qubit, theta })?;
        Ok(self)
    }

    pub fn x(&mut self, qubit: usize) -> Result<&mut Self, SimulationError> {
        self.push(Gate::X { qubit })?;
        Ok(self)
    }

    pub fn cx(&mut self, control: usize, target: usize) -> Result<&mut Self, SimulationError> {
        self.push(Gate::Cx { control, target })?;
        Ok(self)
    }
}

/// Per-asset strategy signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Signal {
    /// `-1`: entangle with the next asset.
    Hedge,
    /// `1`: flip the asset qubit.
    Flip,
    /// `0`: rotation only.
    Hold,
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Signal::Hedge),
            1 => Ok(Signal::Flip),
            0 => Ok(Signal::Hold),
            other => Err(format!("strategy signal must be -1, 0 or 1, got {}", other)),
        }
    }
}

impl From<Signal> for i8 {
    fn from(s: Signal) -> i8 {
        match s {
            Signal::Hedge => -1,
            Signal::Flip => 1,
            Signal::Hold => 0,
        }
    }
}

/// Build the trading circuit.
///
/// Feature `i` is encoded as `RX(weights[i] · data[i])` on qubit `i`, followed
/// by `CX(i, i+1 mod n)` for [`Signal::Hedge`] or `X(i)` for [`Signal::Flip`].
/// Missing weights default to 1 and missing signals to [`Signal::Hold`].
pub fn trading_circuit(
    n_qubits: usize,
    data: &[f64],
    strategy: &[Signal],
    weights: &[f64],
) -> Result<Circuit, SimulationError> {
    let mut circuit = Circuit::new(n_qubits);
    for (i, &d) in data.iter().enumerate() {
        let w = weights.get(i).copied().unwrap_or(1.0);
        circuit.rx(i, w * d)?;
        match strategy.get(i).copied().unwrap_or(Signal::Hold) {
            Signal::Hedge => {
                circuit.cx(i, (i + 1) % n_qubits)?;
            }
            Signal::Flip => {
                circuit.x(i)?;
            }
            Signal::Hold => {}
        }
    }
    Ok(circuit)
}
