//! Gradient-free simplex minimisation.
//!
//! Thin wrapper over argmin's Nelder-Mead solver. The cost function is
//! sampled from noisy shots, so no gradient is ever taken.

use std::cell::{Cell, RefCell};

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;

use crate::error::{Result, TrainerError};

/// Nelder-Mead settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Hard cap on simplex iterations.
    pub max_iterations: usize,
    /// Offset of the initial simplex vertices from the starting point.
    pub initial_step: f64,
    /// Stop once the standard deviation of simplex values falls below this.
    pub tolerance: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            initial_step: 0.01,
            tolerance: 1e-8,
        }
    }
}

/// Best point found by a minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Adapts an `FnMut` objective to argmin and counts its calls.
struct Objective<'a, F> {
    f: RefCell<F>,
    evaluations: &'a Cell<usize>,
}

impl<F: FnMut(&[f64]) -> f64> Objective<'_, F> {
    fn eval(&self, x: &[f64]) -> f64 {
        self.evaluations.set(self.evaluations.get() + 1);
        let v = (self.f.borrow_mut())(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    }
}

impl<F: FnMut(&[f64]) -> f64> CostFunction for Objective<'_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.eval(x))
    }
}

/// Start point plus one vertex per dimension offset by `step`.
fn initial_simplex(x0: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut x = x0.to_vec();
        x[i] += if x[i] != 0.0 {
            step * x[i].abs().max(1.0)
        } else {
            step
        };
        simplex.push(x);
    }
    simplex
}

/// Minimise `f` starting from `x0`.
///
/// An empty `x0` or a zero iteration budget evaluates `f` once at `x0` and
/// returns. NaN values are treated as +∞ so they are never selected as the
/// best vertex.
pub fn nelder_mead<F>(f: F, x0: &[f64], config: &NelderMeadConfig) -> Result<Minimum>
where
    F: FnMut(&[f64]) -> f64,
{
    let evaluations = Cell::new(0);
    let objective = Objective {
        f: RefCell::new(f),
        evaluations: &evaluations,
    };

    if x0.is_empty() || config.max_iterations == 0 {
        let value = objective.eval(x0);
        return Ok(Minimum {
            x: x0.to_vec(),
            value,
            iterations: 0,
            evaluations: 1,
        });
    }

    let solver = NelderMead::new(initial_simplex(x0, config.initial_step))
        .with_sd_tolerance(config.tolerance)
        .map_err(optimizer_error)?;
    let result = Executor::new(objective, solver)
        .configure(|state| state.max_iters(config.max_iterations as u64))
        .run()
        .map_err(optimizer_error)?;

    let state = result.state();
    let x = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| TrainerError::Optimizer("no best parameter recorded".into()))?;
    Ok(Minimum {
        x,
        value: state.get_best_cost(),
        iterations: state.get_iter() as usize,
        evaluations: evaluations.get(),
    })
}

fn optimizer_error(e: argmin::core::Error) -> TrainerError {
    TrainerError::Optimizer(e.to_string())
}
