//! Initial value problems.
//!
//! The integration capability used by dynamic models. Given a derivative function, an interval
//! and an initial state it returns the state at the end of the interval, or a [`SolveError`]
//! describing where the solver gave up. Step size control and accuracy are the business of the
//! underlying `ode_solvers` method; no retries are attempted here.

use crate::Time;
use is_close::is_close;
use nalgebra::SVector;
use ode_solvers::dop_shared::{OutputType, SolverResult, System};
use ode_solvers::dopri5::Dopri5;
use ode_solvers::rk4::Rk4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A system of first order ODEs
///
/// Any inputs the derivative depends on must already be held by the implementor. They are
/// treated as constants for the whole interval.
pub trait IVP<T, S> {
    fn calculate_dy_dt(&self, t: T, y: &S, dy_dt: &mut S);
}

/// Integration method used by a dynamic model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum SolverOptions {
    /// Classic fixed step Runge-Kutta
    ///
    /// The step is shrunk so that it divides the interval evenly.
    Rk4 { step_size: Time },
    /// Adaptive Dormand-Prince 5(4)
    Dopri5 { rtol: f64, atol: f64 },
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions::Rk4 { step_size: 1e-3 }
    }
}

/// Upper bound on the number of fixed steps taken over a single interval
const MAX_RK4_STEPS: f64 = 1e7;

impl SolverOptions {
    /// Check the options can drive a solver over an interval of length `span`
    pub fn validate(&self, span: Time) -> Result<(), String> {
        match *self {
            SolverOptions::Rk4 { step_size } => {
                if !(step_size.is_finite() && step_size > 0.0) {
                    return Err(format!(
                        "RK4 step size must be finite and positive, got {}",
                        step_size
                    ));
                }
                if span / step_size > MAX_RK4_STEPS {
                    return Err(format!(
                        "RK4 step size {} needs more than {} steps to span {}",
                        step_size, MAX_RK4_STEPS, span
                    ));
                }
            }
            SolverOptions::Dopri5 { rtol, atol } => {
                if !(rtol.is_finite() && rtol > 0.0 && atol.is_finite() && atol > 0.0) {
                    return Err(format!(
                        "Dopri5 tolerances must be finite and positive, got rtol={} atol={}",
                        rtol, atol
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Failure reported by the integration capability
#[derive(Error, Debug, Clone, PartialEq)]
#[error("integration failed at t={t}: {reason}")]
pub struct SolveError {
    /// Time the failure was detected at
    pub t: Time,
    /// State at the time of the failure
    pub state: Vec<f64>,
    pub reason: String,
}

/// Adapts an [`IVP`] implementor to the `ode_solvers` system interface
pub struct IVPBuilder<'a, C, const D: usize> {
    component: &'a C,
    y0: SVector<f64, D>,
}

impl<'a, C, const D: usize> System<Time, SVector<f64, D>> for IVPBuilder<'a, C, D>
where
    C: IVP<Time, SVector<f64, D>>,
{
    fn system(&self, t: Time, y: &SVector<f64, D>, dy: &mut SVector<f64, D>) {
        self.component.calculate_dy_dt(t, y, dy)
    }
}

impl<'a, C, const D: usize> IVPBuilder<'a, C, D>
where
    C: IVP<Time, SVector<f64, D>>,
{
    pub fn new(component: &'a C, y0: SVector<f64, D>) -> Self {
        Self { component, y0 }
    }

    /// Create a fixed step RK4 solver over `[t0, t1]`
    ///
    /// `max_step` is reduced so that a whole number of steps spans the interval.
    pub fn to_rk4(self, t0: Time, t1: Time, max_step: Time) -> Rk4<Time, SVector<f64, D>, Self> {
        let n_steps = ((t1 - t0) / max_step).ceil().max(1.0);
        let step = (t1 - t0) / n_steps;
        let y0 = self.y0;

        Rk4::new(self, t0, y0, t1, step)
    }

    /// Create an adaptive Dopri5 solver over `[t0, t1]`
    pub fn to_dopri5(
        self,
        t0: Time,
        t1: Time,
        rtol: f64,
        atol: f64,
    ) -> Dopri5<Time, SVector<f64, D>, Self> {
        let y0 = self.y0;

        // Sparse output records every accepted step, including the one landing on `t1`.
        // The remaining parameters are the `Dopri5::new` defaults.
        Dopri5::from_param(
            self,
            t0,
            t1,
            t1 - t0,
            y0,
            rtol,
            atol,
            0.9,
            0.04,
            0.2,
            10.0,
            t1 - t0,
            0.0,
            100_000,
            1000,
            OutputType::Sparse,
        )
    }
}

/// Extract the state at `t_expected` from a solver's results
///
/// Fixed step solvers may take one step past the end of the interval. The entry nearest to
/// `t_expected` is used, and it must be close to it.
pub fn get_last_step<const D: usize>(
    results: &SolverResult<Time, SVector<f64, D>>,
    t_expected: Time,
) -> Result<SVector<f64, D>, SolveError> {
    let (t, y) = results.get();

    t.iter()
        .zip(y.iter())
        .min_by(|(a, _), (b, _)| (**a - t_expected).abs().total_cmp(&(**b - t_expected).abs()))
        .filter(|(t, _)| is_close!(**t, t_expected))
        .map(|(_, y)| *y)
        .ok_or_else(|| SolveError {
            t: t.last().copied().unwrap_or(Time::NAN),
            state: y.last().map(to_vec).unwrap_or_default(),
            reason: format!("solver did not reach t={}", t_expected),
        })
}

fn to_vec<const D: usize>(y: &SVector<f64, D>) -> Vec<f64> {
    y.iter().copied().collect()
}

/// Integrate `component` from `t_start` to `t_end` starting at `y0`
///
/// An empty interval returns `y0` unchanged. A final state containing non-finite values is
/// reported as a failure.
pub fn solve<C, const D: usize>(
    component: &C,
    t_start: Time,
    t_end: Time,
    y0: SVector<f64, D>,
    options: &SolverOptions,
) -> Result<SVector<f64, D>, SolveError>
where
    C: IVP<Time, SVector<f64, D>>,
{
    if t_end <= t_start {
        return Ok(y0);
    }
    options
        .validate(t_end - t_start)
        .map_err(|reason| SolveError {
            t: t_start,
            state: to_vec(&y0),
            reason,
        })?;

    let builder = IVPBuilder::new(component, y0);
    let y = match *options {
        SolverOptions::Rk4 { step_size } => {
            let mut solver = builder.to_rk4(t_start, t_end, step_size);
            solver.integrate().map_err(|err| SolveError {
                t: t_start,
                state: to_vec(&y0),
                reason: format!("{:?}", err),
            })?;
            get_last_step(solver.results(), t_end)?
        }
        SolverOptions::Dopri5 { rtol, atol } => {
            let mut solver = builder.to_dopri5(t_start, t_end, rtol, atol);
            solver.integrate().map_err(|err| SolveError {
                t: t_start,
                state: to_vec(&y0),
                reason: format!("{:?}", err),
            })?;
            get_last_step(solver.results(), t_end)?
        }
    };

    if y.iter().any(|v| !v.is_finite()) {
        return Err(SolveError {
            t: t_end,
            state: to_vec(&y),
            reason: "state is not finite".to_string(),
        });
    }

    Ok(y)
}
