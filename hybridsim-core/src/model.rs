//! The contract every model registered in a [`World`](crate::world::World) fulfils.
//!
//! A model is the atomic unit of computation. It owns its local state, publishes a table of
//! named outputs and is advanced by the scheduler whenever its update deadline is reached.
//! Models come in two kinds:
//!
//! * discrete models ([`DiscreteModel`]) evaluate a single-shot recurrence once per deadline
//! * dynamic models ([`DynamicModel`]) integrate an ODE from their last update time to the
//!   deadline, holding their inputs constant over the interval
//!
//! The scheduler only ever talks to the object safe [`Model`] trait, so it never needs to know
//! which concrete type it is driving.

use crate::errors::{SimError, SimResult};
use crate::ivp::{self, SolverOptions, IVP};
use crate::state::{InputState, PortValue};
use crate::{FloatValue, Time};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;

/// How a model evolves between two deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Updated atomically once per deadline
    Discrete,
    /// Integrated continuously between deadlines
    Dynamic,
}

/// The interval a model is being advanced over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep<'a> {
    /// Name the model is registered under
    pub model: &'a str,
    /// Time of the model's previous update
    pub start: Time,
    /// Time the model is being advanced to
    pub end: Time,
    /// The model's configured update period
    pub period: Time,
}

impl<'a> TimeStep<'a> {
    pub fn new(model: &'a str, start: Time, end: Time, period: Time) -> Self {
        Self {
            model,
            start,
            end,
            period,
        }
    }
}

/// Access to the concrete type behind a `dyn Model`
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Model trait
///
/// Implemented by every model that can be registered with a world. The
/// [`ModelIO`](crate::ModelIO) derive generates the port table accessors that most
/// implementations delegate to.
#[typetag::serde(tag = "type")]
pub trait Model: AsAny + Debug + Send + Sync {
    /// Whether the model is discrete or dynamic
    fn kind(&self) -> ModelKind;

    /// Names of the inputs this model reads
    fn inputs(&self) -> Vec<&'static str>;

    /// Whether an input of the given name may be bound to this model
    ///
    /// Defaults to the declared inputs.
    fn accepts_input(&self, name: &str) -> bool {
        self.inputs().contains(&name)
    }

    /// Names of the outputs this model publishes
    fn outputs(&self) -> Vec<&'static str>;

    /// Current published value of an output
    ///
    /// Once an output holds a value its shape should stay fixed. Indexed bindings are checked
    /// against it when they are made.
    fn output(&self, name: &str) -> Option<PortValue>;

    /// Advance the model to `step.end`
    ///
    /// Discrete models perform their update, dynamic models integrate over the interval.
    /// The scheduler sets the model's time to `step.end` once this returns successfully.
    fn advance(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()>;
}

/// A model updated by a single-shot recurrence
pub trait DiscreteModel {
    /// Read the inputs, compute the new state and outputs in one atomic step
    fn update(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()>;
}

/// A model whose state evolves continuously between deadlines
///
/// `D` is the dimension of the state vector, fixed per model type.
pub trait DynamicModel<const D: usize>: IVP<Time, SVector<FloatValue, D>> {
    /// Refresh the held inputs from the resolved input state
    ///
    /// Called once at the start of each interval. The held values must not change again until
    /// the next interval.
    fn hold_inputs(&mut self, input_state: &InputState) -> SimResult<()>;

    /// The current state vector
    fn state(&self) -> SVector<FloatValue, D>;

    /// Solver configuration used for integration
    fn solver(&self) -> &SolverOptions;

    /// Store the integrated state and recompute the derived outputs
    fn accept_state(&mut self, step: &TimeStep, state: SVector<FloatValue, D>);
}

/// Advance a dynamic model over a time step
///
/// The held inputs are refreshed exactly once and then treated as constants while the state is
/// integrated from `step.start` to `step.end`.
pub fn integrate<M, const D: usize>(
    model: &mut M,
    step: &TimeStep,
    input_state: &InputState,
) -> SimResult<()>
where
    M: DynamicModel<D>,
{
    model.hold_inputs(input_state)?;

    let y0 = model.state();
    let y = ivp::solve(&*model, step.start, step.end, y0, model.solver()).map_err(|failure| {
        SimError::IntegrationFailure {
            model: step.model.to_string(),
            t: failure.t,
            state: failure.state,
            reason: failure.reason,
        }
    })?;

    model.accept_state(step, y);
    Ok(())
}
