//! Mass-spring-damper component
//!
//! A linear second order plant driven by an external force. The model knows nothing about its
//! surroundings, so nothing stops the mass passing through its rest position or any wall.
//! No units are assumed.

use hybridsim_core::errors::{SimError, SimResult};
use hybridsim_core::ivp::{SolverOptions, IVP};
use hybridsim_core::model::{integrate, DynamicModel, Model, ModelKind, TimeStep};
use hybridsim_core::state::{InputState, PortValue};
use hybridsim_core::{FloatValue, ModelIO, Time};
use log::trace;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

type ModelState = Vector2<FloatValue>;

fn zero_state() -> ModelState {
    ModelState::zeros()
}

/// Parameters for the mass-spring-damper component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassSpringDamperParameters {
    /// Mass of the body, must be positive
    pub mass: FloatValue,
    /// Spring constant
    pub stiffness: FloatValue,
    /// Damping coefficient
    pub damping: FloatValue,
}

impl Default for MassSpringDamperParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 1.0,
            damping: 1.0,
        }
    }
}

/// Mass-spring-damper
///
/// The state $x = [position, velocity]$ evolves in state space form:
/// $$ \dot{x} = A x + B u $$
///
/// Where:
/// - $A = \begin{bmatrix} 0 & 1 \\ -k/m & -b/m \end{bmatrix}$
/// - $B = \begin{bmatrix} 0 \\ 1/m \end{bmatrix}$
/// - $u$ is the applied force, held constant over each integration interval
///
/// The output is the full state, $y = x$.
#[derive(Debug, Clone, Serialize, Deserialize, ModelIO)]
pub struct MassSpringDamper {
    #[serde(default)]
    parameters: MassSpringDamperParameters,

    #[serde(default)]
    solver: SolverOptions,

    /// Held force
    #[input(name = "force")]
    #[output(name = "u")]
    #[serde(default)]
    u: FloatValue,

    #[output]
    #[serde(default = "zero_state")]
    x: ModelState,

    #[output]
    #[serde(default = "zero_state")]
    y: ModelState,

    /// State before the last integration
    #[serde(default = "zero_state")]
    xp: ModelState,

    /// Time of the state before the last integration
    #[serde(default)]
    tp: Time,
}

impl MassSpringDamper {
    pub fn from_parameters(parameters: MassSpringDamperParameters) -> Self {
        Self {
            parameters,
            solver: SolverOptions::default(),
            u: 0.0,
            x: zero_state(),
            y: zero_state(),
            xp: zero_state(),
            tp: 0.0,
        }
    }

    /// Start from a given position and velocity
    pub fn with_initial_state(self, position: FloatValue, velocity: FloatValue) -> Self {
        let x = ModelState::new(position, velocity);
        Self {
            x,
            y: x,
            xp: x,
            ..self
        }
    }

    pub fn with_solver_options(self, solver: SolverOptions) -> Self {
        Self { solver, ..self }
    }

    pub fn parameters(&self) -> &MassSpringDamperParameters {
        &self.parameters
    }

    pub fn position(&self) -> FloatValue {
        self.x[0]
    }

    pub fn velocity(&self) -> FloatValue {
        self.x[1]
    }

    /// State and time before the last integration
    pub fn previous(&self) -> (ModelState, Time) {
        (self.xp, self.tp)
    }

    pub fn force(&self) -> FloatValue {
        self.u
    }
}

impl Default for MassSpringDamper {
    fn default() -> Self {
        Self::from_parameters(MassSpringDamperParameters::default())
    }
}

impl IVP<Time, ModelState> for MassSpringDamper {
    fn calculate_dy_dt(&self, _t: Time, y: &ModelState, dy_dt: &mut ModelState) {
        let MassSpringDamperParameters {
            mass,
            stiffness,
            damping,
        } = self.parameters;

        let a = Matrix2::new(0.0, 1.0, -stiffness / mass, -damping / mass);
        let b = ModelState::new(0.0, 1.0 / mass);

        *dy_dt = a * y + b * self.u;
    }
}

impl DynamicModel<2> for MassSpringDamper {
    fn hold_inputs(&mut self, input_state: &InputState) -> SimResult<()> {
        // Checked here so that a deserialised model is validated as well
        if !(self.parameters.mass > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "mass must be positive, got {}",
                self.parameters.mass
            )));
        }
        self.generated_read_inputs(input_state)
    }

    fn state(&self) -> ModelState {
        self.x
    }

    fn solver(&self) -> &SolverOptions {
        &self.solver
    }

    fn accept_state(&mut self, step: &TimeStep, state: ModelState) {
        self.xp = self.x;
        self.tp = step.start;
        self.x = state;
        self.y = self.x;

        trace!(
            "{}: u={} x=[{}, {}] at t={}",
            step.model,
            self.u,
            self.x[0],
            self.x[1],
            step.end
        );
    }
}

#[typetag::serde]
impl Model for MassSpringDamper {
    fn kind(&self) -> ModelKind {
        ModelKind::Dynamic
    }

    fn inputs(&self) -> Vec<&'static str> {
        Self::generated_inputs()
    }

    fn outputs(&self) -> Vec<&'static str> {
        Self::generated_outputs()
    }

    fn output(&self, name: &str) -> Option<PortValue> {
        self.generated_output(name)
    }

    fn advance(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        integrate(self, step, input_state)
    }
}
