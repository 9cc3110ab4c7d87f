//! PID controller
//!
//! A discrete controller driving a process towards a setpoint.

use hybridsim_core::errors::SimResult;
use hybridsim_core::model::{DiscreteModel, Model, ModelKind, TimeStep};
use hybridsim_core::state::{InputState, PortValue};
use hybridsim_core::{FloatValue, ModelIO};
use log::trace;
use serde::{Deserialize, Serialize};

/// Gains and setpoint of a PID controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidParameters {
    /// Proportional gain
    pub kp: FloatValue,
    /// Integral gain
    pub ki: FloatValue,
    /// Derivative gain
    pub kd: FloatValue,
    /// Value the process is driven towards
    pub setpoint: FloatValue,
}

impl Default for PidParameters {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 1.0,
            kd: 1.0,
            setpoint: 1.0,
        }
    }
}

/// Discrete PID controller
///
/// On every update the error $e = r - y$ between the setpoint $r$ and the process value $y$ is
/// computed and the control signal is
/// $$ u = k_p e + k_i E + k_d \dot{e} $$
///
/// Where:
/// - $E$ is the integral of the error, accumulated as $e \Delta t$ per update
/// - $\dot{e}$ is the backward difference $(e - e_{prev}) / \Delta t$
/// - $\Delta t$ is the controller's configured period
///
/// The first update only establishes the error. The control signal stays zero until the
/// second update, when a previous error exists to difference against.
#[derive(Debug, Clone, Serialize, Deserialize, ModelIO)]
pub struct PidController {
    #[serde(default)]
    parameters: PidParameters,

    /// Last process value read
    #[input]
    #[output]
    #[serde(default)]
    process: FloatValue,

    #[output]
    #[serde(default)]
    u: FloatValue,

    #[output]
    #[serde(default)]
    error: FloatValue,

    #[output]
    #[serde(default)]
    previous_error: FloatValue,

    #[output]
    #[serde(default)]
    integral: FloatValue,

    #[output]
    #[serde(default)]
    derivative: FloatValue,

    /// Whether a previous error is available
    #[serde(default)]
    valid: bool,
}

impl PidController {
    pub fn from_parameters(parameters: PidParameters) -> Self {
        Self {
            parameters,
            process: 0.0,
            u: 0.0,
            error: 0.0,
            previous_error: 0.0,
            integral: 0.0,
            derivative: 0.0,
            valid: false,
        }
    }

    pub fn parameters(&self) -> &PidParameters {
        &self.parameters
    }

    /// Control signal
    pub fn u(&self) -> FloatValue {
        self.u
    }

    pub fn error(&self) -> FloatValue {
        self.error
    }

    pub fn previous_error(&self) -> FloatValue {
        self.previous_error
    }

    pub fn integral(&self) -> FloatValue {
        self.integral
    }

    pub fn derivative(&self) -> FloatValue {
        self.derivative
    }

    /// Advance the controller state given a new process value
    ///
    /// This is the core control law, extracted for testability.
    pub fn calculate(&mut self, process: FloatValue, dt: FloatValue) {
        let p = &self.parameters;

        self.process = process;
        self.previous_error = self.error;
        self.error = p.setpoint - process;
        self.u = 0.0;

        if self.valid {
            self.integral += self.error * dt;
            self.derivative = (self.error - self.previous_error) / dt;
            self.u = p.kp * self.error + p.ki * self.integral + p.kd * self.derivative;
        } else {
            self.valid = true;
        }
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::from_parameters(PidParameters::default())
    }
}

impl DiscreteModel for PidController {
    fn update(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.generated_read_inputs(input_state)?;
        self.calculate(self.process, step.period);

        trace!(
            "{}: e={} E={} de={} u={}",
            step.model,
            self.error,
            self.integral,
            self.derivative,
            self.u
        );
        Ok(())
    }
}

#[typetag::serde]
impl Model for PidController {
    fn kind(&self) -> ModelKind {
        ModelKind::Discrete
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
        self.update(step, input_state)
    }
}
