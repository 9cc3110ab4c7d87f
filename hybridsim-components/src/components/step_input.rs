use hybridsim_core::errors::SimResult;
use hybridsim_core::model::{DiscreteModel, Model, ModelKind, TimeStep};
use hybridsim_core::state::{InputState, PortValue};
use hybridsim_core::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// A step change in a signal
///
/// Publishes `initial` as `y` until an update at or after `step_time`, then `final`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub initial: FloatValue,
    #[serde(rename = "final")]
    pub final_value: FloatValue,
    pub step_time: Time,
    /// Time of the last update
    #[serde(default)]
    t: Time,
}

impl StepInput {
    pub fn new(initial: FloatValue, final_value: FloatValue, step_time: Time) -> Self {
        Self {
            initial,
            final_value,
            step_time,
            t: 0.0,
        }
    }

    pub fn value_at(&self, t: Time) -> FloatValue {
        if t >= self.step_time {
            self.final_value
        } else {
            self.initial
        }
    }
}

impl DiscreteModel for StepInput {
    fn update(&mut self, step: &TimeStep, _input_state: &InputState) -> SimResult<()> {
        self.t = step.end;
        Ok(())
    }
}

#[typetag::serde]
impl Model for StepInput {
    fn kind(&self) -> ModelKind {
        ModelKind::Discrete
    }

    fn inputs(&self) -> Vec<&'static str> {
        vec![]
    }

    fn outputs(&self) -> Vec<&'static str> {
        vec!["y"]
    }

    fn output(&self, name: &str) -> Option<PortValue> {
        match name {
            "y" => Some(PortValue::Scalar(self.value_at(self.t))),
            _ => None,
        }
    }

    fn advance(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.update(step, input_state)
    }
}
