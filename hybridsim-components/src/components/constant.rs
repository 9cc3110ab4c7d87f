use hybridsim_core::errors::SimResult;
use hybridsim_core::model::{DiscreteModel, Model, ModelKind, TimeStep};
use hybridsim_core::state::{InputState, PortValue};
use hybridsim_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Publishes a fixed value as `y`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: FloatValue,
}

impl Constant {
    pub fn new(value: FloatValue) -> Self {
        Self { value }
    }
}

impl DiscreteModel for Constant {
    fn update(&mut self, _step: &TimeStep, _input_state: &InputState) -> SimResult<()> {
        Ok(())
    }
}

#[typetag::serde]
impl Model for Constant {
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
            "y" => Some(PortValue::Scalar(self.value)),
            _ => None,
        }
    }

    fn advance(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.update(step, input_state)
    }
}
