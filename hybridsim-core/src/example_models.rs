use crate::errors::SimResult;
use crate::ivp::{SolverOptions, IVP};
use crate::model::{integrate, DiscreteModel, DynamicModel, Model, ModelKind, TimeStep};
use crate::state::{InputState, PortValue};
use crate::{FloatValue, Time};
use crate::ModelIO;
use nalgebra::Vector1;
use serde::{Deserialize, Serialize};

// ============================================================================
// Ramp - a discrete source with a scalar and a vector output
// ============================================================================

/// Publishes `y = slope * t` at each of its deadlines
#[derive(Debug, Clone, Serialize, Deserialize, ModelIO)]
#[serde(default)]
pub(crate) struct Ramp {
    pub slope: FloatValue,

    #[output]
    y: FloatValue,

    /// `[t, y]` of the last update
    #[output]
    sample: Vec<FloatValue>,
}

impl Ramp {
    pub fn new(slope: FloatValue) -> Self {
        Self {
            slope,
            y: 0.0,
            sample: vec![0.0, 0.0],
        }
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl DiscreteModel for Ramp {
    fn update(&mut self, step: &TimeStep, _input_state: &InputState) -> SimResult<()> {
        self.y = self.slope * step.end;
        self.sample = vec![step.end, self.y];
        Ok(())
    }
}

#[typetag::serde]
impl Model for Ramp {
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

// ============================================================================
// Probe - a discrete sink remembering when it ran and what it saw
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ModelIO)]
#[serde(default)]
pub(crate) struct Probe {
    #[input]
    signal: FloatValue,

    #[output]
    count: FloatValue,

    /// `(start, end, signal)` of every update
    pub updates: Vec<(Time, Time, FloatValue)>,
}

impl DiscreteModel for Probe {
    fn update(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.generated_read_inputs(input_state)?;
        self.count += 1.0;
        self.updates.push((step.start, step.end, self.signal));
        Ok(())
    }
}

#[typetag::serde]
impl Model for Probe {
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

// ============================================================================
// History - a discrete source whose vector output starts empty
// ============================================================================

/// Publishes the times of all of its updates so far
#[derive(Debug, Clone, Default, Serialize, Deserialize, ModelIO)]
#[serde(default)]
pub(crate) struct History {
    #[output]
    values: Vec<FloatValue>,
}

impl DiscreteModel for History {
    fn update(&mut self, step: &TimeStep, _input_state: &InputState) -> SimResult<()> {
        self.values.push(step.end);
        Ok(())
    }
}

#[typetag::serde]
impl Model for History {
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

// ============================================================================
// Integrator - a dynamic model with dy/dt = rate
// ============================================================================

/// Integrates its held `rate` input
#[derive(Debug, Clone, Serialize, Deserialize, ModelIO)]
pub(crate) struct Integrator {
    #[input]
    #[output]
    rate: FloatValue,

    #[output]
    y: FloatValue,

    pub solver: SolverOptions,
}

impl Integrator {
    pub fn new(y0: FloatValue) -> Self {
        Self {
            rate: 0.0,
            y: y0,
            solver: SolverOptions::default(),
        }
    }
}

impl IVP<Time, Vector1<FloatValue>> for Integrator {
    fn calculate_dy_dt(&self, _t: Time, _y: &Vector1<FloatValue>, dy_dt: &mut Vector1<FloatValue>) {
        dy_dt[0] = self.rate;
    }
}

impl DynamicModel<1> for Integrator {
    fn hold_inputs(&mut self, input_state: &InputState) -> SimResult<()> {
        self.generated_read_inputs(input_state)
    }

    fn state(&self) -> Vector1<FloatValue> {
        Vector1::new(self.y)
    }

    fn solver(&self) -> &SolverOptions {
        &self.solver
    }

    fn accept_state(&mut self, _step: &TimeStep, state: Vector1<FloatValue>) {
        self.y = state[0];
    }
}

#[typetag::serde]
impl Model for Integrator {
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

// ============================================================================
// Blowup - dy/dt = y^2, which diverges at t = 1 / y0
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ModelIO)]
pub(crate) struct Blowup {
    #[output]
    y: FloatValue,

    solver: SolverOptions,
}

impl Blowup {
    pub fn new(y0: FloatValue) -> Self {
        Self {
            y: y0,
            solver: SolverOptions::Rk4 { step_size: 0.01 },
        }
    }
}

impl IVP<Time, Vector1<FloatValue>> for Blowup {
    fn calculate_dy_dt(&self, _t: Time, y: &Vector1<FloatValue>, dy_dt: &mut Vector1<FloatValue>) {
        dy_dt[0] = y[0] * y[0];
    }
}

impl DynamicModel<1> for Blowup {
    fn hold_inputs(&mut self, _input_state: &InputState) -> SimResult<()> {
        Ok(())
    }

    fn state(&self) -> Vector1<FloatValue> {
        Vector1::new(self.y)
    }

    fn solver(&self) -> &SolverOptions {
        &self.solver
    }

    fn accept_state(&mut self, _step: &TimeStep, state: Vector1<FloatValue>) {
        self.y = state[0];
    }
}

#[typetag::serde]
impl Model for Blowup {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_port_tables() {
        assert_eq!(Integrator::generated_inputs(), vec!["rate"]);
        assert_eq!(Integrator::generated_outputs(), vec!["rate", "y"]);
        assert_eq!(Ramp::generated_inputs(), Vec::<&str>::new());
        assert_eq!(Ramp::generated_outputs(), vec!["y", "sample"]);
    }

    #[test]
    fn generated_output_clones_field() {
        let ramp = Ramp::new(2.0);
        assert_eq!(ramp.output("y"), Some(PortValue::Scalar(0.0)));
        assert_eq!(ramp.output("sample"), Some(PortValue::Vector(vec![0.0, 0.0])));
        assert_eq!(ramp.output("slope"), None);
    }

    #[test]
    fn generated_read_inputs() {
        let mut probe = Probe::default();
        let input_state = InputState::from_values("probe", 1.0, [("signal", PortValue::Scalar(4.0))]);
        probe
            .advance(&TimeStep::new("probe", 0.0, 1.0, 1.0), &input_state)
            .unwrap();
        assert_eq!(probe.updates, vec![(0.0, 1.0, 4.0)]);
        assert_eq!(probe.output("count"), Some(PortValue::Scalar(1.0)));
    }

    #[test]
    fn missing_input_is_an_error() {
        let mut probe = Probe::default();
        let result = probe.advance(
            &TimeStep::new("probe", 0.0, 1.0, 1.0),
            &InputState::empty("probe"),
        );
        assert!(result.is_err());
        assert!(probe.updates.is_empty());
    }

    #[test]
    fn integrator_holds_rate() {
        let mut integrator = Integrator::new(1.0);
        let input_state = InputState::from_values("i", 0.5, [("rate", PortValue::Scalar(2.0))]);
        integrator
            .advance(&TimeStep::new("i", 0.0, 0.5, 0.5), &input_state)
            .unwrap();
        assert!(is_close::is_close!(integrator.y, 2.0));
        assert_eq!(integrator.output("rate"), Some(PortValue::Scalar(2.0)));
    }
}
