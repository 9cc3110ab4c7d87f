use hybridsim_core::errors::SimResult;
use hybridsim_core::model::{DiscreteModel, Model, ModelKind, TimeStep};
use hybridsim_core::noise::{GaussianSource, NoiseSource};
use hybridsim_core::state::{InputState, PortValue};
use hybridsim_core::{FloatValue, ModelIO};
use serde::{Deserialize, Serialize};

fn default_sigma() -> FloatValue {
    1.0
}

/// Additive Gaussian noise on a scalar process
///
/// Each update draws a fresh sample $n \sim N(\mu, \sigma^2)$ and publishes `y = process + n`.
/// Samples come from the model's own [`NoiseSource`], so two models seeded alike produce the
/// same noise regardless of what else is in the world.
#[derive(Debug, Serialize, Deserialize, ModelIO)]
pub struct GaussianNoise {
    #[serde(default)]
    pub mean: FloatValue,
    #[serde(default = "default_sigma")]
    pub sigma: FloatValue,

    source: Box<dyn NoiseSource>,

    #[input]
    #[output]
    #[serde(default)]
    process: FloatValue,

    /// Last sample drawn
    #[output]
    #[serde(default)]
    noise: FloatValue,

    #[output]
    #[serde(default)]
    y: FloatValue,
}

impl GaussianNoise {
    pub fn new(mean: FloatValue, sigma: FloatValue, source: Box<dyn NoiseSource>) -> Self {
        Self {
            mean,
            sigma,
            source,
            process: 0.0,
            noise: 0.0,
            y: 0.0,
        }
    }

    /// Zero mean noise from a seeded [`GaussianSource`]
    pub fn from_seed(sigma: FloatValue, seed: u64) -> Self {
        Self::new(0.0, sigma, Box::new(GaussianSource::from_seed(seed)))
    }

    pub fn y(&self) -> FloatValue {
        self.y
    }

    pub fn noise(&self) -> FloatValue {
        self.noise
    }
}

impl DiscreteModel for GaussianNoise {
    fn update(&mut self, _step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.generated_read_inputs(input_state)?;
        self.noise = self.source.sample(self.mean, self.sigma)?;
        self.y = self.process + self.noise;
        Ok(())
    }
}

#[typetag::serde]
impl Model for GaussianNoise {
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
