//! Declaring a world in a TOML document.
//!
//! ```toml
//! duration = 10.0
//!
//! [[models]]
//! name = "plant"
//! dt = 0.01
//! model = { type = "MassSpringDamper", parameters = { mass = 1.0, stiffness = 1.0, damping = 0.2 } }
//!
//! [[models]]
//! name = "pid"
//! dt = 0.1
//! model = { type = "PidController", parameters = { kp = 2.0, ki = 0.5, kd = 0.1, setpoint = 1.0 } }
//!
//! [[connections]]
//! model = "plant"
//! input = "force"
//! source = "pid.u"
//!
//! [[connections]]
//! model = "pid"
//! input = "process"
//! source = "plant.x"
//! index = 0
//! ```
//!
//! Models are registered in the order they are listed, which is also the order they are
//! advanced in when several are due at the same deadline. Every model is registered before any
//! connection is made, so connections may be listed in any order.

use crate::errors::SimResult;
use crate::model::Model;
use crate::world::World;
use crate::Time;
use log::info;
use serde::{Deserialize, Serialize};

/// A model to register
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub name: String,
    /// Update period
    pub dt: Time,
    /// The model itself, selected by its `type` tag
    pub model: Box<dyn Model>,
}

/// An input binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Name of the model reading the value
    pub model: String,
    /// Local input name on the reading model
    pub input: String,
    /// `"model.attribute"` to read from
    pub source: String,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// How long [`Scenario::run`] advances the world for
    pub duration: Time,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

impl Scenario {
    pub fn from_toml_str(document: &str) -> SimResult<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Register every model and connection in a new world
    ///
    /// Reports the same errors as declaring the world directly.
    pub fn build(self) -> SimResult<World> {
        let mut world = World::new();

        for config in self.models {
            world.add_boxed_model(&config.name, config.dt, config.model)?;
        }
        for connection in &self.connections {
            let id = world.id(&connection.model)?;
            world.add_input(id, &connection.input, &connection.source, connection.index)?;
        }

        info!(
            "built world with {} models and {} connections",
            world.len(),
            self.connections.len()
        );
        Ok(world)
    }

    /// Build the world and advance it for the scenario's duration
    pub fn run(self) -> SimResult<World> {
        let duration = self.duration;
        let mut world = self.build()?;
        let cycles = world.run_for(duration)?;

        info!("ran {} cycles up to t={}", cycles, world.t());
        Ok(world)
    }
}
