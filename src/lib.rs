//! Deterministic simulation of coupled discrete and continuous models.
//!
//! Models are registered in a [`World`] with their own update periods and bound to each
//! other's outputs. The world advances a shared clock from deadline to deadline, so a fast
//! plant and a slow controller interleave exactly as they would on their own clocks.
//!
//! ```no_run
//! use hybridsim::components::{MassSpringDamper, PidController, PidParameters};
//! use hybridsim::{SimResult, World};
//!
//! fn main() -> SimResult<()> {
//!     let mut world = World::new();
//!     let plant = world.add_model("plant", 0.01, MassSpringDamper::default())?;
//!     let pid = world.add_model(
//!         "pid",
//!         0.1,
//!         PidController::from_parameters(PidParameters::default()),
//!     )?;
//!     world.add_input(plant, "force", "pid.u", None)?;
//!     world.add_input(pid, "process", "plant.x", Some(0))?;
//!
//!     world.run_until(10.0)?;
//!     println!("{:?}", world.read("plant.x", Some(0))?);
//!     Ok(())
//! }
//! ```

pub use hybridsim_components::components;
pub use hybridsim_core::errors::{SimError, SimResult};
pub use hybridsim_core::recorder::{Recorder, Trace};
pub use hybridsim_core::scenario::Scenario;
pub use hybridsim_core::state::PortValue;
pub use hybridsim_core::world::{ModelId, RunStatus, World};
pub use hybridsim_core::{FloatValue, Time};

pub mod engine {
    //! The engine: model contract, integration and noise capabilities
    pub use hybridsim_core::{ivp, model, noise, state};
}
