pub mod errors;
#[cfg(test)]
mod example_models;
pub mod ivp;
pub mod model;
pub mod noise;
pub mod recorder;
pub mod scenario;
pub mod state;
pub mod world;

/// Time in the units of the simulation, starting from zero
pub type Time = f64;
pub type FloatValue = f64;

// Re-export derive macro for convenience
pub use hybridsim_macros::ModelIO;
