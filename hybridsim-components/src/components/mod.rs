mod constant;
mod gaussian_noise;
mod mass_spring_damper;
mod pid_controller;
mod step_input;

pub use constant::Constant;
pub use gaussian_noise::GaussianNoise;
pub use mass_spring_damper::{MassSpringDamper, MassSpringDamperParameters};
pub use pid_controller::{PidController, PidParameters};
pub use step_input::StepInput;
