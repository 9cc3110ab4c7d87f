use crate::Time;
use thiserror::Error;

/// Error type for invalid operations.
///
/// Wiring errors are raised while the model graph is being declared and are not
/// recoverable mid-run. Scheduling and integration errors raised during
/// [`World::cycle`](crate::world::World::cycle) are fatal to the run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("A model named '{name}' is already registered")]
    DuplicateModel { name: String },
    #[error("Invalid model name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
    #[error("Model '{name}' has an invalid update period {dt}. Periods must be finite and strictly positive")]
    InvalidPeriod { name: String, dt: Time },
    #[error("Input '{input}' of model '{model}' is already bound")]
    DuplicateInput { model: String, input: String },
    #[error("Input '{input}' of model '{model}' was never bound")]
    UnknownInput { model: String, input: String },
    #[error("Model '{model}' does not accept an input named '{input}'")]
    UndeclaredInput { model: String, input: String },
    #[error("Declared input '{input}' of model '{model}' is not bound to any output")]
    UnboundInput { model: String, input: String },
    #[error("No model named '{name}' is registered")]
    UnknownModel { name: String },
    #[error("Model '{model}' does not publish an output named '{output}'")]
    UnknownOutput { model: String, output: String },
    #[error("Malformed reference '{0}'. Expected exactly one 'model.attribute' pair")]
    MalformedReference(String),
    #[error("Index {index} cannot be applied to '{reference}': {reason}")]
    InvalidIndex {
        reference: String,
        index: usize,
        reason: String,
    },
    #[error("Input '{input}' of model '{model}' has the wrong shape. Expected {expected}")]
    PortMismatch {
        model: String,
        input: String,
        expected: String,
    },
    #[error("No model has a pending deadline after t={t}; the clock cannot advance")]
    NoEligibleModel { t: Time },
    #[error("Integration of model '{model}' failed at t={t} with state {state:?}: {reason}")]
    IntegrationFailure {
        model: String,
        t: Time,
        state: Vec<f64>,
        reason: String,
    },
    #[error("The model graph cannot be changed once the run has started")]
    GraphFrozen,
    #[error("The run was aborted at t={t} after a model failed to advance")]
    RunAborted { t: Time },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid scenario configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
