//! A world is a set of coupled models sharing a global clock.
//!
//! The world owns every model in a graph arena. Bindings between models are edges in that graph
//! and are resolved to handles when they are declared, so a misspelled reference is reported
//! while the world is being wired rather than part way through a run.
//!
//! Time advances in cycles. Each cycle moves the clock to the earliest pending deadline and
//! advances every model that is due, in registration order. Models with different update
//! periods therefore interleave without any of them being advanced early.
//!
//! Once the first cycle has run the graph is frozen. Adding models or inputs after that point
//! fails with [`SimError::GraphFrozen`](crate::errors::SimError::GraphFrozen).

mod runtime;
mod types;
mod validation;
mod wiring;

#[cfg(test)]
mod tests;

// Public re-exports
pub use runtime::World;
pub use types::{Binding, Connection, ModelGraph, ModelId, ModelNode, Reference, RunStatus};
