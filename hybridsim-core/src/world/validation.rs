//! Validation functions for building the model graph.

use crate::errors::{SimError, SimResult};
use crate::Time;
use log::debug;
use petgraph::visit::EdgeRef;

use super::types::ModelGraph;

/// Checks that a name can be used to register a new model.
///
/// Names must be non-empty, must not contain the `.` used to separate references and must be
/// unique within the graph.
pub(crate) fn verify_name(graph: &ModelGraph, name: &str) -> SimResult<()> {
    if name.is_empty() {
        return Err(SimError::InvalidName {
            name: name.to_string(),
            reason: "names must not be empty".to_string(),
        });
    }
    if name.contains('.') {
        return Err(SimError::InvalidName {
            name: name.to_string(),
            reason: "names must not contain '.'".to_string(),
        });
    }
    if graph.node_weights().any(|node| node.name == name) {
        return Err(SimError::DuplicateModel {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Update periods must be finite and strictly positive.
pub(crate) fn verify_period(name: &str, dt: Time) -> SimResult<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidPeriod {
            name: name.to_string(),
            dt,
        })
    }
}

/// Checks that every input a model declares has been bound.
///
/// Models may accept additional inputs beyond those they declare. Those are optional and are
/// not checked.
pub(crate) fn verify_bindings(graph: &ModelGraph) -> SimResult<()> {
    for node in graph.node_weights() {
        if let Some(input) = node
            .model
            .inputs()
            .into_iter()
            .find(|input| !node.inputs.contains_key(*input))
        {
            return Err(SimError::UnboundInput {
                model: node.name.clone(),
                input: input.to_string(),
            });
        }
    }
    Ok(())
}

/// Log any connections that read from a model advanced later in the same cycle.
///
/// These are legal. The reader sees the value published by the source's previous update when
/// both are due at the same deadline.
pub(crate) fn log_backward_connections(graph: &ModelGraph) {
    for edge in graph.edge_references() {
        if edge.source().index() > edge.target().index() {
            debug!(
                "'{}' reads '{}.{}' which is registered after it",
                graph[edge.target()].name,
                graph[edge.source()].name,
                edge.weight().attribute
            );
        }
    }
}
