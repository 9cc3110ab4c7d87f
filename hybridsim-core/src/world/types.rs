//! Type definitions for the world module.

use crate::errors::{SimError, SimResult};
use crate::model::{Model, ModelKind};
use crate::state::PortValue;
use crate::Time;
use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type alias for the model graph.
///
/// Nodes own the models, edges point from a source model to the model reading from it.
pub type ModelGraph = Graph<ModelNode, Connection>;

/// Handle to a model registered in a [`World`](super::World)
///
/// Handles are only meaningful for the world that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub(crate) NodeIndex);

impl ModelId {
    /// Position of the model in registration order
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

/// A parsed `"model.attribute"` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub model: String,
    pub attribute: String,
}

impl FromStr for Reference {
    type Err = SimError;

    fn from_str(reference: &str) -> SimResult<Self> {
        let parts: Vec<&str> = reference.split('.').collect();
        match parts.as_slice() {
            [model, attribute] if !model.is_empty() && !attribute.is_empty() => Ok(Self {
                model: model.to_string(),
                attribute: attribute.to_string(),
            }),
            _ => Err(SimError::MalformedReference(reference.to_string())),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.model, self.attribute)
    }
}

/// Apply an optional index to a published value
///
/// Indexing a scalar, or a vector past its end, is reported as [`SimError::InvalidIndex`].
pub(crate) fn select_index(
    reference: &Reference,
    value: &PortValue,
    index: Option<usize>,
) -> SimResult<PortValue> {
    value.select(index).ok_or_else(|| {
        let reason = match value {
            PortValue::Scalar(_) => "the value is a scalar".to_string(),
            PortValue::Vector(values) => format!("out of range for length {}", values.len()),
        };
        SimError::InvalidIndex {
            reference: reference.to_string(),
            index: index.unwrap_or_default(),
            reason,
        }
    })
}

/// Where an input of a model reads its value from
///
/// The source is resolved to a handle once when the input is bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub source: ModelId,
    pub reference: Reference,
    pub index: Option<usize>,
}

/// Edge weight of the model graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Local input name on the reading model
    pub input: String,
    /// Attribute read from the source model
    pub attribute: String,
    pub index: Option<usize>,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}] -> {}", self.attribute, index, self.input),
            None => write!(f, "{} -> {}", self.attribute, self.input),
        }
    }
}

/// A model registered in a world along with its scheduling state
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelNode {
    pub(crate) name: String,
    /// Time of the last update
    pub(crate) t: Time,
    /// Update period
    pub(crate) dt: Time,
    /// Bound inputs in the order they were bound
    pub(crate) inputs: IndexMap<String, Binding>,
    pub(crate) model: Box<dyn Model>,
}

impl ModelNode {
    pub(crate) fn new(name: &str, dt: Time, model: Box<dyn Model>) -> Self {
        Self {
            name: name.to_string(),
            t: 0.0,
            dt,
            inputs: IndexMap::new(),
            model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn t(&self) -> Time {
        self.t
    }

    pub fn dt(&self) -> Time {
        self.dt
    }

    /// The next deadline of the model
    pub fn t_next(&self) -> Time {
        self.t + self.dt
    }

    /// Whether at least one period has elapsed since the last update at time `t`
    ///
    /// Compared against the deadline itself rather than `t - self.t >= dt` so that the deadline
    /// a cycle was proposed from always qualifies.
    pub fn ready_at(&self, t: Time) -> bool {
        t >= self.t_next()
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn inputs(&self) -> &IndexMap<String, Binding> {
        &self.inputs
    }

    /// Current published value of an output
    pub fn output(&self, name: &str) -> Option<PortValue> {
        self.model.output(name)
    }
}

impl fmt::Display for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lifecycle of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Models and inputs may still be added
    Configuring,
    /// The graph is frozen and the clock is advancing
    Running,
    /// A model failed to advance. The world only supports reads from here on.
    Aborted,
}
