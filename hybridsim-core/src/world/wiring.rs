//! Declaring models and the connections between them.
//!
//! Every operation here checks all of its preconditions before touching the graph, so a failed
//! call leaves the world exactly as it was.

use crate::errors::{SimError, SimResult};
use crate::model::Model;
use crate::Time;
use log::debug;

use super::runtime::World;
use super::types::{select_index, Binding, Connection, ModelId, ModelNode, Reference, RunStatus};
use super::validation::{verify_name, verify_period};

impl World {
    /// Register a model to be updated every `dt` time units
    ///
    /// The model starts at `t = 0`, so its first deadline is `dt`.
    pub fn add_model<M: Model>(&mut self, name: &str, dt: Time, model: M) -> SimResult<ModelId> {
        self.add_boxed_model(name, dt, Box::new(model))
    }

    /// Register an already boxed model
    pub fn add_boxed_model(
        &mut self,
        name: &str,
        dt: Time,
        model: Box<dyn Model>,
    ) -> SimResult<ModelId> {
        self.ensure_configuring()?;
        verify_name(&self.graph, name)?;
        verify_period(name, dt)?;

        debug!("registering {:?} model '{}' with dt={}", model.kind(), name, dt);
        let id = ModelId(self.graph.add_node(ModelNode::new(name, dt, model)));
        self.order.push(id);
        Ok(id)
    }

    /// Bind the local input `input` of a model to `source`
    ///
    /// `source` has the form `"model.attribute"` and the model it names must already be
    /// registered. An optional `index` selects one element of a vector valued attribute.
    ///
    /// The index is checked against the attribute's current value, unless that value is an
    /// empty vector. Every later read checks it again, and a read that fails during a cycle
    /// aborts the run.
    pub fn add_input(
        &mut self,
        id: ModelId,
        input: &str,
        source: &str,
        index: Option<usize>,
    ) -> SimResult<()> {
        self.ensure_configuring()?;

        let node = self.node_or_err(id)?;
        if node.inputs.contains_key(input) {
            return Err(SimError::DuplicateInput {
                model: node.name.clone(),
                input: input.to_string(),
            });
        }
        if !node.model.accepts_input(input) {
            return Err(SimError::UndeclaredInput {
                model: node.name.clone(),
                input: input.to_string(),
            });
        }

        let reference: Reference = source.parse()?;
        let source_id = self.id(&reference.model)?;
        let value = self.graph[source_id.0]
            .output(&reference.attribute)
            .ok_or_else(|| SimError::UnknownOutput {
                model: reference.model.clone(),
                output: reference.attribute.clone(),
            })?;
        // An empty vector has no shape yet. Its range is checked when the input is resolved.
        if !value.is_empty() {
            select_index(&reference, &value, index)?;
        }

        debug!(
            "binding '{}.{}' to '{}'{}",
            self.graph[id.0].name,
            input,
            reference,
            index.map(|i| format!("[{}]", i)).unwrap_or_default()
        );
        self.graph.add_edge(
            source_id.0,
            id.0,
            Connection {
                input: input.to_string(),
                attribute: reference.attribute.clone(),
                index,
            },
        );
        self.graph[id.0].inputs.insert(
            input.to_string(),
            Binding {
                source: source_id,
                reference,
                index,
            },
        );
        Ok(())
    }

    fn ensure_configuring(&self) -> SimResult<()> {
        match self.status {
            RunStatus::Configuring => Ok(()),
            _ => Err(SimError::GraphFrozen),
        }
    }
}
