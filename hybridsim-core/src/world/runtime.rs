//! World struct and runtime execution.

use crate::errors::{SimError, SimResult};
use crate::model::{Model, TimeStep};
use crate::state::{InputState, PortValue};
use crate::Time;
use indexmap::IndexMap;
use log::{debug, error, trace};
use petgraph::dot::{Config, Dot};
use serde::{Deserialize, Serialize};

use super::types::{select_index, Binding, ModelGraph, ModelId, ModelNode, Reference, RunStatus};
use super::validation::{log_backward_connections, verify_bindings};

/// A set of coupled models advanced on a shared clock.
///
/// Each model is updated with its own period. On every cycle the world proposes the earliest
/// pending deadline as the new time, then advances every model whose deadline has been reached
/// in the order they were registered. A model advanced later in a cycle sees the outputs
/// published by models advanced earlier in the same cycle.
///
/// Models read from each other through bindings declared with
/// [`add_input`](World::add_input). For example a controller may bind its `process` input to
/// `"plant.x"` with index 0 to read the position of a plant. Bindings are resolved into an
/// [`InputState`] snapshot immediately before a model is advanced.
///
/// A world is serialisable. Restoring a serialised world and continuing to cycle produces the
/// same results as a world that was never interrupted.
#[derive(Debug, Serialize, Deserialize)]
pub struct World {
    /// Models as nodes and bindings as edges from the source to the reading model.
    pub(super) graph: ModelGraph,
    /// Registration order. Models due at the same deadline are advanced in this order.
    pub(super) order: Vec<ModelId>,
    /// The global clock
    pub(super) t: Time,
    pub(super) status: RunStatus,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            graph: ModelGraph::new(),
            order: Vec::new(),
            t: 0.0,
            status: RunStatus::Configuring,
        }
    }

    /// Current time of the global clock
    pub fn t(&self) -> Time {
        self.t
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Models in registration order
    pub fn order(&self) -> &[ModelId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up the handle of a model by name
    pub fn id(&self, name: &str) -> SimResult<ModelId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.graph[id.0].name == name)
            .ok_or_else(|| SimError::UnknownModel {
                name: name.to_string(),
            })
    }

    pub fn node(&self, id: ModelId) -> Option<&ModelNode> {
        self.graph.node_weight(id.0)
    }

    pub(super) fn node_or_err(&self, id: ModelId) -> SimResult<&ModelNode> {
        self.node(id).ok_or_else(|| SimError::UnknownModel {
            name: format!("#{}", id.index()),
        })
    }

    /// Get a registered model as its concrete type
    ///
    /// Returns `None` if the handle is unknown or the model is of a different type.
    pub fn model<M: Model>(&self, id: ModelId) -> Option<&M> {
        self.node(id)
            .and_then(|node| node.model().as_any().downcast_ref::<M>())
    }

    /// Current value of the source bound to a model's input, with the index applied
    ///
    /// This has no side effects on the models.
    pub fn get_input(&self, id: ModelId, input: &str) -> SimResult<PortValue> {
        let node = self.node_or_err(id)?;
        let binding = node
            .inputs
            .get(input)
            .ok_or_else(|| SimError::UnknownInput {
                model: node.name.clone(),
                input: input.to_string(),
            })?;
        self.resolve(binding)
    }

    /// Read the current value of `"model.attribute"`
    ///
    /// Used by collaborators observing a world from outside the model graph.
    pub fn read(&self, reference: &str, index: Option<usize>) -> SimResult<PortValue> {
        let reference: Reference = reference.parse()?;
        let id = self.id(&reference.model)?;
        let value = self.output(id, &reference.attribute)?;
        select_index(&reference, &value, index)
    }

    fn output(&self, id: ModelId, attribute: &str) -> SimResult<PortValue> {
        let node = self.node_or_err(id)?;
        node.output(attribute)
            .ok_or_else(|| SimError::UnknownOutput {
                model: node.name.clone(),
                output: attribute.to_string(),
            })
    }

    fn resolve(&self, binding: &Binding) -> SimResult<PortValue> {
        let value = self.output(binding.source, &binding.reference.attribute)?;
        select_index(&binding.reference, &value, binding.index)
    }

    /// Snapshot every bound input of a model
    fn resolve_inputs(&self, id: ModelId, t: Time) -> SimResult<InputState> {
        let node = self.node_or_err(id)?;
        let values = node
            .inputs
            .iter()
            .map(|(input, binding)| Ok((input.clone(), self.resolve(binding)?)))
            .collect::<SimResult<IndexMap<String, PortValue>>>()?;

        Ok(InputState::build(&node.name, t, values))
    }

    /// The earliest deadline that lies strictly after the current time
    pub fn next_deadline(&self) -> SimResult<Time> {
        self.graph
            .node_weights()
            .map(|node| {
                let t_next = node.t_next();
                trace!("'{}' candidate deadline {}", node.name, t_next);
                t_next
            })
            .filter(|t_next| t_next - self.t > 0.0)
            .min_by(|a, b| a.total_cmp(b))
            .ok_or(SimError::NoEligibleModel { t: self.t })
    }

    /// Freeze the graph before the first cycle
    fn start(&mut self) -> SimResult<()> {
        verify_bindings(&self.graph)?;
        log_backward_connections(&self.graph);
        self.status = RunStatus::Running;
        debug!("starting run with {} models", self.len());
        Ok(())
    }

    fn advance_model(&mut self, id: ModelId, t_end: Time) -> SimResult<()> {
        let input_state = self.resolve_inputs(id, t_end)?;
        let node = &mut self.graph[id.0];
        let step = TimeStep::new(&node.name, node.t, t_end, node.dt);

        debug!(
            "advancing {:?} model '{}' from {} to {}",
            node.model.kind(),
            node.name,
            step.start,
            step.end
        );
        node.model.advance(&step, &input_state)?;
        node.t = t_end;
        Ok(())
    }

    /// Advance the clock to the next deadline
    ///
    /// Every model whose deadline has been reached is advanced, in registration order. The
    /// first call validates that every declared input is bound and freezes the graph.
    ///
    /// If a model fails to advance the run is aborted. Models advanced earlier in the failed
    /// cycle keep their new state and the clock is not moved.
    ///
    /// Returns the new time.
    pub fn cycle(&mut self) -> SimResult<Time> {
        match self.status {
            RunStatus::Aborted => return Err(SimError::RunAborted { t: self.t }),
            RunStatus::Configuring => self.start()?,
            RunStatus::Running => {}
        }

        let proposed = self.next_deadline()?;
        debug!("cycle t={} -> {}", self.t, proposed);

        for index in 0..self.order.len() {
            let id = self.order[index];
            if !self.graph[id.0].ready_at(proposed) {
                continue;
            }
            if let Err(err) = self.advance_model(id, proposed) {
                error!(
                    "aborting run at t={}: '{}' failed: {}",
                    self.t, self.graph[id.0].name, err
                );
                self.status = RunStatus::Aborted;
                return Err(err);
            }
        }

        self.t = proposed;
        Ok(proposed)
    }

    /// Cycle until the clock reaches `t_end`
    ///
    /// The final cycle may overshoot `t_end` if no deadline falls exactly on it.
    /// Returns the number of cycles performed.
    pub fn run_until(&mut self, t_end: Time) -> SimResult<usize> {
        let mut cycles = 0;
        while self.t < t_end {
            self.cycle()?;
            cycles += 1;
        }
        Ok(cycles)
    }

    /// Cycle for `duration` time units from the current time
    pub fn run_for(&mut self, duration: Time) -> SimResult<usize> {
        self.run_until(self.t + duration)
    }

    /// Create a diagram that represents the model graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &ModelGraph> {
        Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, er| format!("label = {:?}", er.weight().to_string()),
            &|_, (_, node)| format!("label = {:?}", node.name),
        )
    }
}
