//! Recording the evolution of a world.
//!
//! A [`Recorder`] is an ordinary discrete model that may have any input bound to it. Every time
//! it is updated it appends the current time and each bound value to its [`Trace`], so the rate
//! at which a signal is sampled is simply the recorder's period.

use crate::errors::SimResult;
use crate::model::{DiscreteModel, Model, ModelKind, TimeStep};
use crate::state::{InputState, PortValue};
use crate::{FloatValue, Time};
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

/// Columns of samples sharing a time axis
///
/// Vector valued inputs are expanded into one column per element named `name[i]`.
/// Missing samples are NaN, which is serialised as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    time: Vec<Time>,
    #[serde(with = "nan_as_null")]
    columns: IndexMap<String, Vec<FloatValue>>,
}

/// Write NaN samples as `null` and read them back
///
/// Formats such as JSON have no representation for NaN.
mod nan_as_null {
    use crate::FloatValue;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    type Columns = IndexMap<String, Vec<FloatValue>>;

    pub fn serialize<S: Serializer>(columns: &Columns, serializer: S) -> Result<S::Ok, S::Error> {
        let columns: IndexMap<&str, Vec<Option<FloatValue>>> = columns
            .iter()
            .map(|(name, values)| {
                let values = values
                    .iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect();
                (name.as_str(), values)
            })
            .collect();
        columns.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Columns, D::Error> {
        let columns = IndexMap::<String, Vec<Option<FloatValue>>>::deserialize(deserializer)?;
        Ok(columns
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .map(|v| v.unwrap_or(FloatValue::NAN))
                    .collect();
                (name, values)
            })
            .collect())
    }
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample times
    pub fn time(&self) -> &[Time] {
        &self.time
    }

    /// Samples of a column, aligned with [`Trace::time`]
    pub fn column(&self, name: &str) -> Option<&[FloatValue]> {
        self.columns.get(name).map(|values| values.as_slice())
    }

    /// Column names in the order they first appeared
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|name| name.as_str())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Append a row
    ///
    /// Columns missing from `values` are padded with NaN. A column seen for the first time is
    /// back-filled with NaN for the earlier rows.
    pub fn push(&mut self, t: Time, values: IndexMap<String, FloatValue>) {
        let rows = self.time.len();

        for (name, column) in self.columns.iter_mut() {
            match values.get(name) {
                Some(value) => column.push(*value),
                None => {
                    warn!("no sample for '{}' at t={}, recording NaN", name, t);
                    column.push(FloatValue::NAN);
                }
            }
        }
        for (name, value) in values {
            if !self.columns.contains_key(&name) {
                let mut column = vec![FloatValue::NAN; rows];
                column.push(value);
                self.columns.insert(name, column);
            }
        }

        self.time.push(t);
    }
}

/// Flatten a bound value into named columns
fn flatten(name: &str, value: &PortValue, row: &mut IndexMap<String, FloatValue>) {
    match value {
        PortValue::Scalar(v) => {
            row.insert(name.to_string(), *v);
        }
        PortValue::Vector(values) if values.is_empty() => {
            warn!("'{}' is an empty vector, recording NaN", name);
            row.insert(name.to_string(), FloatValue::NAN);
        }
        PortValue::Vector(values) => {
            for (i, v) in values.iter().enumerate() {
                row.insert(format!("{}[{}]", name, i), *v);
            }
        }
    }
}

/// A discrete model appending every bound input to a [`Trace`]
///
/// The recorder never fails an update. Values it cannot place are recorded as NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recorder {
    #[serde(default)]
    trace: Trace,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }
}

impl DiscreteModel for Recorder {
    fn update(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        let mut row = IndexMap::new();
        for (name, value) in input_state.iter() {
            flatten(name, value, &mut row);
        }
        self.trace.push(step.end, row);
        Ok(())
    }
}

#[typetag::serde]
impl Model for Recorder {
    fn kind(&self) -> ModelKind {
        ModelKind::Discrete
    }

    fn inputs(&self) -> Vec<&'static str> {
        vec![]
    }

    fn accepts_input(&self, _name: &str) -> bool {
        true
    }

    fn outputs(&self) -> Vec<&'static str> {
        vec!["samples"]
    }

    fn output(&self, name: &str) -> Option<PortValue> {
        match name {
            "samples" => Some(PortValue::Scalar(self.trace.len() as FloatValue)),
            _ => None,
        }
    }

    fn advance(&mut self, step: &TimeStep, input_state: &InputState) -> SimResult<()> {
        self.update(step, input_state)
    }
}
