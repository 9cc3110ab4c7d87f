//! Values exchanged between models.
//!
//! Every model publishes a table of named outputs. Each output is a [`PortValue`] that can be
//! read by any model holding a binding to it. Before a model is advanced, the scheduler resolves
//! all of its bindings into an [`InputState`] snapshot which the model reads its inputs from.

use crate::errors::{SimError, SimResult};
use crate::{FloatValue, Time};
use indexmap::IndexMap;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// Represents a published value that can be either a scalar or a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// A single value
    Scalar(FloatValue),
    /// A sequence of values, for example the state vector of a dynamic model
    Vector(Vec<FloatValue>),
}

impl PortValue {
    /// Apply an optional index to the value
    ///
    /// Without an index the value is returned unchanged.
    /// Indexing a vector selects a single element.
    /// Returns `None` if a scalar is indexed or the index is out of range.
    pub fn select(&self, index: Option<usize>) -> Option<PortValue> {
        match (self, index) {
            (value, None) => Some(value.clone()),
            (PortValue::Vector(values), Some(i)) => values.get(i).copied().map(PortValue::Scalar),
            (PortValue::Scalar(_), Some(_)) => None,
        }
    }

    /// Get the scalar value if this is a Scalar variant
    pub fn as_scalar(&self) -> Option<FloatValue> {
        match self {
            PortValue::Scalar(v) => Some(*v),
            PortValue::Vector(_) => None,
        }
    }

    /// Get the values if this is a Vector variant
    pub fn as_vector(&self) -> Option<&[FloatValue]> {
        match self {
            PortValue::Scalar(_) => None,
            PortValue::Vector(values) => Some(values),
        }
    }

    /// Check if this is a scalar value
    pub fn is_scalar(&self) -> bool {
        matches!(self, PortValue::Scalar(_))
    }

    /// Number of elements held by the value
    pub fn len(&self) -> usize {
        match self {
            PortValue::Scalar(_) => 1,
            PortValue::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<FloatValue> for PortValue {
    fn from(value: FloatValue) -> Self {
        PortValue::Scalar(value)
    }
}

impl From<Vec<FloatValue>> for PortValue {
    fn from(values: Vec<FloatValue>) -> Self {
        PortValue::Vector(values)
    }
}

impl<const D: usize> From<SVector<FloatValue, D>> for PortValue {
    fn from(values: SVector<FloatValue, D>) -> Self {
        PortValue::Vector(values.iter().copied().collect())
    }
}

/// Conversion from a resolved input into the type of the field holding it
pub trait FromPortValue: Sized {
    /// Human readable description of the accepted shape, used in error messages
    const EXPECTED: &'static str;

    fn from_port_value(value: &PortValue) -> Option<Self>;
}

impl FromPortValue for FloatValue {
    const EXPECTED: &'static str = "a scalar";

    fn from_port_value(value: &PortValue) -> Option<Self> {
        value.as_scalar()
    }
}

impl FromPortValue for Vec<FloatValue> {
    const EXPECTED: &'static str = "a vector";

    fn from_port_value(value: &PortValue) -> Option<Self> {
        match value {
            PortValue::Scalar(v) => Some(vec![*v]),
            PortValue::Vector(values) => Some(values.clone()),
        }
    }
}

impl<const D: usize> FromPortValue for SVector<FloatValue, D> {
    const EXPECTED: &'static str = "a vector of fixed length";

    fn from_port_value(value: &PortValue) -> Option<Self> {
        value
            .as_vector()
            .filter(|values| values.len() == D)
            .map(SVector::from_column_slice)
    }
}

/// Input state for a model
///
/// A snapshot of every input bound to a model, resolved immediately before the model is
/// advanced. The values do not change while the model is being advanced, which is what gives
/// dynamic models their zero-order hold over an integration interval.
#[derive(Debug, Clone)]
pub struct InputState {
    model: String,
    current_time: Time,
    values: IndexMap<String, PortValue>,
}

impl InputState {
    pub fn build(model: &str, current_time: Time, values: IndexMap<String, PortValue>) -> Self {
        Self {
            model: model.to_string(),
            current_time,
            values,
        }
    }

    /// Build an input state from a list of values
    ///
    /// Mostly useful for exercising a model outside of a [`World`](crate::world::World).
    pub fn from_values<I, S>(model: &str, current_time: Time, values: I) -> Self
    where
        I: IntoIterator<Item = (S, PortValue)>,
        S: Into<String>,
    {
        Self::build(
            model,
            current_time,
            values
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn empty(model: &str) -> Self {
        Self::build(model, Time::NAN, IndexMap::new())
    }

    /// The time the inputs were resolved for
    pub fn current_time(&self) -> Time {
        self.current_time
    }

    /// Get the value bound to a local input name
    pub fn get(&self, name: &str) -> SimResult<&PortValue> {
        self.values.get(name).ok_or_else(|| SimError::UnknownInput {
            model: self.model.clone(),
            input: name.to_string(),
        })
    }

    /// Get an input and convert it into the requested type
    pub fn read<T: FromPortValue>(&self, name: &str) -> SimResult<T> {
        let value = self.get(name)?;
        T::from_port_value(value).ok_or_else(|| SimError::PortMismatch {
            model: self.model.clone(),
            input: name.to_string(),
            expected: T::EXPECTED.to_string(),
        })
    }

    /// Get an input that must be a scalar
    pub fn get_scalar(&self, name: &str) -> SimResult<FloatValue> {
        self.read(name)
    }

    /// Get an input that must be a vector
    pub fn get_vector(&self, name: &str) -> SimResult<&[FloatValue]> {
        self.get(name)?
            .as_vector()
            .ok_or_else(|| SimError::PortMismatch {
                model: self.model.clone(),
                input: name.to_string(),
                expected: "a vector".to_string(),
            })
    }

    /// Test if the state contains a value with the given name
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over the inputs in the order they were bound
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PortValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
