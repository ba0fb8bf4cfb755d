//! The ordered label → value mapping every analyzer produces.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Label of the sole entry of a failed analysis.
pub const ERROR_LABEL: &str = "error";

/// A single value in a [`StructuredResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A number or string, stored in its rendered form.
    Scalar(String),
    /// An ordered list of rendered items.
    List(Vec<String>),
}

impl Value {
    /// Whether this is a list value.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }

    /// List items, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// Ordered mapping from section label to value.
///
/// Insertion order is preserved. Setting an existing label replaces its
/// value in place. A failed analysis holds exactly one `error` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredResult {
    entries: Vec<(String, Value)>,
}

impl StructuredResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a failed result carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            entries: vec![(ERROR_LABEL.to_string(), Value::Scalar(message.into()))],
        }
    }

    /// Set a value, replacing an existing entry with the same label.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Value>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((label, value)),
        }
    }

    /// Set a scalar from anything displayable.
    pub fn insert_scalar(&mut self, label: impl Into<String>, value: impl std::fmt::Display) {
        self.insert(label, Value::Scalar(value.to_string()));
    }

    /// Set a list value.
    pub fn insert_list<I, S>(&mut self, label: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(label, Value::List(items.into_iter().map(Into::into).collect()));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// Error message, if this is a failed analysis.
    pub fn error_message(&self) -> Option<&str> {
        match self.entries.as_slice() {
            [(label, Value::Scalar(message))] if label == ERROR_LABEL => Some(message),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }
}

impl Serialize for StructuredResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
