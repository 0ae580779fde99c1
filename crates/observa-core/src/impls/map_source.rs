//! In-memory field source backed by an ordered JSON map.

use serde_json::Value;

use crate::domain::Snapshot;
use crate::ports::FieldSource;

impl FieldSource for Snapshot {
    fn field_value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

/// State document for hosts that keep their fields in a map.
///
/// Mutators return the previous value so the caller can hand it to
/// `Observable::notify`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFieldSource {
    fields: Snapshot,
}

impl MapFieldSource {
    pub fn new() -> Self {
        Self {
            fields: Snapshot::new(),
        }
    }

    /// Set `name` to `value`, returning the previous value (`Null` if unset).
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Value {
        self.fields.insert(name.into(), value).unwrap_or(Value::Null)
    }

    /// Delete `name`, returning the previous value (`Null` if unset).
    pub fn delete(&mut self, name: &str) -> Value {
        self.fields.shift_remove(name).unwrap_or(Value::Null)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.fields
    }
}

impl FieldSource for MapFieldSource {
    fn field_value(&self, name: &str) -> Value {
        self.fields.field_value(name)
    }
}
