//! ObservableRegistry - observable element の登録と管理
//!
//! Tracks which field names of one subject are eligible for change
//! notification. Iteration order is insertion order.

use crate::domain::{WatchSpec, WILDCARD};
use crate::error::{ObservaError, Result};

/// Ordered set of observable element names.
///
/// # 使用例
/// ```ignore
/// let mut registry = ObservableRegistry::new();
/// registry.add("voltage")?;
/// assert!(registry.is_observable(&WatchSpec::from("voltage")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservableRegistry {
    elements: Vec<String>,
}

impl ObservableRegistry {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Add an observable element.
    ///
    /// Fails with `DuplicateField` when the name is already present and with
    /// `InvalidFieldName` for `"*"` or an empty name.
    pub fn add(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() || name == WILDCARD {
            return Err(ObservaError::InvalidFieldName(name));
        }
        if self.contains(&name) {
            return Err(ObservaError::DuplicateField(name));
        }
        tracing::debug!(element = %name, "observable element added");
        self.elements.push(name);
        Ok(())
    }

    /// Remove an observable element. Absent names are ignored.
    ///
    /// Existing registrations that name the element are left in place.
    pub fn remove(&mut self, name: &str) {
        if let Some(pos) = self.elements.iter().position(|e| e == name) {
            self.elements.remove(pos);
            tracing::debug!(element = %name, "observable element removed");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e == name)
    }

    /// Whether every field named by `spec` is observable.
    ///
    /// The wildcard is always observable; an empty field list is vacuously
    /// observable.
    pub fn is_observable(&self, spec: &WatchSpec) -> bool {
        self.first_unknown(spec).is_none()
    }

    /// First name in `spec` that is not observable, if any.
    pub fn first_unknown<'a>(&self, spec: &'a WatchSpec) -> Option<&'a str> {
        spec.names()
            .iter()
            .map(String::as_str)
            .find(|name| !self.contains(name))
    }

    pub fn list(&self) -> &[String] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
