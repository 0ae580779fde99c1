//! WatchSpec - observer が何を監視するか
//!
//! The shape of an observation is decided once, when the spec is built, and
//! carried as a tagged variant. Dispatch switches on the tag instead of
//! probing the spec again.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ObservaError, Result};

/// Token that stands for "every observable element".
pub const WILDCARD: &str = "*";

/// Classification of a raw watch spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchKind {
    Wildcard,
    SingleField,
    FieldList,
    Invalid,
}

impl WatchKind {
    /// Classify an untyped spec, e.g. one read from configuration.
    ///
    /// - `"*"` → `Wildcard`
    /// - any other string → `SingleField`
    /// - an array whose items are all strings → `FieldList`
    /// - anything else (numbers, objects, mixed arrays, ...) → `Invalid`
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::String(name) if name == WILDCARD => WatchKind::Wildcard,
            Value::String(_) => WatchKind::SingleField,
            Value::Array(items) if items.iter().all(Value::is_string) => WatchKind::FieldList,
            _ => WatchKind::Invalid,
        }
    }
}

impl fmt::Display for WatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WatchKind::Wildcard => "wildcard",
            WatchKind::SingleField => "single_field",
            WatchKind::FieldList => "field_list",
            WatchKind::Invalid => "invalid",
        };
        f.write_str(label)
    }
}

/// What an observer listens to.
///
/// ```ignore
/// let all = WatchSpec::from("*");
/// let one = WatchSpec::from("voltage");
/// let some = WatchSpec::from(["voltage", "level"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchSpec {
    Wildcard,
    Field(String),
    Fields(Vec<String>),
}

impl WatchSpec {
    pub fn kind(&self) -> WatchKind {
        match self {
            WatchSpec::Wildcard => WatchKind::Wildcard,
            WatchSpec::Field(_) => WatchKind::SingleField,
            WatchSpec::Fields(_) => WatchKind::FieldList,
        }
    }

    /// Names referenced explicitly by the spec. Empty for `Wildcard`.
    pub fn names(&self) -> &[String] {
        match self {
            WatchSpec::Wildcard => &[],
            WatchSpec::Field(name) => std::slice::from_ref(name),
            WatchSpec::Fields(names) => names,
        }
    }

    /// Whether a change of `field` concerns this spec.
    pub fn contains(&self, field: &str) -> bool {
        match self {
            WatchSpec::Wildcard => true,
            WatchSpec::Field(name) => name == field,
            WatchSpec::Fields(names) => names.iter().any(|name| name == field),
        }
    }

    /// Shape checks that do not depend on which elements are observable.
    ///
    /// A field list must be non-empty and must not name a field twice.
    pub fn validate_shape(&self) -> Result<()> {
        if let WatchSpec::Fields(names) = self {
            if names.is_empty() {
                return Err(ObservaError::InvalidWatchSpec(
                    "field list must name at least one field".to_string(),
                ));
            }
            let mut seen = HashSet::with_capacity(names.len());
            if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ObservaError::InvalidWatchSpec(format!(
                    "field {dup:?} appears more than once"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for WatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchSpec::Wildcard => f.write_str(WILDCARD),
            WatchSpec::Field(name) => f.write_str(name),
            WatchSpec::Fields(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl From<&str> for WatchSpec {
    fn from(name: &str) -> Self {
        if name == WILDCARD {
            WatchSpec::Wildcard
        } else {
            WatchSpec::Field(name.to_string())
        }
    }
}

impl From<String> for WatchSpec {
    fn from(name: String) -> Self {
        if name == WILDCARD {
            WatchSpec::Wildcard
        } else {
            WatchSpec::Field(name)
        }
    }
}

impl From<Vec<String>> for WatchSpec {
    fn from(names: Vec<String>) -> Self {
        WatchSpec::Fields(names)
    }
}

impl From<Vec<&str>> for WatchSpec {
    fn from(names: Vec<&str>) -> Self {
        WatchSpec::Fields(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for WatchSpec {
    fn from(names: &[&str]) -> Self {
        WatchSpec::Fields(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for WatchSpec {
    fn from(names: [&str; N]) -> Self {
        WatchSpec::Fields(names.iter().map(|name| name.to_string()).collect())
    }
}

impl TryFrom<&Value> for WatchSpec {
    type Error = ObservaError;

    fn try_from(raw: &Value) -> Result<Self> {
        match (WatchKind::classify(raw), raw) {
            (WatchKind::Wildcard, _) => Ok(WatchSpec::Wildcard),
            (WatchKind::SingleField, Value::String(name)) => Ok(WatchSpec::Field(name.clone())),
            (WatchKind::FieldList, Value::Array(items)) => Ok(WatchSpec::Fields(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            _ => Err(ObservaError::InvalidWatchSpec(format!(
                "expected \"*\", a field name or a list of field names, got {raw}"
            ))),
        }
    }
}
