//! ObservableConfig - 宣言的な設定
//!
//! ```json
//! {
//!   "elements": ["voltage", "level", "plugged"],
//!   "observers": [
//!     { "watch": "voltage", "handler": "display" },
//!     { "watch": ["voltage", "level"], "handler": "log" },
//!     { "watch": "*", "handler": "persist" }
//!   ]
//! }
//! ```
//!
//! `watch` is kept as raw JSON and classified when the config is applied;
//! `handler` names an entry of a [`HandlerTable`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Handler, WatchSpec};
use crate::error::{ObservaError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservableConfig {
    /// Observable element names, in declaration order.
    #[serde(default)]
    pub elements: Vec<String>,

    #[serde(default)]
    pub observers: Vec<ObserverConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    pub watch: Value,
    pub handler: String,
}

impl ObservableConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_value(raw: Value) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }
}

impl ObserverConfig {
    /// Classify `watch` and look up `handler`.
    pub fn resolve(&self, table: &HandlerTable) -> Result<(WatchSpec, Handler)> {
        let watch = WatchSpec::try_from(&self.watch)?;
        let Some(handler) = table.get(&self.handler).cloned() else {
            tracing::warn!(handler = %self.handler, known = ?table.names(), "unknown handler");
            return Err(ObservaError::InvalidHandler(self.handler.clone()));
        };
        Ok((watch, handler))
    }
}

/// Named handlers that configuration can refer to.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: Handler) -> Result<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(ObservaError::DuplicateHandler(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
