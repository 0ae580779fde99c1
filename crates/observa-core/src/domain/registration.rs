//! Handler / Registration - observer の登録レコード
//!
//! # 学習ポイント
//! - `Arc<dyn Fn>` による型消去された callback
//! - ポインタ同一性による等価性（構造的等価 = (spec, handler)）

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::watch_spec::{WatchKind, WatchSpec};

/// Error returned by an observer callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("json decode: {err}"))
    }
}

/// Callback signature: `(previous, current)`.
///
/// Single-field observers receive the field values; field-list and wildcard
/// observers receive `Value::Object` snapshots.
pub type HandlerFn = dyn Fn(&Value, &Value) -> Result<(), HandlerError> + Send + Sync;

/// Shared observer callback.
///
/// Two handlers are equal when they share the same closure, so a clone of a
/// handler can be used to unregister it.
#[derive(Clone)]
pub struct Handler {
    call: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F>(call: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            call: Arc::new(call),
        }
    }

    pub fn call(&self, previous: &Value, current: &Value) -> Result<(), HandlerError> {
        (self.call)(previous, current)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.call) as *const ())
    }
}

/// One observer: what it watches and whom to call.
///
/// Immutable once created. The classification is computed here, once, and
/// read back at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    watch: WatchSpec,
    kind: WatchKind,
    handler: Handler,
}

impl Registration {
    pub fn new(watch: WatchSpec, handler: Handler) -> Self {
        let kind = watch.kind();
        Self {
            watch,
            kind,
            handler,
        }
    }

    pub fn watch(&self) -> &WatchSpec {
        &self.watch
    }

    pub fn kind(&self) -> WatchKind {
        self.kind
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn matches(&self, field: &str) -> bool {
        self.watch.contains(field)
    }

    /// Structural identity used for removal.
    pub fn is(&self, watch: &WatchSpec, handler: &Handler) -> bool {
        &self.watch == watch && &self.handler == handler
    }
}
