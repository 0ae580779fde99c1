//! Domain model - watch specs, handlers, registrations, snapshots.

pub mod registration;
pub mod watch_spec;

pub use self::registration::{Handler, HandlerError, HandlerFn, Registration};
pub use self::watch_spec::{WatchKind, WatchSpec, WILDCARD};

/// Point-in-time mapping from field name to value.
///
/// Key order follows the watch spec, or the registry's insertion order for
/// wildcard observers.
pub type Snapshot = serde_json::Map<String, serde_json::Value>;
