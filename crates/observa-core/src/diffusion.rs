//! DiffusionEngine - 変更を observer に配信する
//!
//! Given one field mutation, the engine walks the registrations that watch
//! the field in insertion order and calls each handler with values scoped
//! to what it asked for:
//!
//! - single field: `(previous, current)` as given, no snapshot is built
//! - field list / wildcard: `(previous_snapshot, current_snapshot)` where the
//!   current snapshot is read live from the subject and the previous one is
//!   a copy with the mutated field replaced by `previous`
//!
//! Handler errors are not caught. The first failing handler stops the
//! dispatch and its error is returned to the mutation site.

use serde_json::Value;

use crate::domain::{Registration, Snapshot, WILDCARD, WatchSpec};
use crate::error::{ObservaError, Result};
use crate::ports::FieldSource;
use crate::registry::ObservableRegistry;
use crate::store::ObserverStore;

/// Stateless dispatch over a registry and a store.
///
/// The engine only borrows; nothing it does changes either side.
pub struct DiffusionEngine<'a> {
    registry: &'a ObservableRegistry,
    store: &'a ObserverStore,
}

impl<'a> DiffusionEngine<'a> {
    pub fn new(registry: &'a ObservableRegistry, store: &'a ObserverStore) -> Self {
        Self { registry, store }
    }

    /// Diffuse a single mutation of `field`.
    ///
    /// `field` must be observable; anything else is a bug in the caller and
    /// fails with `NotObservable` before any handler runs. Returns the number
    /// of handlers invoked.
    pub fn notify(
        &self,
        source: &dyn FieldSource,
        field: &str,
        previous: &Value,
        current: &Value,
    ) -> Result<usize> {
        if !self.registry.contains(field) {
            return Err(ObservaError::NotObservable(field.to_string()));
        }

        let mut delivered = 0;
        for registration in self.store.matching(Some(field)) {
            tracing::trace!(field, kind = %registration.kind(), "observer matched");
            match registration.watch() {
                WatchSpec::Field(_) => {
                    invoke(registration, field, previous, current)?;
                }
                watch @ (WatchSpec::Fields(_) | WatchSpec::Wildcard) => {
                    let current_snapshot = read_snapshot(source, self.scope(watch));
                    let mut previous_snapshot = current_snapshot.clone();
                    previous_snapshot.insert(field.to_string(), previous.clone());
                    invoke(
                        registration,
                        field,
                        &Value::Object(previous_snapshot),
                        &Value::Object(current_snapshot),
                    )?;
                }
            }
            delivered += 1;
        }

        tracing::debug!(field, observers = delivered, "change diffused");
        Ok(delivered)
    }

    /// Diffuse a bulk state change.
    ///
    /// Every registration is visited in insertion order and invoked, whether
    /// or not its fields changed, with `previous` and `current` scoped to its
    /// watch spec. Missing keys read as `Null`.
    pub fn notify_state(&self, previous: &Snapshot, current: &Snapshot) -> Result<usize> {
        let mut delivered = 0;
        for registration in self.store.matching(None) {
            let watch = registration.watch();
            tracing::trace!(kind = %registration.kind(), watch = %watch, "state observer");
            match watch {
                WatchSpec::Field(name) => invoke(
                    registration,
                    name,
                    &previous.field_value(name),
                    &current.field_value(name),
                )?,
                WatchSpec::Fields(_) | WatchSpec::Wildcard => {
                    let scope = self.scope(watch);
                    // error label: the first changed field, or "*" when nothing changed
                    let label = scope
                        .iter()
                        .find(|name| previous.field_value(name) != current.field_value(name))
                        .map_or(WILDCARD, String::as_str);
                    invoke(
                        registration,
                        label,
                        &Value::Object(read_snapshot(previous, scope)),
                        &Value::Object(read_snapshot(current, scope)),
                    )?
                }
            }
            delivered += 1;
        }

        tracing::debug!(observers = delivered, "state diffused");
        Ok(delivered)
    }

    /// Field names a snapshot for `watch` covers.
    fn scope<'s>(&'s self, watch: &'s WatchSpec) -> &'s [String] {
        match watch {
            WatchSpec::Wildcard => self.registry.list(),
            _ => watch.names(),
        }
    }
}

fn read_snapshot<S: FieldSource + ?Sized>(source: &S, names: &[String]) -> Snapshot {
    names
        .iter()
        .map(|name| (name.clone(), source.field_value(name)))
        .collect()
}

fn invoke(
    registration: &Registration,
    field: &str,
    previous: &Value,
    current: &Value,
) -> Result<()> {
    registration
        .handler()
        .call(previous, current)
        .map_err(|source| {
            tracing::warn!(
                field,
                watch = %registration.watch(),
                error = %source,
                "observer failed, dispatch stopped"
            );
            ObservaError::Handler {
                field: field.to_string(),
                source,
            }
        })
}
