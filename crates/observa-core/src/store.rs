//! ObserverStore - observer 登録の順序付きコレクション
//!
//! Design:
//! - Registrations are kept in insertion order; delivery order is part of
//!   the contract.
//! - Validation happens once, at registration time. Later changes to the
//!   registry do not invalidate existing registrations.
//! - `matching()` is a lazy iterator borrowed from the store, so a caller
//!   can stop early and every call starts a fresh traversal.

use crate::domain::{Handler, Registration, WatchKind, WatchSpec};
use crate::error::{ObservaError, Result};
use crate::registry::ObservableRegistry;

#[derive(Debug, Clone, Default)]
pub struct ObserverStore {
    registrations: Vec<Registration>,
}

impl ObserverStore {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register `handler` for `watch` and hand the handler back.
    ///
    /// Fails with `InvalidWatchSpec` for an empty or duplicated field list and
    /// with `UnknownField` when any named field is not observable. On failure
    /// the store is unchanged.
    pub fn register(
        &mut self,
        registry: &ObservableRegistry,
        watch: WatchSpec,
        handler: Handler,
    ) -> Result<Handler> {
        watch.validate_shape()?;
        if let Some(unknown) = registry.first_unknown(&watch) {
            return Err(ObservaError::UnknownField(unknown.to_string()));
        }
        tracing::debug!(watch = %watch, kind = %watch.kind(), "observer registered");
        self.registrations
            .push(Registration::new(watch, handler.clone()));
        Ok(handler)
    }

    /// Remove the first registration equal to `(watch, handler)`.
    ///
    /// Returns whether something was removed; a miss is not an error.
    pub fn unregister(&mut self, watch: &WatchSpec, handler: &Handler) -> bool {
        match self.registrations.iter().position(|r| r.is(watch, handler)) {
            Some(pos) => {
                self.registrations.remove(pos);
                tracing::debug!(watch = %watch, "observer unregistered");
                true
            }
            None => false,
        }
    }

    pub fn remove_all(&mut self) {
        self.registrations.clear();
    }

    /// Registrations concerned by a change of `field`, in insertion order.
    ///
    /// With `None`, every registration is yielded.
    pub fn matching<'a>(
        &'a self,
        field: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Registration> + 'a {
        self.registrations
            .iter()
            .filter(move |r| field.is_none_or(|f| r.matches(f)))
    }

    pub fn list(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn count_kind(&self, kind: WatchKind) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.kind() == kind)
            .count()
    }
}
