//! Observable - subject に組み込む公開 API
//!
//! `Observable` owns one subject's observable elements and observers and
//! runs the diffusion engine on every mutation the subject reports.
//!
//! # 使用例
//! ```ignore
//! struct Battery {
//!     state: MapFieldSource,
//!     observable: Observable,
//! }
//!
//! impl FieldSource for Battery { ... }
//! impl Subject for Battery { fn observable(&self) -> &Observable { &self.observable } }
//!
//! battery.observable.observe_field("voltage", Handler::new(|prev, cur| { ...; Ok(()) }))?;
//! let previous = battery.state.set("voltage", json!(3392));
//! battery.diffuse("voltage", &previous, &json!(3392))?;
//! ```
//!
//! # Re-entrancy
//! A handler that mutates the same subject while a dispatch is running gets
//! `ObservaError::Reentrant` from the nested `notify`. The guard is released
//! when the outer dispatch returns, whether it succeeded or not.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::app::ObserverCounts;
use crate::diffusion::DiffusionEngine;
use crate::domain::{Handler, HandlerError, Registration, Snapshot, WatchKind, WatchSpec};
use crate::error::{ObservaError, Result};
use crate::ports::FieldSource;
use crate::registry::ObservableRegistry;
use crate::store::ObserverStore;

/// Host object contract.
///
/// A subject exposes its field values through `FieldSource` and its
/// `Observable`; it must call `diffuse` exactly once per externally visible
/// mutation of an observable field, deletions included (as a transition to
/// `Value::Null`).
pub trait Subject: FieldSource {
    fn observable(&self) -> &Observable;

    fn diffuse(&self, field: &str, previous: &Value, current: &Value) -> Result<usize>
    where
        Self: Sized,
    {
        self.observable().notify(self, field, previous, current)
    }

    fn diffuse_state(&self, previous: &Snapshot, current: &Snapshot) -> Result<usize>
    where
        Self: Sized,
    {
        self.observable().notify_state(previous, current)
    }
}

/// Observable elements and observers of one subject instance.
#[derive(Debug, Default)]
pub struct Observable {
    elements: ObservableRegistry,
    observers: ObserverStore,
    dispatching: AtomicBool,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with a declared list of observable elements.
    pub fn with_elements<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut observable = Self::new();
        for name in names {
            observable.register_observable(name)?;
        }
        Ok(observable)
    }

    // ── observable elements ────────────────────────────────────────────────

    pub fn register_observable(&mut self, name: impl Into<String>) -> Result<()> {
        self.elements.add(name)
    }

    pub fn unregister_observable(&mut self, name: &str) {
        self.elements.remove(name);
    }

    pub fn is_observable(&self, spec: &WatchSpec) -> bool {
        self.elements.is_observable(spec)
    }

    pub fn observable_elements(&self) -> &[String] {
        self.elements.list()
    }

    pub fn has_observable_elements(&self) -> bool {
        !self.elements.is_empty()
    }

    // ── observers ──────────────────────────────────────────────────────────

    /// Register `handler` for a field, a list of fields or `"*"`.
    pub fn observe_field(
        &mut self,
        watch: impl Into<WatchSpec>,
        handler: Handler,
    ) -> Result<Handler> {
        self.observers.register(&self.elements, watch.into(), handler)
    }

    /// Register `handler` for every observable element.
    pub fn observe_state(&mut self, handler: Handler) -> Result<Handler> {
        self.observe_field(WatchSpec::Wildcard, handler)
    }

    /// Decorator-style registration: fix the spec now, supply the handler later.
    ///
    /// ```ignore
    /// let handler = observable.observer("voltage").call(&mut observable, |prev, cur| Ok(()))?;
    /// ```
    pub fn observer(&self, watch: impl Into<WatchSpec>) -> Registrar {
        Registrar {
            watch: watch.into(),
        }
    }

    /// Remove one `(watch, handler)` registration. Returns whether it existed.
    pub fn unobserve(&mut self, watch: impl Into<WatchSpec>, handler: &Handler) -> bool {
        self.observers.unregister(&watch.into(), handler)
    }

    pub fn unobserve_all(&mut self) {
        self.observers.remove_all();
    }

    pub fn list_observers(&self) -> &[Registration] {
        self.observers.list()
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub fn counts(&self) -> ObserverCounts {
        ObserverCounts {
            wildcard: self.observers.count_kind(WatchKind::Wildcard),
            single_field: self.observers.count_kind(WatchKind::SingleField),
            field_list: self.observers.count_kind(WatchKind::FieldList),
        }
    }

    // ── diffusion ──────────────────────────────────────────────────────────

    /// Diffuse one mutation of `field`; see [`DiffusionEngine::notify`].
    pub fn notify(
        &self,
        source: &dyn FieldSource,
        field: &str,
        previous: &Value,
        current: &Value,
    ) -> Result<usize> {
        let _guard = DispatchGuard::acquire(&self.dispatching, field)?;
        DiffusionEngine::new(&self.elements, &self.observers)
            .notify(source, field, previous, current)
    }

    /// Diffuse a bulk state change; see [`DiffusionEngine::notify_state`].
    pub fn notify_state(&self, previous: &Snapshot, current: &Snapshot) -> Result<usize> {
        let _guard = DispatchGuard::acquire(&self.dispatching, "*")?;
        DiffusionEngine::new(&self.elements, &self.observers).notify_state(previous, current)
    }
}

/// Pending decorator-style registration.
#[must_use = "a Registrar does nothing until a handler is supplied"]
#[derive(Debug, Clone)]
pub struct Registrar {
    watch: WatchSpec,
}

impl Registrar {
    pub fn call<F>(self, observable: &mut Observable, call: F) -> Result<Handler>
    where
        F: Fn(&Value, &Value) -> std::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handler(observable, Handler::new(call))
    }

    pub fn handler(self, observable: &mut Observable, handler: Handler) -> Result<Handler> {
        observable.observe_field(self.watch, handler)
    }
}

/// Marks a dispatch as running for as long as it lives.
struct DispatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DispatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool, field: &str) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!(field, "re-entrant notification rejected");
            return Err(ObservaError::Reentrant(field.to_string()));
        }
        Ok(Self { flag })
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::MapFieldSource;
    use serde_json::json;
    use std::sync::{Arc, Mutex, OnceLock, Weak};

    /// Subject used across the tests: a battery whose state lives in a map.
    struct Battery {
        state: Mutex<MapFieldSource>,
        observable: Observable,
    }

    fn battery_observable() -> Observable {
        Observable::with_elements(["voltage", "level", "plugged"]).unwrap()
    }

    impl Battery {
        fn new(observable: Observable) -> Self {
            let mut state = MapFieldSource::new();
            state.set("voltage", json!(0));
            state.set("capacity", json!(0));
            state.set("level", json!(0.0));
            state.set("plugged", json!(false));
            Self {
                state: Mutex::new(state),
                observable,
            }
        }

        fn set(&self, field: &str, value: Value) -> Result<usize> {
            let previous = self.state.lock().unwrap().set(field, value.clone());
            self.diffuse(field, &previous, &value)
        }

        fn update(&self, voltage: u32, plugged: bool) -> Result<usize> {
            let (previous, current) = {
                let mut state = self.state.lock().unwrap();
                let previous = state.snapshot().clone();
                state.set("voltage", json!(voltage));
                state.set("level", json!(f64::from(voltage) / 5000.0));
                state.set("plugged", json!(plugged));
                (previous, state.snapshot().clone())
            };
            self.diffuse_state(&previous, &current)
        }
    }

    impl FieldSource for Battery {
        fn field_value(&self, name: &str) -> Value {
            self.state.lock().unwrap().field_value(name)
        }
    }

    impl Subject for Battery {
        fn observable(&self) -> &Observable {
            &self.observable
        }
    }

    fn recorder() -> (Handler, Arc<Mutex<Vec<(Value, Value)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let handler = Handler::new(move |previous, current| {
            sink.lock().unwrap().push((previous.clone(), current.clone()));
            Ok(())
        });
        (handler, calls)
    }

    #[test]
    fn declared_elements_are_observable() {
        let observable = battery_observable();
        assert!(observable.has_observable_elements());
        assert!(observable.is_observable(&WatchSpec::from("voltage")));
        assert!(observable.is_observable(&WatchSpec::from("plugged")));
        assert!(!observable.is_observable(&WatchSpec::from("capacity")));
    }

    #[test]
    fn register_and_unregister_observable() {
        let mut observable = Observable::new();
        assert!(!observable.has_observable_elements());

        observable.register_observable("voltage").unwrap();
        assert!(observable.is_observable(&WatchSpec::from("voltage")));

        observable.unregister_observable("voltage");
        assert!(!observable.is_observable(&WatchSpec::from("voltage")));
    }

    #[test]
    fn observers_are_listed_in_insertion_order() {
        let mut observable = battery_observable();
        let (handler, _) = recorder();
        observable.observe_field("voltage", handler.clone()).unwrap();
        observable.observe_field(["voltage", "level"], handler.clone()).unwrap();
        observable.observe_state(handler.clone()).unwrap();

        let watched: Vec<&WatchSpec> = observable.list_observers().iter().map(Registration::watch).collect();
        assert_eq!(
            watched,
            vec![
                &WatchSpec::from("voltage"),
                &WatchSpec::from(["voltage", "level"]),
                &WatchSpec::Wildcard,
            ]
        );
        // listing is idempotent
        assert_eq!(observable.list_observers(), observable.list_observers());
        assert_eq!(
            observable.counts(),
            ObserverCounts { wildcard: 1, single_field: 1, field_list: 1 }
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut observable = battery_observable();
        let (handler, _) = recorder();
        let err = observable.observe_field("capacity", handler).unwrap_err();
        assert!(matches!(err, ObservaError::UnknownField(name) if name == "capacity"));
        assert!(!observable.has_observers());
    }

    #[test]
    fn field_observer_receives_values() {
        let mut observable = battery_observable();
        let (handler, calls) = recorder();
        observable.observe_field("voltage", handler).unwrap();
        let battery = Battery::new(observable);

        battery.set("voltage", json!(3392)).unwrap();
        assert_eq!(calls.lock().unwrap().clone(), vec![(json!(0), json!(3392))]);
    }

    #[test]
    fn decorator_style_registration() {
        let mut observable = battery_observable();
        let calls: Arc<Mutex<Vec<(Value, Value)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let handler = observable
            .observer("*")
            .call(&mut observable, move |previous, current| {
                sink.lock().unwrap().push((previous.clone(), current.clone()));
                Ok(())
            })
            .unwrap();
        assert!(observable.list_observers()[0].is(&WatchSpec::Wildcard, &handler));

        let battery = Battery::new(observable);
        battery.set("voltage", json!(3392)).unwrap();
        assert_eq!(
            calls.lock().unwrap().clone(),
            vec![(
                json!({"voltage": 0, "level": 0.0, "plugged": false}),
                json!({"voltage": 3392, "level": 0.0, "plugged": false}),
            )]
        );
    }

    #[test]
    fn unobserve_then_no_delivery() {
        let mut observable = battery_observable();
        let (handler, calls) = recorder();
        observable.observe_field("voltage", handler.clone()).unwrap();
        assert!(observable.unobserve("voltage", &handler));
        assert!(!observable.unobserve("voltage", &handler));
        assert!(!observable.has_observers());

        let battery = Battery::new(observable);
        battery.set("voltage", json!(1)).unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unobserve_all_clears_observers() {
        let mut observable = battery_observable();
        let (handler, _) = recorder();
        observable.observe_field("voltage", handler.clone()).unwrap();
        observable.observe_state(handler).unwrap();

        observable.unobserve_all();
        assert!(!observable.has_observers());
    }

    #[test]
    fn bulk_update_diffuses_state() {
        let mut observable = battery_observable();
        let (voltage, voltage_calls) = recorder();
        let (elements, elements_calls) = recorder();
        observable.observe_field("voltage", voltage).unwrap();
        observable.observe_field(["voltage", "level"], elements).unwrap();
        let battery = Battery::new(observable);

        assert_eq!(battery.update(3392, false).unwrap(), 2);
        assert_eq!(voltage_calls.lock().unwrap().clone(), vec![(json!(0), json!(3392))]);
        assert_eq!(
            elements_calls.lock().unwrap().clone(),
            vec![(
                json!({"voltage": 0, "level": 0.0}),
                json!({"voltage": 3392, "level": 0.6784}),
            )]
        );
    }

    #[test]
    fn unregistered_element_keeps_existing_observers() {
        let mut observable = battery_observable();
        let (list, list_calls) = recorder();
        let (state, state_calls) = recorder();
        observable.observe_field(["voltage", "level"], list).unwrap();
        observable.observe_state(state).unwrap();
        observable.unregister_observable("level");
        let battery = Battery::new(observable);

        assert_eq!(battery.set("voltage", json!(3392)).unwrap(), 2);
        assert_eq!(
            list_calls.lock().unwrap().clone(),
            vec![(
                json!({"voltage": 0, "level": 0.0}),
                json!({"voltage": 3392, "level": 0.0}),
            )]
        );
        assert_eq!(
            state_calls.lock().unwrap().clone(),
            vec![(
                json!({"voltage": 0, "plugged": false}),
                json!({"voltage": 3392, "plugged": false}),
            )]
        );

        let err = battery.set("level", json!(0.5)).unwrap_err();
        assert!(matches!(err, ObservaError::NotObservable(name) if name == "level"));
        assert_eq!(list_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn reentrant_notify_fails_fast() {
        let slot: Arc<OnceLock<Weak<Battery>>> = Arc::new(OnceLock::new());
        let nested: Arc<Mutex<Option<Result<usize>>>> = Arc::new(Mutex::new(None));

        let mut observable = battery_observable();
        let (slot_in, nested_in) = (slot.clone(), nested.clone());
        observable
            .observe_field(
                "voltage",
                Handler::new(move |_, _| {
                    if let Some(battery) = slot_in.get().and_then(Weak::upgrade) {
                        let result = battery.set("level", json!(1.0));
                        *nested_in.lock().unwrap() = Some(result);
                    }
                    Ok(())
                }),
            )
            .unwrap();
        let battery = Arc::new(Battery::new(observable));
        slot.set(Arc::downgrade(&battery)).unwrap();

        assert_eq!(battery.set("voltage", json!(3392)).unwrap(), 1);
        let nested = nested.lock().unwrap().take();
        assert!(matches!(nested, Some(Err(ObservaError::Reentrant(field))) if field == "level"));

        // the guard is released once the outer dispatch returns
        assert_eq!(battery.set("level", json!(0.5)).unwrap(), 0);
    }

    #[test]
    fn guard_is_released_after_handler_error() {
        let mut observable = battery_observable();
        observable
            .observe_field("voltage", Handler::new(|_, _| Err(HandlerError::new("boom"))))
            .unwrap();
        let battery = Battery::new(observable);

        assert!(matches!(
            battery.set("voltage", json!(1)),
            Err(ObservaError::Handler { .. })
        ));
        assert!(matches!(
            battery.set("voltage", json!(2)),
            Err(ObservaError::Handler { .. })
        ));
    }
}
