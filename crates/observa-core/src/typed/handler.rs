//! TypedHandler - `ChangeHandler<T>` を `Handler` に変換する
//!
//! # 学習ポイント
//! - ジェネリック trait (ChangeHandler<T>)
//! - Type erasure パターン (TypedHandler<T, H> → Handler)

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::domain::{Handler, HandlerError};

/// Receives decoded `(previous, current)` values.
///
/// For a single-field observer `T` is the field type; for field-list and
/// wildcard observers `T` is usually a struct with one member per field.
pub trait ChangeHandler<T>: Send + Sync {
    fn handle(&self, previous: T, current: T) -> Result<(), HandlerError>;
}

impl<T, F> ChangeHandler<T> for F
where
    F: Fn(T, T) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, previous: T, current: T) -> Result<(), HandlerError> {
        self(previous, current)
    }
}

pub struct TypedHandler<T, H> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T, H> TypedHandler<T, H>
where
    T: DeserializeOwned + 'static,
    H: ChangeHandler<T> + 'static,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }

    /// Erase the type. Decode failures surface as `HandlerError`.
    pub fn into_handler(self) -> Handler {
        Handler::new(move |previous, current| {
            let previous: T = serde_json::from_value(previous.clone())?;
            let current: T = serde_json::from_value(current.clone())?;
            self.handler.handle(previous, current)
        })
    }
}

/// Shorthand for `TypedHandler::new(f).into_handler()`.
pub fn typed<T, F>(f: F) -> Handler
where
    T: DeserializeOwned + 'static,
    F: Fn(T, T) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    TypedHandler::new(f).into_handler()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct BatteryView {
        voltage: u32,
        level: f64,
    }

    #[test]
    fn decodes_scalar_values() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let handler = typed(move |previous: u32, current: u32| {
            *sink.lock().unwrap() = Some((previous, current));
            Ok(())
        });

        handler.call(&json!(0), &json!(3392)).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((0, 3392)));
    }

    #[test]
    fn decodes_snapshots_into_structs() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = TypedHandler::<BatteryView, _>::new(move |previous: BatteryView, current: BatteryView| {
            sink.lock().unwrap().push((previous, current));
            Ok(())
        })
        .into_handler();

        handler
            .call(
                &json!({"voltage": 0, "level": 0.0}),
                &json!({"voltage": 3392, "level": 0.6784}),
            )
            .unwrap();
        assert_eq!(
            seen.lock().unwrap().clone(),
            vec![(
                BatteryView { voltage: 0, level: 0.0 },
                BatteryView { voltage: 3392, level: 0.6784 },
            )]
        );
    }

    #[test]
    fn decode_failure_is_a_handler_error() {
        let handler = typed(|_: u32, _: u32| Ok(()));
        let err = handler.call(&json!("zero"), &json!(1)).unwrap_err();
        assert!(err.message().starts_with("json decode"));
    }
}
