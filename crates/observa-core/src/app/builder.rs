//! ObservableBuilder - Observable の構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use crate::domain::{Handler, WatchSpec};
use crate::error::Result;
use crate::observable::Observable;

use super::config::{HandlerTable, ObservableConfig};

/// ObservableBuilder は Observable を構築
///
/// # 使用例
/// ```ignore
/// let observable = ObservableBuilder::new()
///     .elements(["voltage", "level", "plugged"])
///     .observe(["voltage", "level"], handler)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - elements are added first, in declaration order, then observers
/// - the first invalid element or observer aborts `build()`
#[derive(Debug, Default)]
pub struct ObservableBuilder {
    elements: Vec<String>,
    observers: Vec<(WatchSpec, Handler)>,
}

impl ObservableBuilder {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn element(mut self, name: impl Into<String>) -> Self {
        self.elements.push(name.into());
        self
    }

    pub fn elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn observe(mut self, watch: impl Into<WatchSpec>, handler: Handler) -> Self {
        self.observers.push((watch.into(), handler));
        self
    }

    /// Apply a declarative config.
    ///
    /// Watch specs are classified and handler names resolved here, so an
    /// invalid spec or an unknown handler fails before `build()`.
    pub fn with_config(mut self, config: &ObservableConfig, table: &HandlerTable) -> Result<Self> {
        self.elements.extend(config.elements.iter().cloned());
        for observer in &config.observers {
            self.observers.push(observer.resolve(table)?);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Observable> {
        let mut observable = Observable::with_elements(self.elements)?;
        for (watch, handler) in self.observers {
            observable.observe_field(watch, handler)?;
        }
        tracing::debug!(
            elements = observable.observable_elements().len(),
            observers = observable.list_observers().len(),
            "observable built"
        );
        Ok(observable)
    }
}
