//! observa-core
//!
//! Observable properties for host objects: a subject declares which of its
//! fields are observable, callers register observers on one field, a list
//! of fields or every field (`"*"`), and each mutation the subject reports is
//! diffused to the matching observers with previous/current values scoped
//! to what they asked for.
//!
//! # モジュール構成
//! - **domain**: WatchSpec / WatchKind（分類）, Handler, Registration, Snapshot
//! - **registry**: ObservableRegistry（observable element の集合）
//! - **store**: ObserverStore（observer 登録の順序付きコレクション）
//! - **diffusion**: DiffusionEngine（スナップショット構築と配信）
//! - **ports**: FieldSource（subject 側のフィールド読み取り）
//! - **impls**: MapFieldSource（map ベースの subject 状態）
//! - **observable**: Observable / Subject（公開 API）
//! - **typed**: 型付き handler
//! - **app**: builder, config, status

pub mod app;
pub mod diffusion;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observable;
pub mod ports;
pub mod registry;
pub mod store;
pub mod typed;

pub use crate::app::{HandlerTable, ObservableBuilder, ObservableConfig, ObserverCounts};
pub use crate::domain::{Handler, HandlerError, Registration, Snapshot, WatchKind, WatchSpec};
pub use crate::error::{ObservaError, Result};
pub use crate::observable::{Observable, Registrar, Subject};
pub use crate::ports::FieldSource;
