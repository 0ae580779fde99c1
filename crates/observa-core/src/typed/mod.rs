//! Typed - 型付き observer API
//!
//! Handlers on the engine side see `serde_json::Value`. This module lets a
//! caller write the handler against its own types and decodes the values
//! with serde before the call.
//!
//! # 二層構造
//! - **表層（Typed）**: `ChangeHandler<T>` - 型安全
//! - **内部（Dyn）**: `Handler` - `Arc<dyn Fn(&Value, &Value)>`

pub mod handler;

pub use self::handler::{typed, ChangeHandler, TypedHandler};
