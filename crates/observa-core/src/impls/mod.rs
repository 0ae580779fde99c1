//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **MapFieldSource**: 順序付き JSON map を状態として持つ subject 用

pub mod map_source;

pub use self::map_source::MapFieldSource;
