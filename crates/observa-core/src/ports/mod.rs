//! Ports - subject 側との境界
//!
//! The surrounding host object implements these traits; the engine only
//! calls into them.

pub mod field_source;

pub use self::field_source::FieldSource;
