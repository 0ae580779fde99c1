//! FieldSource port - subject のフィールド読み取りの抽象化
//!
//! The engine never owns field values. When a snapshot is needed it asks
//! the subject for the live value of each field through this trait.

use serde_json::Value;

/// Read access to a subject's current field values.
///
/// Fields that are absent (never set, or deleted) read as `Value::Null`.
pub trait FieldSource {
    fn field_value(&self, name: &str) -> Value;
}
