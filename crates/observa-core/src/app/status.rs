//! Status - observer の集計ビュー

use serde::{Deserialize, Serialize};

/// Registered observers by watch kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverCounts {
    pub wildcard: usize,
    pub single_field: usize,
    pub field_list: usize,
}

impl ObserverCounts {
    pub fn total(&self) -> usize {
        self.wildcard + self.single_field + self.field_list
    }
}
