use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Statistics context owned by the caller of a scan.
///
/// Iterators get a handle through their options and write into it without
/// synchronization; a context must not be shared by iterators running on
/// different threads, which the `Rc` handle enforces.
pub type SharedStatistics = Rc<RefCell<ReaderStatistics>>;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReaderStatistics {
    /// absolute column path -> times write-time flattened sub-columns were used
    pub flat_json_hits: IndexMap<String, u64>,
    /// absolute column path -> times raw json was flattened while reading
    pub dynamic_json_hits: IndexMap<String, u64>,
    /// time spent in the json flattener
    pub json_flatten_ns: u64,
}

impl ReaderStatistics {
    pub fn shared() -> SharedStatistics {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn record_flat_json_hit(&mut self, path: &str) {
        *self.flat_json_hits.entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn record_dynamic_json_hit(&mut self, path: &str) {
        *self.dynamic_json_hits.entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn flat_json_hit_count(&self, path: &str) -> u64 {
        self.flat_json_hits.get(path).copied().unwrap_or(0)
    }

    pub fn dynamic_json_hit_count(&self, path: &str) -> u64 {
        self.dynamic_json_hits.get(path).copied().unwrap_or(0)
    }

    /// Diagnostics dump.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
