//! Per-visitor key-value session handle.

use serde_json::Value;
use std::collections::HashMap;

/// Server-held storage for one visitor, passed explicitly into every gate
/// operation.
pub trait Session {
    /// Opaque identifier of this session.
    fn id(&self) -> &str;

    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);

    /// Read an integer field, falling back to `default` when it is absent or
    /// not an integer.
    fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
    }
}

/// Session backed by a plain map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySession {
    id: String,
    values: HashMap<String, Value>,
}

impl MemorySession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Session for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
