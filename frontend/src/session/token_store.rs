//! Persistence backend for session slots.
//!
//! Values are opaque strings. The browser implementation is
//! [`crate::web::LocalStorage`]; [`MemoryTokenStore`] backs tests and any
//! host-side use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub trait TokenStore {
    fn get(&self, name: &str) -> Option<String>;

    /// Returns `false` if the backend refused the write (quota, privacy mode).
    fn set(&self, name: &str, value: &str) -> bool;

    fn remove(&self, name: &str);

    /// Drop every slot in the store, not just the session ones.
    fn clear(&self);
}

/// In-memory store. Clones share the same slots, which is how tests model two
/// tabs of one origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn set(&self, name: &str, value: &str) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
        true
    }

    fn remove(&self, name: &str) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_shared_between_clones() {
        let tab_a = MemoryTokenStore::new();
        let tab_b = tab_a.clone();

        assert!(tab_a.set("access", "t1"));
        assert_eq!(tab_b.get("access").as_deref(), Some("t1"));

        tab_b.remove("access");
        assert_eq!(tab_a.get("access"), None);

        tab_a.set("x", "1");
        tab_a.set("y", "2");
        tab_b.clear();
        assert!(tab_a.is_empty());
    }
}
