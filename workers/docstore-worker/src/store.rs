//! A dead simple in-memory key/value store, grounded on the teacher's
//! in-memory chunk store: one `RwLock<HashMap<..>>` guarding plain owned
//! values, no persistence.
//!
//! Values are treated as UTF-8 strings end to end (§9 weakness #4): this
//! is an illustrative collaborator, not part of the Titanic core, which
//! only ever requires opaque frames.

use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct DocStore {
    data: RwLock<HashMap<String, String>>,
}

impl DocStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: String, value: String) {
        self.data.write().unwrap().insert(key, value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().unwrap().get(key).cloned()
    }

    /// Returns whether the key was present.
    pub fn delete(&self, key: &str) -> bool {
        self.data.write().unwrap().remove(key).is_some()
    }
}
