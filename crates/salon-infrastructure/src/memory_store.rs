//! In-memory document stores for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use salon_core::error::{Result, SalonError};
use salon_core::storage::DocumentStore;

/// HashMap-backed store for exercising persistence logic without a
/// filesystem.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.docs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store whose every operation fails, for asserting that callers degrade
/// to logging instead of propagating storage errors.
pub struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn read(&self, _key: &str) -> Result<Option<String>> {
        Err(SalonError::storage("simulated quota exceeded"))
    }

    async fn write(&self, _key: &str, _value: &str) -> Result<()> {
        Err(SalonError::storage("simulated quota exceeded"))
    }
}
