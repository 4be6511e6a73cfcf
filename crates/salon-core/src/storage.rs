//! Durable local document storage seam.
//!
//! Business logic never touches the platform store directly; it goes
//! through [`DocumentStore`], an injected collaborator that reads and
//! rewrites whole named documents. Typed JSON codecs live here so every
//! caller serializes the same way.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Document key for the bounded chat history list.
pub const CHAT_HISTORY_DOC: &str = "chat_history";

/// Document key for the project collection (non-authenticated fallback tier).
pub const PROJECTS_DOC: &str = "projects";

/// A durable key-value store holding whole serialized documents.
///
/// Each document is read once at startup and rewritten wholesale on every
/// mutation. Implementations map keys to platform storage (a JSON file per
/// key, a browser storage entry, an in-memory map for tests).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the raw document for `key`; `None` if it was never written.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the document for `key`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Loads and decodes a JSON document, `None` if absent.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Option<T>> {
    match store.read(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes and writes a JSON document.
pub async fn save_json<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.write(key, &raw).await
}
