//! Filesystem-backed document store.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use salon_core::error::{Result, SalonError};
use salon_core::storage::DocumentStore;

/// Stores each document as one JSON file under a base directory.
///
/// Documents are read once at startup and rewritten wholesale on every
/// mutation, so the on-disk layout stays trivially inspectable:
///
/// ```text
/// base_dir/
/// ├── chat_history.json
/// └── projects.json
/// ```
pub struct JsonDocumentStore {
    base_dir: PathBuf,
}

impl JsonDocumentStore {
    /// Creates a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|err| {
            SalonError::storage(format!(
                "failed to create document directory {}: {err}",
                base_dir.display()
            ))
        })?;
        Ok(Self { base_dir })
    }

    /// Creates a store at the default location (`~/.config/salon/documents`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let dir = crate::paths::SalonPaths::documents_dir()
            .map_err(|err| SalonError::storage(err.to_string()))?;
        Self::new(dir)
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| SalonError::storage(format!("failed to read {}: {err}", path.display())))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.document_path(key);
        fs::write(&path, value).map_err(|err| {
            SalonError::storage(format!("failed to write {}: {err}", path.display()))
        })
    }
}
