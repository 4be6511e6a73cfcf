//! Unified path management for salon data files.
//!
//! All configuration and persisted documents live under the platform
//! config directory:
//!
//! ```text
//! ~/.config/salon/
//! ├── config.toml        # Backend endpoint configuration
//! └── documents/         # Persisted JSON documents
//!     ├── chat_history.json
//!     └── projects.json
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for salon.
pub struct SalonPaths;

impl SalonPaths {
    /// Returns the salon configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/salon/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join("salon"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding persisted JSON documents.
    pub fn documents_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("documents"))
    }
}
