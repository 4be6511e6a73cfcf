//! Client configuration.
//!
//! Reads `~/.config/salon/config.toml` when present; the `SALON_API_URL`
//! environment variable overrides the configured base URL.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default backend endpoint for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Profile saves are aborted after this many seconds.
pub const DEFAULT_PROFILE_SAVE_TIMEOUT_SECS: u64 = 10;

/// Settings for [`crate::CatalogClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub profile_save_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile_save_timeout: Duration::from_secs(DEFAULT_PROFILE_SAVE_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    api: ApiSection,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    profile_save_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Loads configuration, tolerating a missing or malformed file.
    ///
    /// Resolution order: defaults, then `config.toml`, then the
    /// `SALON_API_URL` environment variable.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(path) = config_file_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match parse(&content) {
                    Ok(file_config) => config.apply(file_config),
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            path = %path.display(),
                            "ignoring malformed config file"
                        );
                    }
                }
            }
        }

        if let Ok(url) = std::env::var("SALON_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        config
    }

    fn apply(&mut self, file: FileConfig) {
        if let Some(base_url) = file.api.base_url {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = file.api.profile_save_timeout_secs {
            self.profile_save_timeout = Duration::from_secs(secs);
        }
    }
}

fn parse(content: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Returns the path to the configuration file: ~/.config/salon/config.toml
fn config_file_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("salon").join("config.toml"))
}
