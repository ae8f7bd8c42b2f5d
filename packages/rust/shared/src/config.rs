//! Application configuration for XmlFetch.
//!
//! User config lives at `~/.xmlfetch/xmlfetch.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XmlFetchError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "xmlfetch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".xmlfetch";

// ---------------------------------------------------------------------------
// Config structs (matching xmlfetch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Message template overrides, keyed by message identifier.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Namespace prefix used when a run does not name one.
    #[serde(default)]
    pub namespace_prefix: String,

    /// Caller-side timeout around a whole run, in seconds. 0 disables it.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl DefaultsConfig {
    /// The configured timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.xmlfetch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| XmlFetchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.xmlfetch/xmlfetch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| XmlFetchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| XmlFetchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| XmlFetchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| XmlFetchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| XmlFetchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
