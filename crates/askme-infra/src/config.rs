//! Client configuration loader for askme.
//!
//! Reads `config.toml` from the askme home directory (`~/.askme/` unless
//! `ASKME_HOME` is set) and deserializes it into [`ClientConfig`]. Falls back
//! to defaults when the file is missing or malformed.
//!
//! Precedence, lowest to highest: built-in defaults, `config.toml`,
//! environment, command-line flags. The last two arrive together as
//! [`ConfigOverrides`] because clap reads `ASKME_*` variables for its flags.

use std::path::{Path, PathBuf};

use askme_types::config::ClientConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the askme home directory.
///
/// Priority: `ASKME_HOME`, then `~/.askme`, then `./.askme`.
pub fn resolve_home_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ASKME_HOME") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".askme");
    }

    PathBuf::from(".askme")
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    resolve_home_dir().join(CONFIG_FILE_NAME)
}

/// Load client configuration from `path`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_client_config(path: &Path) -> ClientConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ClientConfig::default()
        }
    }
}

/// Values supplied through the environment or command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Apply overrides on top of a loaded config. Blank values are ignored.
pub fn apply_overrides(mut config: ClientConfig, overrides: ConfigOverrides) -> ClientConfig {
    if let Some(base_url) = non_blank(overrides.base_url) {
        config.base_url = base_url;
    }
    if let Some(api_key) = non_blank(overrides.api_key) {
        config.api_key = Some(api_key);
    }
    config
}

/// Load `path` (or the default location) and apply `overrides`.
pub async fn resolve_client_config(path: Option<&Path>, overrides: ConfigOverrides) -> ClientConfig {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    let config = load_client_config(&path).await;
    let config = apply_overrides(config, overrides);
    tracing::debug!(config = ?config, "client config resolved");
    config
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
