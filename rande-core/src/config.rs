//! Global configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{RandeError, RandeResult};
use crate::record::Researcher;

static DEFAULT_DATA_PATH: &str = "~/research";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

/// Global configuration at ~/.config/rande/config.toml
///
/// The data directory holds the three collection slots; researchers are
/// the people selectable as note owners; the `[remote]` table configures
/// the optional mirror.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlobalConfig {
    #[serde(default = "default_data_path")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub researchers: Vec<Researcher>,

    /// Remote mirror settings; absent means mirroring cannot be enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSettings>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            data_dir: default_data_path(),
            researchers: Vec::new(),
            remote: None,
        }
    }
}

/// Remote document store settings: which provider binary to use and the
/// provider-specific parameters passed through to it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RemoteSettings {
    pub provider: String,

    /// Whether every save also pushes to the remote store.
    #[serde(default)]
    pub enabled: bool,

    /// Provider-specific config (e.g., project id, credentials path).
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl GlobalConfig {
    pub fn config_path() -> RandeResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RandeError::Config("Could not determine config directory".into()))?
            .join("rande");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from ~/.config/rande/config.toml; a missing file yields the
    /// defaults.
    pub fn load() -> RandeResult<Self> {
        let config_path = Self::config_path()?;

        let config: GlobalConfig = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .build()
            .map_err(|e| RandeError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RandeError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Save the current config back to ~/.config/rande/config.toml
    pub fn save(&self) -> RandeResult<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RandeError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| RandeError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| RandeError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The expanded data directory path.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn researcher(&self, id: i64) -> Option<&Researcher> {
        self.researchers.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_settings_parse_from_toml() {
        let config: GlobalConfig = toml::from_str(
            r#"
            data_dir = "/tmp/research"

            [[researchers]]
            id = 1
            name = "Jane Doe"

            [remote]
            provider = "firestore"
            enabled = true

            [remote.params]
            project_id = "rande-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/research"));
        assert_eq!(config.researcher(1).unwrap().name, "Jane Doe");

        let remote = config.remote.unwrap();
        assert_eq!(remote.provider, "firestore");
        assert!(remote.enabled);
        assert_eq!(
            remote.params.get("project_id").and_then(|v| v.as_str()),
            Some("rande-test")
        );
    }

    #[test]
    fn missing_remote_table_parses_as_none() {
        let config: GlobalConfig = toml::from_str("data_dir = \"/tmp/research\"").unwrap();
        assert!(config.remote.is_none());
        assert!(config.researchers.is_empty());
    }
}
