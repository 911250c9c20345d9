//! Cadence configuration.
//!
//! Loaded from `~/.cadence/config.toml`. A missing file means defaults.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reminder::NotificationPermission;
use crate::storage::Storage;

/// Cadence configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Where `cadence.sqlite` lives. Defaults to `~/.cadence/`.
    pub data_dir: Option<PathBuf>,

    /// Default tracing filter when `CADENCE_LOG` is unset.
    pub log_level: Option<String>,

    /// Whether reminders may be delivered. Only `granted` arms them.
    pub notifications: NotificationPermission,
}

impl Config {
    /// Load config from `~/.cadence/config.toml`.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::parse(
            &fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        )
        .map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The config file path: `~/.cadence/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Storage::default_data_dir().map(|d| d.join("config.toml"))
    }

    /// The configured data directory, or the default one.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Storage::default_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.notifications, NotificationPermission::Default);
    }

    #[test]
    fn parses_kebab_case_keys() {
        let config = Config::parse(
            r#"
            data-dir = "/tmp/cadence"
            log-level = "cadence=debug"
            notifications = "granted"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/cadence")));
        assert_eq!(config.log_level.as_deref(), Some("cadence=debug"));
        assert_eq!(config.notifications, NotificationPermission::Granted);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/cadence")));
    }

    #[test]
    fn rejects_unknown_permission() {
        assert!(Config::parse(r#"notifications = "maybe""#).is_err());
    }
}
