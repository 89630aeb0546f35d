//! CLI-side configuration in `~/.plan-collab/config.json`: where the server
//! listens and which plan the terminal last pushed.

use crate::error::Result;
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub active_plan: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Config {
    /// Load from the default location; a missing or unreadable file is an
    /// empty config.
    pub fn load() -> Self {
        match paths::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        let path = paths::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        io::atomic_write(path, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert!(config.port.is_none());
        assert!(config.active_plan.is_none());
    }

    #[test]
    fn round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            port: Some(3456),
            active_plan: Some("/tmp/p.md".into()),
            last_sync: Some(Utc::now()),
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        assert_eq!(loaded.port, Some(3456));
        assert_eq!(loaded.active_plan.as_deref(), Some("/tmp/p.md"));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"port": 9000, "autoOpen": true}"#).unwrap();
        let loaded = Config::load_from(&path);
        assert_eq!(loaded.port, Some(9000));
    }
}
