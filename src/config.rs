use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const CONFIG_FILE: &str = "sleep_analytics.json";

/// User settings. Every field has a default, so a partial file is fine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Days covered by `dreams analyze` and the other windowed views
    pub analysis_window_days: u32,
    /// Rows shown by the history listings
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            analysis_window_days: 30,
            history_limit: 10,
        }
    }
}

impl Config {
    /// Reads `path`, or [`CONFIG_FILE`] in the working directory when `path` is `None`.
    /// A missing file gives the defaults; an unreadable one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis_window_days, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"history_limit": 3}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config::default().with_data_dir(Some(PathBuf::from("/tmp/journal")));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/journal"));
        assert_eq!(Config::default().with_data_dir(None).data_dir, PathBuf::from("data"));
    }
}
