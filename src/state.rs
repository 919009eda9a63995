use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

const STATE_FILE: &str = "state.yml";
const MAX_RECENT_REPOS: usize = 20;

/// State persisted between sessions, stored next to the user config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub last_version: String,
    /// Most recent first.
    pub recent_repos: Vec<PathBuf>,
}

impl AppState {
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(STATE_FILE)
    }

    /// Missing or empty state files yield the default state.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(config_dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path(config_dir);
        let content = serde_yaml::to_string(self).map_err(ConfigError::Invalid)?;
        fs::write(&path, content).map_err(|source| ConfigError::Write { path, source })
    }

    /// Move `repo` to the front of the recent list.
    pub fn record_repo(&mut self, repo: &Path) {
        self.recent_repos.retain(|r| r != repo);
        self.recent_repos.insert(0, repo.to_path_buf());
        self.recent_repos.truncate(MAX_RECENT_REPOS);
    }

    /// The most recent repository that still exists on disk.
    pub fn most_recent_repo(&self) -> Option<&Path> {
        self.recent_repos
            .iter()
            .map(PathBuf::as_path)
            .find(|repo| repo.is_dir())
    }
}
