use std::path::{Path, PathBuf};

use anyhow::Result;
use quizpilot_config::{config_dir, config_file_path, load_and_prepare, QuizPilotConfig};

/// Config for one CLI invocation plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: QuizPilotConfig,
}

impl LoadedConfig {
    /// `--config` if given, else `config.yaml` in the config directory.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => config_file_path(&config_dir()),
        }
    }

    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit);
        let config = load_and_prepare(&path).await?;
        Ok(Self { path, config })
    }

    /// `--log-level` wins over the file.
    pub fn log_level(&self, flag: Option<&str>) -> String {
        match flag {
            Some(level) => level.to_string(),
            None => self.config.logging().level().to_string(),
        }
    }
}
