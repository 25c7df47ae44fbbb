//! Config file read/write with backup rotation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::schema::QuizPilotConfig;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 3;

/// Resolve the QuizPilot config directory.
/// Priority: `QUIZPILOT_CONFIG_DIR` env > `~/.quizpilot/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QUIZPILOT_CONFIG_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".quizpilot"),
        None => PathBuf::from(".quizpilot"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped JSON value.
///
/// Returns an empty object if the file doesn't exist (first run). An empty
/// file is treated the same way.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Load and parse the config from disk without env substitution or defaults.
pub async fn load_config(path: &Path) -> Result<QuizPilotConfig> {
    let value = load_raw_config(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Config at {} does not match the schema", path.display()))
}

/// Write config to disk (temp file, then rename).
///
/// Creates a rolling backup of the previous config before overwriting.
pub async fn write_config(config: &QuizPilotConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        rotate_backups(path).await;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Rotate backup files: config.yaml.bak.1 → .bak.2 → ... → .bak.N
async fn rotate_backups(path: &Path) {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("yaml.bak.{i}"));
        let new = path.with_extension(format!("yaml.bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("yaml.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }
}
