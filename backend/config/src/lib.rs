//! `quizpilot-config`: QuizPilot runtime configuration.
//!
//! Provides:
//! - Typed config schema (timings, heuristics, storage keys, logging)
//! - YAML read/write with backup rotation
//! - `${ENV_VAR}` substitution and `QUIZPILOT_*` overrides
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, load_raw_config, write_config};
pub use schema::{LoggingConfig, QuizPilotConfig, StorageConfig, TimingConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// problems are logged; callers that must refuse an invalid config call
/// [`validate`] themselves.
pub async fn load_and_prepare(path: &Path) -> Result<QuizPilotConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare_with(path, &env).await
}

/// [`load_and_prepare`] against an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<QuizPilotConfig> {
    let value = load_raw_config(path).await?;

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: QuizPilotConfig = serde_json::from_value(value)
        .with_context(|| format!("Config at {} does not match the schema", path.display()))?;

    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pipeline_substitutes_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "logging:\n  directory: \"${QP_LOGS}/quiz\"\nheuristics:\n  placeholder: Fine\n",
        )
        .unwrap();
        let env = HashMap::from([
            ("QP_LOGS".to_string(), "/var/log".to_string()),
            ("QUIZPILOT_SETTLE_MS".to_string(), "80".to_string()),
        ]);

        let cfg = load_and_prepare_with(&path, &env).await.unwrap();
        assert_eq!(cfg.logging().directory.as_deref(), Some("/var/log/quiz"));
        assert_eq!(cfg.logging().level(), "info");
        assert_eq!(cfg.heuristics().placeholder, "Fine");
        assert_eq!(cfg.heuristics().snapshot_chars, 240);
        assert_eq!(cfg.timing().settle_ms, Some(80));
        assert_eq!(cfg.timing().poll_interval_ms, Some(300));
    }

    #[tokio::test]
    async fn unset_variable_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "storage:\n  runKey: \"${QP_UNSET}\"\n").unwrap();
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("QP_UNSET"));
    }
}
