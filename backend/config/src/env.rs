//! Environment handling for config values.
//!
//! Two mechanisms: `${VAR}` references inside string leaves of the YAML
//! (only `[A-Z_][A-Z0-9_]*` names; `$${VAR}` stays literal), and a fixed set
//! of `QUIZPILOT_*` variables that override individual fields.

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{LoggingConfig, QuizPilotConfig, TimingConfig};

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for unset env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }
    let mut missing: Option<MissingEnvVarError> = None;
    let out = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let whole = &caps[0];
        let name = &caps[1];
        if let Some(escaped) = whole.strip_prefix('$').filter(|rest| rest.starts_with('$')) {
            return escaped.to_string();
        }
        match env.get(name) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });
    if let Some(err) = missing {
        bail!(err);
    }
    Ok(out.into_owned())
}

fn override_ms(field: &mut Option<u64>, env: &HashMap<String, String>, var: &str) {
    let Some(raw) = env.get(var) else { return };
    match raw.trim().parse::<u64>() {
        Ok(ms) => {
            debug!(var, ms, "Applying timing override");
            *field = Some(ms);
        }
        Err(_) => warn!(var, value = %raw, "Ignoring non-numeric override"),
    }
}

/// Apply `QUIZPILOT_*` overrides on top of a parsed config.
pub fn apply_env_overrides(mut config: QuizPilotConfig, env: &HashMap<String, String>) -> QuizPilotConfig {
    if [
        "QUIZPILOT_POLL_INTERVAL_MS",
        "QUIZPILOT_START_DELAY_MS",
        "QUIZPILOT_SETTLE_MS",
        "QUIZPILOT_RESUBMIT_SETTLE_MS",
        "QUIZPILOT_REVEAL_TIMEOUT_MS",
        "QUIZPILOT_REVEAL_GRACE_MS",
    ]
    .iter()
    .any(|var| env.contains_key(*var))
    {
        let timing = config.timing.get_or_insert_with(TimingConfig::default);
        override_ms(&mut timing.poll_interval_ms, env, "QUIZPILOT_POLL_INTERVAL_MS");
        override_ms(&mut timing.start_delay_ms, env, "QUIZPILOT_START_DELAY_MS");
        override_ms(&mut timing.settle_ms, env, "QUIZPILOT_SETTLE_MS");
        override_ms(&mut timing.resubmit_settle_ms, env, "QUIZPILOT_RESUBMIT_SETTLE_MS");
        override_ms(&mut timing.reveal_timeout_ms, env, "QUIZPILOT_REVEAL_TIMEOUT_MS");
        override_ms(&mut timing.reveal_grace_ms, env, "QUIZPILOT_REVEAL_GRACE_MS");
    }
    if let Some(level) = env.get("QUIZPILOT_LOG_LEVEL").filter(|l| !l.is_empty()) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.clone());
    }
    if let Some(dir) = env.get("QUIZPILOT_LOG_DIR").filter(|d| !d.is_empty()) {
        config.logging.get_or_insert_with(LoggingConfig::default).directory = Some(dir.clone());
    }
    config
}
