//! Drill configuration.
//!
//! The command line only names the session, so everything else comes from a
//! TOML file and a few environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DrillError;
use crate::model::WORKING_SET_SIZE;

/// Top-level drillset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Number of questions drilled at once.
    #[serde(default = "default_working_set_size")]
    pub working_set_size: usize,
    /// Directory holding `<session>.json` records.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Echo every diagnostic line to the console.
    #[serde(default)]
    pub echo_log: bool,
    /// Seed for the random generator; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// TOML question bank used when a new session is created.
    #[serde(default)]
    pub bank_file: Option<PathBuf>,
    /// Target time a new session starts with, in seconds.
    #[serde(default)]
    pub initial_target_time: Option<f64>,
}

fn default_working_set_size() -> usize {
    WORKING_SET_SIZE
}
fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            working_set_size: default_working_set_size(),
            state_dir: default_state_dir(),
            echo_log: false,
            seed: None,
            bank_file: None,
            initial_target_time: None,
        }
    }
}

impl DrillConfig {
    /// Reject values the drill loop cannot work with.
    pub fn validate(&self) -> Result<(), DrillError> {
        if self.working_set_size == 0 {
            return Err(DrillError::InvalidConfig(
                "working_set_size must be at least 1".into(),
            ));
        }
        if let Some(t) = self.initial_target_time {
            if !t.is_finite() || t <= 0.0 {
                return Err(DrillError::InvalidConfig(format!(
                    "initial_target_time must be a positive number of seconds, got {t}"
                )));
            }
        }
        Ok(())
    }

    /// Path of the persisted record for a session.
    pub fn session_path(&self, session: &str) -> PathBuf {
        self.state_dir.join(format!("{session}.json"))
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `drillset.toml` in the current directory
/// 2. `~/.config/drillset/config.toml`
///
/// Environment variable overrides: `DRILLSET_STATE_DIR`, `DRILLSET_SEED`,
/// `DRILLSET_ECHO_LOG`.
pub fn load_config() -> Result<DrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("drillset.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DrillConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut DrillConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(dir) = var("DRILLSET_STATE_DIR") {
        config.state_dir = PathBuf::from(dir);
    }
    if let Some(seed) = var("DRILLSET_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid DRILLSET_SEED: '{seed}'"))?;
        config.seed = Some(seed);
    }
    if let Some(echo) = var("DRILLSET_ECHO_LOG") {
        config.echo_log = matches!(echo.trim(), "1" | "true" | "yes" | "on");
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("drillset"))
}
