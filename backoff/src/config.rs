use crate::counter::validate;
use crate::error::ConfigError;
use crate::util::{parse_duration, serde_duration};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_CONFIG: &str = "BACKOFF_CONFIG";
pub const ENV_MIN: &str = "BACKOFF_MIN";
pub const ENV_MAX: &str = "BACKOFF_MAX";
pub const ENV_FACTOR: &str = "BACKOFF_FACTOR";
pub const ENV_JITTER: &str = "BACKOFF_JITTER";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffConfig {
    #[serde(with = "serde_duration")]
    pub min: Duration,
    #[serde(with = "serde_duration")]
    pub max: Duration,
    pub factor: f64,
    pub jitter: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: false,
        }
    }
}

impl BackoffConfig {
    /// Load from `BACKOFF_CONFIG` or the platform config dir; defaults if absent.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading backoff config");
        let data = fs::read_to_string(path).context("read config file")?;
        // An empty file is a valid "all defaults" config
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: BackoffConfig = serde_yaml::from_str(&data).context("parse config yaml")?;
        Ok(cfg)
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            if !p.is_empty() {
                return Some(PathBuf::from(p));
            }
        }
        // Vendorless
        ProjectDirs::from("", "", "backoff").map(|proj| proj.config_dir().join("config.yaml"))
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = read_env(ENV_MIN) {
            self.min = parse_duration(&v).map_err(|_| invalid_env(ENV_MIN, v))?;
        }
        if let Some(v) = read_env(ENV_MAX) {
            self.max = parse_duration(&v).map_err(|_| invalid_env(ENV_MAX, v))?;
        }
        if let Some(v) = read_env(ENV_FACTOR) {
            self.factor = v.trim().parse().map_err(|_| invalid_env(ENV_FACTOR, v))?;
        }
        if let Some(v) = read_env(ENV_JITTER) {
            self.jitter = parse_bool(&v).ok_or_else(|| invalid_env(ENV_JITTER, v))?;
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(min) = cli.min {
            self.min = min;
        }
        if let Some(max) = cli.max {
            self.max = max;
        }
        if let Some(factor) = cli.factor {
            self.factor = factor;
        }
        if cli.jitter {
            self.jitter = true;
        }
        if cli.no_jitter {
            self.jitter = false;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self.min, self.max, self.factor)
    }
}

fn read_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn invalid_env(var: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidEnv { var, value }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
