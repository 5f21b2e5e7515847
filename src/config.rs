//! Configuration loading and management
//!
//! Settings come from `config.toml` in the platform config directory (or an
//! explicit `--config` path), with `TASKDECK_*` environment variables taking
//! precedence. A missing file is not an error; every field has a default.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::theme::Theme;

/// Which backend implementation to compose at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Remote,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "remote" => Ok(BackendKind::Remote),
            other => Err(Error::InvalidConfig(format!(
                "unknown backend '{other}' (expected memory or remote)"
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// View-layer settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Backend selection: in-process memory store or the hosted service
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Base URL of the hosted service (remote backend)
    #[serde(default)]
    pub url: String,

    /// Public API key of the hosted service (remote backend)
    #[serde(default)]
    pub api_key: String,

    /// State file for the memory backend; unset means purely in-process
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

fn default_backend() -> BackendKind {
    BackendKind::Memory
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            api_key: String::new(),
            state_file: None,
        }
    }
}

/// View-layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme applied before any profile is loaded
    #[serde(default)]
    pub default_theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse; the default path is optional
    /// and falls back to defaults when missing. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut config = match explicit {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    Error::InvalidConfig(format!("cannot read {}: {err}", path.display()))
                })?;
                toml::from_str(&raw)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    let raw = std::fs::read_to_string(&path)?;
                    toml::from_str(&raw)?
                }
                _ => Config::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(backend) = non_empty_env("TASKDECK_BACKEND") {
            if let Ok(kind) = backend.parse() {
                self.service.backend = kind;
            }
        }
        if let Some(url) = non_empty_env("TASKDECK_URL") {
            self.service.url = url;
        }
        if let Some(api_key) = non_empty_env("TASKDECK_API_KEY") {
            self.service.api_key = api_key;
        }
        if let Some(state) = non_empty_env("TASKDECK_STATE") {
            self.service.state_file = Some(PathBuf::from(state));
        }
    }
}

/// Data directory for client-side state (the persisted session token).
///
/// Resolution order: `TASKDECK_DATA`, the platform data dir, `.taskdeck` in
/// the current directory as a last resort.
pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = non_empty_env("TASKDECK_DATA") {
        return PathBuf::from(dir);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "taskdeck") {
        return dirs.data_dir().to_path_buf();
    }

    PathBuf::from(".taskdeck")
}

/// Default location of `config.toml`, honoring `TASKDECK_CONFIG`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_env("TASKDECK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::ProjectDirs::from("", "", "taskdeck")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
