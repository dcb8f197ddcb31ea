//! Configuration file loading with precedence handling.

use crate::config::EngineConfig;
use crate::state::IconSettings;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "CONVWIN_CONFIG";

/// Environment variable overriding the placement policy.
pub const ENV_PLACEMENT: &str = "CONVWIN_PLACEMENT";

/// Environment variable overriding `close_immediately`.
pub const ENV_CLOSE_IMMEDIATELY: &str = "CONVWIN_CLOSE_IMMEDIATELY";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/convwin/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Destroy direct conversations on close instead of parking them.
    #[serde(default)]
    pub close_immediately: Option<bool>,

    /// Seconds a parked conversation lingers before it is destroyed.
    #[serde(default)]
    pub close_timeout_seconds: Option<u64>,

    /// Animate multi-frame buddy icons.
    #[serde(default)]
    pub animate_icons: Option<bool>,

    /// Backlog records injected per idle turn.
    #[serde(default)]
    pub min_backlog_replay_batch: Option<usize>,

    /// Requested buddy icon display size.
    #[serde(default)]
    pub icon_size: Option<u32>,

    /// Smallest buddy icon display size.
    #[serde(default)]
    pub icon_size_min: Option<u32>,

    /// Largest buddy icon display size.
    #[serde(default)]
    pub icon_size_max: Option<u32>,

    /// Name of the placement policy.
    #[serde(default)]
    pub placement: Option<String>,

    /// Tab limit of the `number` placement policy.
    #[serde(default)]
    pub conversations_per_window: Option<usize>,

    /// Half-size in pixels of the drag deadzone.
    #[serde(default)]
    pub drag_deadzone: Option<u32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Destroy direct conversations on close.
    pub close_immediately: bool,
    /// Linger time of parked conversations, in seconds.
    pub close_timeout_seconds: u64,
    /// Animate buddy icons.
    pub animate_icons: bool,
    /// Backlog records per idle turn.
    pub min_backlog_replay_batch: usize,
    /// Requested icon size.
    pub icon_size: u32,
    /// Icon size lower bound.
    pub icon_size_min: u32,
    /// Icon size upper bound.
    pub icon_size_max: u32,
    /// Placement policy name.
    pub placement: String,
    /// `number` policy capacity.
    pub conversations_per_window: usize,
    /// Drag deadzone half-size.
    pub drag_deadzone: u32,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            close_immediately: engine.close_immediately,
            close_timeout_seconds: engine.close_timeout.as_secs(),
            animate_icons: engine.animate_icons,
            min_backlog_replay_batch: engine.replay_batch,
            icon_size: engine.icons.size,
            icon_size_min: engine.icons.min,
            icon_size_max: engine.icons.max,
            placement: engine.placement,
            conversations_per_window: engine.conversations_per_window,
            drag_deadzone: engine.drag_deadzone,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            close_immediately: self.close_immediately,
            close_timeout: Duration::from_secs(self.close_timeout_seconds),
            animate_icons: self.animate_icons,
            replay_batch: self.min_backlog_replay_batch.max(1),
            icons: IconSettings {
                size: self.icon_size,
                min: self.icon_size_min,
                max: self.icon_size_max,
            },
            placement: self.placement.clone(),
            conversations_per_window: self.conversations_per_window.max(1),
            drag_deadzone: self.drag_deadzone,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/convwin/convwin.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("convwin").join("convwin.log")
    } else {
        PathBuf::from("convwin.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/convwin/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("convwin").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CONVWIN_CONFIG` environment variable
/// 3. Default path `~/.config/convwin/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CONVWIN_PLACEMENT`: Override placement policy name
/// - `CONVWIN_CLOSE_IMMEDIATELY`: Override `close_immediately` (`1`/`0`,
///   `true`/`false`, `yes`/`no`, `on`/`off`; anything else is ignored)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(placement) = std::env::var(ENV_PLACEMENT) {
        config.placement = placement;
    }

    if let Ok(raw) = std::env::var(ENV_CLOSE_IMMEDIATELY) {
        match parse_bool(&raw) {
            Some(value) => config.close_immediately = value,
            None => tracing::warn!(value = %raw, "Ignoring invalid CONVWIN_CLOSE_IMMEDIATELY"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        close_immediately: config
            .close_immediately
            .unwrap_or(defaults.close_immediately),
        close_timeout_seconds: config
            .close_timeout_seconds
            .unwrap_or(defaults.close_timeout_seconds),
        animate_icons: config.animate_icons.unwrap_or(defaults.animate_icons),
        min_backlog_replay_batch: config
            .min_backlog_replay_batch
            .unwrap_or(defaults.min_backlog_replay_batch),
        icon_size: config.icon_size.unwrap_or(defaults.icon_size),
        icon_size_min: config.icon_size_min.unwrap_or(defaults.icon_size_min),
        icon_size_max: config.icon_size_max.unwrap_or(defaults.icon_size_max),
        placement: config.placement.unwrap_or(defaults.placement),
        conversations_per_window: config
            .conversations_per_window
            .unwrap_or(defaults.conversations_per_window),
        drag_deadzone: config.drag_deadzone.unwrap_or(defaults.drag_deadzone),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    placement_override: Option<String>,
    close_immediately_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(placement) = placement_override {
        config.placement = placement;
    }

    if let Some(close_immediately) = close_immediately_override {
        config.close_immediately = close_immediately;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
