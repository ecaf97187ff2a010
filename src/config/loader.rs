//! Configuration file loading with precedence handling.

use crate::reveal::Segmenter;
use crate::reveal::RevealConfig;
use crate::view_state::{ListConfig, RenderCacheConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TOKFLOW_CONFIG";
/// Environment variable overriding `reveal.min_delay_ms`.
pub const MIN_DELAY_ENV_VAR: &str = "TOKFLOW_MIN_DELAY_MS";

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

    /// A setting parsed but is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted setting name, e.g. `reveal.batch_divisor`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/tokflow/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// `[reveal]` section.
    #[serde(default)]
    pub reveal: Option<RevealSection>,

    /// `[list]` section.
    #[serde(default)]
    pub list: Option<ListSection>,

    /// `[cache]` section.
    #[serde(default)]
    pub cache: Option<RenderCacheConfig>,
}

/// Reveal pacing section from TOML.
///
/// ```toml
/// [reveal]
/// min_delay_ms = 16
/// batch_divisor = 5
/// segmentation = "graphemes"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RevealSection {
    /// Minimum delay between publishes, in milliseconds.
    #[serde(default)]
    pub min_delay_ms: Option<u64>,

    /// Divisor of the proportional batch policy.
    #[serde(default)]
    pub batch_divisor: Option<usize>,

    /// `"graphemes"` or `"codepoints"`.
    #[serde(default)]
    pub segmentation: Option<Segmenter>,
}

/// Windowed list section from TOML.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ListSection {
    /// Height assumed for unmeasured items.
    #[serde(default)]
    pub estimated_height: Option<f64>,

    /// Extra items materialized on each side of the viewport.
    #[serde(default)]
    pub buffer_count: Option<usize>,

    /// Tolerance for re-measurements.
    #[serde(default)]
    pub measure_epsilon: Option<f64>,

    /// Slack for the sticky-bottom check.
    #[serde(default)]
    pub sticky_epsilon: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Reveal scheduler pacing.
    pub reveal: RevealConfig,
    /// Windowed list tunables.
    pub list: ListConfig,
    /// Render cache sizing.
    pub cache: RenderCacheConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            list: ListConfig::default(),
            cache: RenderCacheConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Reject settings that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal.batch_divisor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reveal.batch_divisor",
                reason: "must be at least 1".to_string(),
            });
        }
        let non_negative = [
            ("list.estimated_height", self.list.estimated_height),
            ("list.measure_epsilon", self.list.measure_epsilon),
            ("list.sticky_epsilon", self.list.sticky_epsilon),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a finite, non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/tokflow/tokflow.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("tokflow").join("tokflow.log")
    } else {
        PathBuf::from("tokflow.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
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
/// Returns `~/.config/tokflow/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tokflow").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TOKFLOW_CONFIG` environment variable
/// 3. Default path `~/.config/tokflow/config.toml`
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TOKFLOW_MIN_DELAY_MS`: Override `reveal.min_delay_ms`
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(MIN_DELAY_ENV_VAR) {
        match raw.trim().parse::<u64>() {
            Ok(ms) => config.reveal.min_delay = Duration::from_millis(ms),
            Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring {}", MIN_DELAY_ENV_VAR),
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

    let reveal = config.reveal.unwrap_or_default();
    let list = config.list.unwrap_or_default();

    ResolvedConfig {
        reveal: RevealConfig {
            min_delay: reveal
                .min_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal.min_delay),
            batch_divisor: reveal.batch_divisor.unwrap_or(defaults.reveal.batch_divisor),
            segmentation: reveal.segmentation.unwrap_or(defaults.reveal.segmentation),
        },
        list: ListConfig {
            estimated_height: list
                .estimated_height
                .unwrap_or(defaults.list.estimated_height),
            buffer_count: list.buffer_count.unwrap_or(defaults.list.buffer_count),
            measure_epsilon: list.measure_epsilon.unwrap_or(defaults.list.measure_epsilon),
            sticky_epsilon: list.sticky_epsilon.unwrap_or(defaults.list.sticky_epsilon),
        },
        cache: config.cache.unwrap_or(defaults.cache),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `min_delay_override` - Optional minimum delay from `--min-delay` (milliseconds)
/// * `buffer_override` - Optional buffer count from `--buffer`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    min_delay_override: Option<u64>,
    buffer_override: Option<usize>,
) -> ResolvedConfig {
    if let Some(ms) = min_delay_override {
        config.reveal.min_delay = Duration::from_millis(ms);
    }

    if let Some(buffer) = buffer_override {
        config.list.buffer_count = buffer;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
