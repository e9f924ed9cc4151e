//! Site configuration
//!
//! Where the logs live and the handful of site constants the parsers need,
//! loaded from TOML with built-in defaults so the tool runs with no config
//! file at all.
//!
//! ## Loading order
//!
//! 1. explicit path (`--config`)
//! 2. `POWERVIS_CONFIG` environment variable
//! 3. `powervis.toml` in the current working directory
//! 4. built-in defaults
//!
//! The loaded value is passed by parameter through the pipeline; there is no
//! global configuration state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Defaults
// ============================================================================

/// Enterprise aisle line voltage (V) for the amps → kW conversion.
pub const DEFAULT_ENTERPRISE_VOLTAGE: f64 = 208.0;

/// Chart points when `-p/--points` is not given.
pub const DEFAULT_WINDOW_COUNT: usize = 50;

/// Days of data when no explicit range is given.
pub const DEFAULT_SPAN_DAYS: f64 = 7.0;

/// Smallest permitted span (about two hours of data).
pub const MIN_SPAN_DAYS: f64 = 0.08;

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_enterprise_prefix() -> String {
    "ENT".to_string()
}

fn default_ups_prefix() -> String {
    "UPS".to_string()
}

fn default_enterprise_voltage() -> f64 {
    DEFAULT_ENTERPRISE_VOLTAGE
}

fn default_window_count() -> usize {
    DEFAULT_WINDOW_COUNT
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0:?}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {0:?}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// SiteConfig
// ============================================================================

/// Everything the ingest layer needs to find and interpret the logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory holding the per-day HPC CSVs and the ENT/UPS logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Filename prefix of the enterprise log files.
    #[serde(default = "default_enterprise_prefix")]
    pub enterprise_prefix: String,

    /// Filename prefix of the UPS trendlog files.
    #[serde(default = "default_ups_prefix")]
    pub ups_prefix: String,

    /// Line voltage used to turn the enterprise log's amps into kW.
    #[serde(default = "default_enterprise_voltage")]
    pub enterprise_voltage: f64,

    /// Window count when the CLI does not specify one.
    #[serde(default = "default_window_count")]
    pub default_window_count: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            enterprise_prefix: default_enterprise_prefix(),
            ups_prefix: default_ups_prefix(),
            enterprise_voltage: default_enterprise_voltage(),
            default_window_count: default_window_count(),
        }
    }
}

impl SiteConfig {
    /// Resolve the configuration using the loading order above. An explicit
    /// path must load; the fallback locations degrade to defaults with a
    /// warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "loaded site config");
            return Ok(config);
        }

        if let Ok(env_path) = std::env::var("POWERVIS_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => {
                        info!(path = %path.display(), "loaded site config from POWERVIS_CONFIG");
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring POWERVIS_CONFIG");
                    }
                }
            } else {
                warn!(path = %env_path, "POWERVIS_CONFIG points to a missing file");
            }
        }

        let local = PathBuf::from("powervis.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("loaded site config from ./powervis.toml");
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "ignoring ./powervis.toml");
                }
            }
        }

        info!("no powervis.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load and validate one specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the parsers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enterprise_voltage.is_finite() || self.enterprise_voltage <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "enterprise_voltage must be positive, got {}",
                self.enterprise_voltage
            )));
        }
        if self.default_window_count == 0 {
            return Err(ConfigError::Invalid(
                "default_window_count must be at least 1".to_string(),
            ));
        }
        if self.enterprise_prefix.is_empty() || self.ups_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "log filename prefixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
