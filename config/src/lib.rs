//! Configuration for the EBIOS RM tools.
//!
//! Read from `~/.ebios/config.toml`, or from the file named by `EBIOS_CONFIG`.
//! The raw file model is all `Option`s; [`Settings::resolve`] validates it and
//! fills defaults, so downstream code never sees a half-configured value.
//!
//! ```toml
//! [risk]
//! strategy = "weighted"
//!
//! [workshops]
//! steps = { 1 = 5, 2 = 4, 3 = 5, 4 = 6, 5 = 3 }
//!
//! [events]
//! history_capacity = 64
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use ebios_core::{DEFAULT_HISTORY_CAPACITY, RiskStrategy, WorkshopStepPlan};
use ebios_types::WorkshopNumber;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "EBIOS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config at {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Invalid { path, .. } => {
                path
            }
        }
    }
}

// ── Raw file model ───────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EbiosConfig {
    pub risk: Option<RiskConfig>,
    pub workshops: Option<WorkshopsConfig>,
    pub events: Option<EventsConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    pub strategy: Option<RiskStrategy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkshopsConfig {
    /// Required steps keyed by workshop number. TOML keys are strings.
    #[serde(default)]
    pub steps: BTreeMap<String, u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    pub history_capacity: Option<usize>,
}

impl EbiosConfig {
    /// Parse TOML text. `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

// ── Resolved settings ────────────────────────────────────────

/// Validated configuration with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub strategy: RiskStrategy,
    pub step_plan: WorkshopStepPlan,
    pub history_capacity: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: RiskStrategy::default(),
            step_plan: WorkshopStepPlan::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Settings {
    pub fn resolve(raw: EbiosConfig, path: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| {
            tracing::warn!(path = %path.display(), %message, "Invalid config");
            ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            }
        };

        let mut settings = Self::default();

        if let Some(strategy) = raw.risk.and_then(|risk| risk.strategy) {
            settings.strategy = strategy;
        }

        if let Some(workshops) = raw.workshops {
            for (key, total) in workshops.steps {
                let number = key
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(|n| WorkshopNumber::new(n).ok())
                    .ok_or_else(|| {
                        invalid(format!(
                            "workshop key `{key}` must be a number between 1 and 5"
                        ))
                    })?;
                let total = NonZeroU32::new(total).ok_or_else(|| {
                    invalid(format!("workshop {number} must require at least one step"))
                })?;
                settings.step_plan = settings.step_plan.with_total(number, total);
            }
        }

        if let Some(capacity) = raw.events.and_then(|events| events.history_capacity) {
            settings.history_capacity = NonZeroUsize::new(capacity)
                .ok_or_else(|| invalid("events.history_capacity must be greater than 0".to_owned()))?;
        }

        Ok(settings)
    }

    /// Load settings from the default location. A missing file yields
    /// defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No home directory; using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let raw = EbiosConfig::parse(&content, path)?;
        let settings = Self::resolve(raw, path)?;
        tracing::debug!(
            path = %path.display(),
            strategy = settings.strategy.as_str(),
            history_capacity = settings.history_capacity.get(),
            "Config loaded"
        );
        Ok(settings)
    }
}

/// Config file location: `$EBIOS_CONFIG` if set, else `~/.ebios/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    resolve_config_path(std::env::var_os(CONFIG_ENV), dirs::home_dir())
}

fn resolve_config_path(env: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match env {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => home.map(|home| home.join(".ebios").join("config.toml")),
    }
}
