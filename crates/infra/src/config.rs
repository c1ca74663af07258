//! Configuration loading and representation.
//!
//! Priority, highest first:
//! 1. Environment variables (`NEXUS_LOG_LEVEL`, `NEXUS_LOG_FORMAT`,
//!    `NEXUS_SEED_PATH`, `NEXUS_STALE_PENDING_HOURS`)
//! 2. JSON file named by `NEXUS_CONFIG`
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nexus_observability::{LogConfig, LogFormat};

pub const ENV_CONFIG_FILE: &str = "NEXUS_CONFIG";
pub const ENV_LOG_LEVEL: &str = "NEXUS_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "NEXUS_LOG_FORMAT";
pub const ENV_SEED_PATH: &str = "NEXUS_SEED_PATH";
pub const ENV_STALE_PENDING_HOURS: &str = "NEXUS_STALE_PENDING_HOURS";

/// Upper bound for `reports.demand_window_days` (100 years).
pub const MAX_DEMAND_WINDOW_DAYS: i64 = 36_500;
/// Upper bound for `workflow.stale_pending_after_hours` (100 years).
pub const MAX_STALE_PENDING_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Thresholds for the read-model reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Trailing window (days) of approved stock-outs counted as demand.
    pub demand_window_days: i64,
    pub critical_days: i64,
    pub warning_days: i64,
    pub critical_quantity: i64,
    pub warning_quantity: i64,
    /// Fraction of aging (OLD_USED) stock value expected to be recovered.
    pub aging_recovery_rate: Decimal,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            demand_window_days: 30,
            critical_days: 7,
            warning_days: 14,
            critical_quantity: 5,
            warning_quantity: 20,
            aging_recovery_rate: Decimal::new(6, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Age after which a PENDING transaction shows up in the stale sweep.
    pub stale_pending_after_hours: i64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            stale_pending_after_hours: 72,
        }
    }
}

impl WorkflowConfig {
    /// Saturates at `TimeDelta::MAX` for hours outside the validated range.
    pub fn stale_pending_after(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::try_hours(self.stale_pending_after_hours).unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    pub log: LogConfig,
    pub reports: ReportConfig,
    pub workflow: WorkflowConfig,
    /// Optional JSON catalog seed. The built-in demo catalog is used when unset.
    pub seed_path: Option<PathBuf>,
}

impl NexusConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG_FILE) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                tracing::warn!("{ENV_CONFIG_FILE} not set, starting from defaults");
                Self::default()
            }
        };

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            if level.trim().is_empty() {
                return Err(ConfigError::invalid(ENV_LOG_LEVEL, "must not be empty"));
            }
            config.log.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log.format = format
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::invalid(ENV_LOG_FORMAT, reason))?;
        }
        if let Some(path) = lookup(ENV_SEED_PATH) {
            config.seed_path = Some(PathBuf::from(path));
        }
        if let Some(hours) = lookup(ENV_STALE_PENDING_HOURS) {
            let hours: i64 = hours
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_STALE_PENDING_HOURS, format!("{e}")))?;
            if !(1..=MAX_STALE_PENDING_HOURS).contains(&hours) {
                return Err(ConfigError::invalid(
                    ENV_STALE_PENDING_HOURS,
                    format!("must be between 1 and {MAX_STALE_PENDING_HOURS}"),
                ));
            }
            config.workflow.stale_pending_after_hours = hours;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.reports;
        if !(1..=MAX_DEMAND_WINDOW_DAYS).contains(&r.demand_window_days) {
            return Err(ConfigError::invalid(
                "reports.demand_window_days",
                format!("must be between 1 and {MAX_DEMAND_WINDOW_DAYS}"),
            ));
        }
        if r.critical_days > r.warning_days {
            return Err(ConfigError::invalid(
                "reports.critical_days",
                "must not exceed reports.warning_days",
            ));
        }
        if r.critical_quantity > r.warning_quantity {
            return Err(ConfigError::invalid(
                "reports.critical_quantity",
                "must not exceed reports.warning_quantity",
            ));
        }
        if r.aging_recovery_rate < Decimal::ZERO || r.aging_recovery_rate > Decimal::ONE {
            return Err(ConfigError::invalid(
                "reports.aging_recovery_rate",
                "must be between 0 and 1",
            ));
        }
        if !(1..=MAX_STALE_PENDING_HOURS).contains(&self.workflow.stale_pending_after_hours) {
            return Err(ConfigError::invalid(
                "workflow.stale_pending_after_hours",
                format!("must be between 1 and {MAX_STALE_PENDING_HOURS}"),
            ));
        }
        Ok(())
    }
}
