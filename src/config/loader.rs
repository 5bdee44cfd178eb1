//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{HrisError, HrisResult};

use super::types::AppConfig;

/// Upper bound for `psgc.max_requests_per_minute`.
pub const MAX_REQUESTS_PER_MINUTE: u32 = 10_000;

/// Upper bound for `wage_rates.check_interval_minutes`; activation must be
/// checked at least once a day.
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 24 * 60;

/// Loads and validates the service configuration.
///
/// # Example
///
/// ```no_run
/// use hris::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/hris.yaml").unwrap();
/// println!("Binding to {}", loader.config().server.bind);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or out-of-range values (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> HrisResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| HrisError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content, &path_str)
    }

    /// Parses configuration from YAML text. `origin` is used in error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> HrisResult<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        let config: AppConfig = if content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| HrisError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        Self::validate(&config).map_err(|message| HrisError::ConfigParseError {
            path: origin.to_string(),
            message,
        })?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration, e.g. in tests.
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    fn validate(config: &AppConfig) -> Result<(), String> {
        if !(-14..=14).contains(&config.server.utc_offset_hours) {
            return Err(format!(
                "server.utc_offset_hours must be between -14 and 14, got {}",
                config.server.utc_offset_hours
            ));
        }
        let threshold = config.attendance.face_match_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(format!(
                "attendance.face_match_threshold must be positive, got {threshold}"
            ));
        }
        if config.attendance.descriptor_length == 0 {
            return Err("attendance.descriptor_length must be greater than zero".to_string());
        }
        let budget = config.psgc.max_requests_per_minute;
        if !(1..=MAX_REQUESTS_PER_MINUTE).contains(&budget) {
            return Err(format!(
                "psgc.max_requests_per_minute must be between 1 and {MAX_REQUESTS_PER_MINUTE}, got {budget}"
            ));
        }
        let interval = config.wage_rates.check_interval_minutes;
        if !(1..=MAX_CHECK_INTERVAL_MINUTES).contains(&interval) {
            return Err(format!(
                "wage_rates.check_interval_minutes must be between 1 and {MAX_CHECK_INTERVAL_MINUTES}, got {interval}"
            ));
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> AppConfig {
        self.config
    }
}
