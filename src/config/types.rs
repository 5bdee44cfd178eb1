//! Configuration types for the HRIS service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section has
//! defaults so a partial file is enough.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

/// The complete service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// SQLite settings.
    pub database: DatabaseConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
    /// PSGC API and cache settings.
    pub psgc: PsgcConfig,
    /// Attendance and face matching settings.
    pub attendance: AttendanceConfig,
    /// Minimum-wage activation settings.
    pub wage_rates: WageRateConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (e.g. "0.0.0.0:8080").
    pub bind: String,
    /// Offset of the company's local time from UTC, in hours.
    pub utc_offset_hours: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            utc_offset_hours: 8,
        }
    }
}

impl ServerConfig {
    /// Returns the local timezone as a fixed offset.
    ///
    /// Falls back to UTC when the configured offset is out of range; the
    /// loader rejects such values, so this only matters for hand-built configs.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// SQLite settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/hris.sqlite3".to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

/// PSGC API and cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PsgcConfig {
    /// Base URL of the PSGC API, without a trailing slash.
    pub base_url: String,
    /// Age after which a cached payload is refetched.
    pub cache_ttl_hours: u32,
    /// Upstream request budget per rolling minute.
    pub max_requests_per_minute: u32,
    /// Upstream request timeout.
    pub timeout_secs: u64,
}

impl Default for PsgcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://psgc.gitlab.io/api".to_string(),
            cache_ttl_hours: 720,
            max_requests_per_minute: 60,
            timeout_secs: 10,
        }
    }
}

/// Attendance and face matching settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Maximum Euclidean distance accepted as a match.
    pub face_match_threshold: f64,
    /// Required number of components in a face descriptor.
    pub descriptor_length: usize,
    /// Minimum minutes between time-in and time-out.
    pub min_clock_interval_minutes: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            face_match_threshold: 0.6,
            descriptor_length: 128,
            min_clock_interval_minutes: 1,
        }
    }
}

/// Minimum-wage activation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WageRateConfig {
    /// File recording the last date the daily activation ran.
    pub activation_flag_file: String,
    /// How often the background task checks whether the daily run is due.
    pub check_interval_minutes: u64,
}

impl Default for WageRateConfig {
    fn default() -> Self {
        Self {
            activation_flag_file: "data/wage_activation.flag".to_string(),
            check_interval_minutes: 60,
        }
    }
}
