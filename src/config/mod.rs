//! Configuration loading for the HRIS service.
//!
//! This module loads the service configuration from a YAML file, covering
//! the HTTP server, database, logging, PSGC cache, attendance matching and
//! wage-rate activation settings.
//!
//! # Example
//!
//! ```no_run
//! use hris::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/hris.yaml").unwrap();
//! println!("Database at {}", loader.config().database.path);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, AttendanceConfig, DatabaseConfig, LoggingConfig, PsgcConfig, ServerConfig,
    WageRateConfig,
};
