//! Mapper configuration
//!
//! Read from JSON. Every key is optional:
//!
//! ```json
//! { "max_depth": 32, "date_format": "%Y-%m-%dT%H:%M:%S%:z", "log_level": "WARN" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dates::{self, ATOM_FORMAT};
use crate::errors::{MapResult, MapperError};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Instantiator and logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Deepest relation nesting accepted during hydration (default: 32)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// chrono format for dates in output maps (default: ATOM)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Minimum severity written by the logger (default: WARN)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_max_depth() -> usize {
    32
}

fn default_date_format() -> String {
    ATOM_FORMAT.to_string()
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

impl MapperConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(content: &str) -> MapResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> MapResult<Self> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| MapperError::Config {
            origin: origin.clone(),
            reason: format!("Failed to read config: {}", e),
        })?;
        Self::parse(&content, &origin)
    }

    /// Applies `log_level` to the process-wide logger.
    pub fn install_logging(&self) {
        Logger::set_min_severity(self.log_level);
    }

    fn parse(content: &str, origin: &str) -> MapResult<Self> {
        let config: MapperConfig =
            serde_json::from_str(content).map_err(|e| MapperError::Config {
                origin: origin.to_string(),
                reason: format!("Invalid config JSON: {}", e),
            })?;
        config.validate(origin)?;

        let max_depth = config.max_depth.to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("origin", origin), ("max_depth", &max_depth)],
        );
        Ok(config)
    }

    fn validate(&self, origin: &str) -> MapResult<()> {
        if self.max_depth == 0 {
            return Err(MapperError::Config {
                origin: origin.to_string(),
                reason: "max_depth must be > 0".to_string(),
            });
        }
        if self.date_format.trim().is_empty() {
            return Err(MapperError::Config {
                origin: origin.to_string(),
                reason: "date_format must not be empty".to_string(),
            });
        }
        if !dates::is_valid_format(&self.date_format) {
            return Err(MapperError::Config {
                origin: origin.to_string(),
                reason: format!("date_format '{}' is not a valid chrono format", self.date_format),
            });
        }
        Ok(())
    }
}
