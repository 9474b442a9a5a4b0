//! Configuration for the constraint engine
//!
//! Every value has an editor default, so a config file only needs the keys
//! it changes:
//!
//! ```toml
//! alignment-threshold = 2.0
//! page-center-guides = false
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Distance in pixels under which two edges count as aligned
    pub alignment_threshold: f64,

    /// Report alignment guides while dragging and resizing
    pub alignment_guides: bool,

    /// Include the page content center lines as guide candidates
    pub page_center_guides: bool,

    /// Smallest width/height of a box resized inside a table cell
    pub table_cell_min_size: f64,

    /// Distance of the section drop line from the first/last zone
    pub drop_indicator_offset: f64,

    /// Clamp a box into its container once a drag ends
    pub clamp_on_drop: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: 1.0,
            alignment_guides: true,
            page_center_guides: true,
            table_cell_min_size: 10.0,
            drop_indicator_offset: 2.0,
            clamp_on_drop: true,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("alignment-threshold", self.alignment_threshold),
            ("table-cell-min-size", self.table_cell_min_size),
            ("drop-indicator-offset", self.drop_indicator_offset),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    key,
                    message: format!("expected a non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }

    /// Set the alignment threshold
    pub fn with_alignment_threshold(mut self, threshold: f64) -> Self {
        self.alignment_threshold = threshold;
        self
    }

    /// Turn alignment guides on or off
    pub fn with_alignment_guides(mut self, enabled: bool) -> Self {
        self.alignment_guides = enabled;
        self
    }

    /// Turn page-center guides on or off
    pub fn with_page_center_guides(mut self, enabled: bool) -> Self {
        self.page_center_guides = enabled;
        self
    }

    /// Set the minimum size of table-cell children
    pub fn with_table_cell_min_size(mut self, size: f64) -> Self {
        self.table_cell_min_size = size;
        self
    }

    /// Set the drop indicator offset
    pub fn with_drop_indicator_offset(mut self, offset: f64) -> Self {
        self.drop_indicator_offset = offset;
        self
    }

    /// Turn the post-drop clamp on or off
    pub fn with_clamp_on_drop(mut self, enabled: bool) -> Self {
        self.clamp_on_drop = enabled;
        self
    }
}
