//! Engine configuration.
//!
//! All fields have defaults, so a config file only needs the values it
//! overrides:
//!
//! ```yaml
//! threads: 4
//! max_log_entries: 256
//! defaults:
//!   gaussian_sigma: 2.0
//! ```

use common::FileFormat;
use serde::{Deserialize, Serialize};

use crate::convolution::gaussian_radius;
use crate::error::{Error, Result};
use crate::median_filter::window_len;

/// Parameters used by the `*_default` engine entry points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub gaussian_sigma: f32,
    pub median_kernel_size: usize,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            gaussian_sigma: 1.0,
            median_kernel_size: 3,
        }
    }
}

impl FilterDefaults {
    pub fn validate(&self) -> Result<()> {
        if let Err(err) = gaussian_radius(self.gaussian_sigma) {
            return Err(Error::InvalidConfig(format!("gaussian_sigma: {err}")));
        }
        if let Err(err) = window_len(self.median_kernel_size) {
            return Err(Error::InvalidConfig(format!("median_kernel_size: {err}")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for data-parallel passes. `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Whether successful operations are appended to the operation log.
    pub record_operations: bool,
    /// Log capacity; the oldest entries are dropped first.
    pub max_log_entries: usize,
    pub defaults: FilterDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            record_operations: true,
            max_log_entries: 1024,
            defaults: FilterDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from YAML or JSON text.
    pub fn from_str(text: &str, format: FileFormat) -> Result<Self> {
        let config: Self = common::deserialize(text, format)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_text(&self, format: FileFormat) -> Result<String> {
        Ok(common::serialize(self, format)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig(
                "threads must be at least 1 when set".to_string(),
            ));
        }
        if self.max_log_entries == 0 {
            return Err(Error::InvalidConfig(
                "max_log_entries must be at least 1".to_string(),
            ));
        }
        self.defaults.validate()
    }
}
