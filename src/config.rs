//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! poll_interval_ms = 16
//! animation_interval_ms = 100
//! palette = "nord"
//! background = "#1e1e2e"
//! status_height = 1
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::Color;
use crate::theme::{Palette, get_preset, preset_names};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Input poll / idle wait per loop tick.
    pub poll_interval_ms: u64,
    /// Default interval for `animate` when none is given.
    pub animation_interval_ms: u64,
    /// Terminal width used when the size query fails.
    pub fallback_width: u16,
    /// Terminal height used when the size query fails.
    pub fallback_height: u16,
    /// Rows reserved at the bottom for the status view, if one is supplied.
    pub status_height: u16,
    /// Palette preset name.
    pub palette: String,
    /// Background colour override.
    pub background: Option<String>,
    pub alternate_screen: bool,
    pub synchronized_output: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16,
            animation_interval_ms: 100,
            fallback_width: 80,
            fallback_height: 24,
            status_height: 1,
            palette: "terminal".to_string(),
            background: None,
            alternate_screen: true,
            synchronized_output: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be greater than 0".into()));
        }
        if self.animation_interval_ms == 0 {
            return Err(Error::Config(
                "animation_interval_ms must be greater than 0".into(),
            ));
        }
        if self.fallback_width == 0 || self.fallback_height == 0 {
            return Err(Error::Config("fallback size must be non-zero".into()));
        }
        if get_preset(&self.palette).is_none() {
            return Err(Error::Config(format!(
                "unknown palette {:?} (expected one of: {})",
                self.palette,
                preset_names().join(", ")
            )));
        }
        if let Some(background) = &self.background {
            Color::parse(background)?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    /// The configured palette with the background override applied.
    pub fn palette(&self) -> Result<Palette> {
        let palette = get_preset(&self.palette)
            .ok_or_else(|| Error::Config(format!("unknown palette {:?}", self.palette)))?;
        match &self.background {
            Some(background) => Ok(palette.with_background(Color::parse(background)?)),
            None => Ok(palette),
        }
    }
}
