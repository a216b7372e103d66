use crate::physics::DEFAULT_MARGIN;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Editing-session settings. Fields missing from a config file take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Take a checkpoint automatically before each edit.
    pub auto_add_checkpoints: bool,
    /// Oldest checkpoints are dropped beyond this many. `None` keeps all.
    pub max_checkpoints: Option<usize>,
    /// Margin given to compound shapes created by the editor.
    pub default_margin: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_add_checkpoints: true,
            max_checkpoints: None,
            default_margin: DEFAULT_MARGIN,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_margin.is_finite() || self.default_margin < 0.0 {
            return Err(ConfigError::Invalid {
                name: "default_margin",
                reason: format!("{} is not a finite, non-negative length", self.default_margin),
            });
        }
        if self.max_checkpoints == Some(0) {
            return Err(ConfigError::Invalid {
                name: "max_checkpoints",
                reason: "must keep at least one checkpoint".to_string(),
            });
        }
        Ok(())
    }
}
