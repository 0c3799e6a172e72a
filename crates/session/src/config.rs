use serde::{Deserialize, Serialize};
use walkthrough_common::ConfigError;
use walkthrough_input::{GazeConfig, InputConfig};
use walkthrough_locomotion::LocomotionConfig;
use walkthrough_proximity::ProximityConfig;

/// All engine tuning in one document. Missing sections take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    pub locomotion: LocomotionConfig,
    pub input: InputConfig,
    pub gaze: GazeConfig,
    pub proximity: ProximityConfig,
}

impl WalkthroughConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locomotion.validate()?;
        self.input.validate()?;
        self.gaze.validate()?;
        self.proximity.validate()
    }
}
