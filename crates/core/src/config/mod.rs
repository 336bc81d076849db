use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AutoplayError, RecordingSettings, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub autoplay: AutoplayConfig,
    pub recording: RecordingSettings,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.autoplay.validate()
    }
}

/// Tuning for the button scheduler and the frame synthesizer.
///
/// Times are in milliseconds except `alternating_threshold`, which is kept in
/// seconds to match how charts and mods express it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Idle time (seconds) after which the left button is preferred again.
    pub alternating_threshold: f64,
    /// Mods-adjusted reaction time, only used to size the warm-up.
    pub reaction_time: f64,
    /// Easing preference for the downstream interpolation layer.
    pub delayed_movements: bool,
    /// Added to a click or release time to form the button's last-click time.
    pub release_delay: f64,
    /// Gap between a click frame and the frame that lifts the button again.
    pub key_up_delay: f64,
    /// Gap between the movement anchor and the click or hold it precedes.
    pub anchor_lead: f64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            alternating_threshold: 0.5,
            reaction_time: 100.0,
            delayed_movements: false,
            release_delay: 50.0,
            key_up_delay: 50.0,
            anchor_lead: 50.0,
        }
    }
}

impl AutoplayConfig {
    /// Alternating threshold converted to the millisecond time base.
    pub fn alternating_threshold_ms(&self) -> f64 {
        self.alternating_threshold * 1000.0
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("alternating_threshold", self.alternating_threshold),
            ("reaction_time", self.reaction_time),
            ("release_delay", self.release_delay),
            ("key_up_delay", self.key_up_delay),
            ("anchor_lead", self.anchor_lead),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AutoplayError::InvalidConfig(format!(
                    "`{name}` must be a finite, non-negative number (got {value})"
                )));
            }
        }

        Ok(())
    }
}
