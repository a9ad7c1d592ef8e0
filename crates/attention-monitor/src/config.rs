//! Attention monitor configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::MonitorError;

/// Notification message surfaced when a yawn alert fires
pub const DEFAULT_YAWN_MESSAGE: &str = "Ngantuk bro? Cuci muka dulu";

/// Thresholds for the attention state machines.
///
/// Fields left out when deserializing fill from `Default`, so partial
/// override tables (config file sections, environment variables) work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Head-turn threshold on |yaw| from center (degrees)
    pub yaw_threshold_degrees: f64,
    /// Head-turn duration before the distraction alert fires (seconds)
    pub distraction_sustain_seconds: f64,
    /// Inter-lip distance threshold (pixels; scales with resolution and
    /// camera distance, tune per deployment)
    pub mouth_open_threshold_px: f64,
    /// Mouth-open duration before the yawn alert fires (seconds)
    pub yawn_sustain_seconds: f64,
    /// Message delivered with the yawn alert
    pub yawn_message: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            yaw_threshold_degrees: 60.0,
            distraction_sustain_seconds: 3.0,
            mouth_open_threshold_px: 25.0,
            yawn_sustain_seconds: 1.5,
            yawn_message: DEFAULT_YAWN_MESSAGE.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Strict preset (lower thresholds, faster alerts)
    pub fn strict() -> Self {
        Self {
            yaw_threshold_degrees: 45.0,
            distraction_sustain_seconds: 2.0,
            yawn_sustain_seconds: 1.0,
            ..Default::default()
        }
    }

    /// Lenient preset (higher thresholds, slower alerts)
    pub fn lenient() -> Self {
        Self {
            yaw_threshold_degrees: 75.0,
            distraction_sustain_seconds: 5.0,
            yawn_sustain_seconds: 2.5,
            ..Default::default()
        }
    }

    /// Distraction sustain window. Call only on a validated config.
    pub fn distraction_sustain(&self) -> Duration {
        Duration::from_secs_f64(self.distraction_sustain_seconds)
    }

    /// Yawn sustain window. Call only on a validated config.
    pub fn yawn_sustain(&self) -> Duration {
        Duration::from_secs_f64(self.yawn_sustain_seconds)
    }

    /// Reject thresholds the state machines cannot run on
    pub fn validate(&self) -> Result<(), MonitorError> {
        let positive_finite = [
            ("yaw_threshold_degrees", self.yaw_threshold_degrees),
            (
                "distraction_sustain_seconds",
                self.distraction_sustain_seconds,
            ),
            ("mouth_open_threshold_px", self.mouth_open_threshold_px),
            ("yawn_sustain_seconds", self.yawn_sustain_seconds),
        ];
        for (name, value) in positive_finite {
            if !value.is_finite() || value <= 0.0 {
                return Err(MonitorError::Config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let sustain_windows = [
            (
                "distraction_sustain_seconds",
                self.distraction_sustain_seconds,
            ),
            ("yawn_sustain_seconds", self.yawn_sustain_seconds),
        ];
        for (name, value) in sustain_windows {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(MonitorError::Config(format!(
                    "{name} must fit in a Duration, got {value}"
                )));
            }
        }
        if self.yawn_message.is_empty() {
            return Err(MonitorError::Config(
                "yawn_message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
