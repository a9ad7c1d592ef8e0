//! Simulation settings

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use attention_monitor::MonitorConfig;

/// Runtime settings for the simulation binary.
///
/// Loaded from an optional `monitor-sim.toml` next to the working directory
/// plus `MONITOR_*` environment overrides (nested fields via `__`, e.g.
/// `MONITOR_MONITOR__YAW_THRESHOLD_DEGREES=45`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Camera device index the synthetic stream is labeled with
    pub camera_index: u32,
    /// Frame width (pixels)
    pub frame_width: u32,
    /// Frame height (pixels)
    pub frame_height: u32,
    /// Synthetic stream rate (frames per second)
    pub fps: u32,
    /// Attention thresholds
    pub monitor: MonitorConfig,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            frame_width: 640,
            frame_height: 480,
            fps: 30,
            monitor: MonitorConfig::default(),
        }
    }
}

impl SimSettings {
    pub fn load() -> Result<Self, ConfigError> {
        // Without an explicit prefix separator the nested-field separator
        // doubles as one, and only MONITOR__* variables would match.
        Config::builder()
            .add_source(File::with_name("monitor-sim").required(false))
            .add_source(
                Environment::with_prefix("MONITOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete_and_valid() {
        let settings = SimSettings::default();
        assert_eq!(settings.fps, 30);
        assert_eq!((settings.frame_width, settings.frame_height), (640, 480));
        assert!(settings.monitor.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_apply() {
        std::env::set_var("MONITOR_FPS", "60");
        std::env::set_var("MONITOR_MONITOR__YAW_THRESHOLD_DEGREES", "45");
        let loaded = SimSettings::load();
        std::env::remove_var("MONITOR_FPS");
        std::env::remove_var("MONITOR_MONITOR__YAW_THRESHOLD_DEGREES");

        let settings = loaded.unwrap();
        assert_eq!(settings.fps, 60);
        assert_eq!(settings.monitor.yaw_threshold_degrees, 45.0);
        // untouched fields keep their defaults
        assert_eq!(settings.camera_index, 0);
        assert_eq!(settings.monitor.distraction_sustain_seconds, 3.0);
        assert!(settings.monitor.validate().is_ok());
    }
}
