//! Concrete monitors layered over the shared sustain machine

use std::time::Duration;

use tracing::{info, warn};

use crate::episode::{AlertTransition, EpisodeState, SustainMonitor};

/// Sustained head-turn monitor: |yaw| past an angular threshold for longer
/// than the sustain window.
#[derive(Debug, Clone)]
pub struct DistractionMonitor {
    yaw_threshold_degrees: f64,
    inner: SustainMonitor,
}

impl DistractionMonitor {
    pub fn new(yaw_threshold_degrees: f64, sustain: Duration) -> Self {
        Self {
            yaw_threshold_degrees,
            inner: SustainMonitor::new(sustain),
        }
    }

    /// Advance one frame. `yaw_degrees` is `None` when no pose was
    /// recoverable this frame, which leaves the episode untouched.
    pub fn update(&mut self, yaw_degrees: Option<f64>, now: Duration) -> AlertTransition {
        let condition = yaw_degrees.map(|yaw| yaw.abs() > self.yaw_threshold_degrees);
        let transition = self.inner.update(condition, now);
        match transition {
            AlertTransition::Raised => warn!(
                "distraction alert raised (yaw {:+.1} deg held past threshold)",
                yaw_degrees.unwrap_or_default()
            ),
            AlertTransition::Cleared => info!("distraction alert cleared"),
            AlertTransition::None => {}
        }
        transition
    }

    /// Whether |yaw| exceeded the threshold on the last evaluated frame
    pub fn looking_away(&self) -> bool {
        self.inner.condition_active()
    }

    pub fn alert_active(&self) -> bool {
        self.inner.alert_active()
    }

    pub fn episode(&self) -> EpisodeState {
        self.inner.state()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Sustained mouth-opening monitor: inter-lip distance past a pixel
/// threshold for longer than the sustain window.
#[derive(Debug, Clone)]
pub struct YawnMonitor {
    mouth_open_threshold_px: f64,
    inner: SustainMonitor,
}

impl YawnMonitor {
    pub fn new(mouth_open_threshold_px: f64, sustain: Duration) -> Self {
        Self {
            mouth_open_threshold_px,
            inner: SustainMonitor::new(sustain),
        }
    }

    /// Advance one frame. `mouth_opening_px` is `None` when no face was
    /// detected this frame.
    pub fn update(&mut self, mouth_opening_px: Option<f64>, now: Duration) -> AlertTransition {
        let condition = mouth_opening_px.map(|distance| distance > self.mouth_open_threshold_px);
        let transition = self.inner.update(condition, now);
        match transition {
            AlertTransition::Raised => warn!(
                "yawn alert raised (mouth opening {:.1} px held past threshold)",
                mouth_opening_px.unwrap_or_default()
            ),
            AlertTransition::Cleared => info!("yawn alert cleared"),
            AlertTransition::None => {}
        }
        transition
    }

    pub fn mouth_open(&self) -> bool {
        self.inner.condition_active()
    }

    pub fn alert_active(&self) -> bool {
        self.inner.alert_active()
    }

    pub fn episode(&self) -> EpisodeState {
        self.inner.state()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_distraction_threshold_is_symmetric() {
        let mut monitor = DistractionMonitor::new(60.0, Duration::from_millis(100));

        monitor.update(Some(-70.0), at(0));
        assert!(monitor.looking_away());
        // Turned the other way: still one continuous episode.
        assert_eq!(monitor.update(Some(70.0), at(150)), AlertTransition::Raised);
    }

    #[test]
    fn test_distraction_boundary_yaw_is_not_away() {
        let mut monitor = DistractionMonitor::new(60.0, Duration::from_millis(100));
        monitor.update(Some(60.0), at(0));
        assert!(!monitor.looking_away());
        monitor.update(Some(60.1), at(33));
        assert!(monitor.looking_away());
    }

    #[test]
    fn test_yawn_fires_and_clears() {
        let mut monitor = YawnMonitor::new(25.0, Duration::from_millis(1500));

        assert_eq!(monitor.update(Some(30.0), at(0)), AlertTransition::None);
        assert_eq!(monitor.update(Some(30.0), at(1500)), AlertTransition::None);
        assert_eq!(monitor.update(Some(30.0), at(1533)), AlertTransition::Raised);
        assert_eq!(monitor.update(Some(10.0), at(1566)), AlertTransition::Cleared);
    }

    #[test]
    fn test_monitors_run_independent_episodes() {
        let mut distraction = DistractionMonitor::new(60.0, Duration::from_millis(3000));
        let mut yawn = YawnMonitor::new(25.0, Duration::from_millis(1500));

        // Both conditions hold simultaneously from t = 0.
        let mut distraction_raised_at = None;
        let mut yawn_raised_at = None;
        for i in 0..120u64 {
            let now = at(i * 33);
            if distraction.update(Some(80.0), now) == AlertTransition::Raised {
                distraction_raised_at = Some(now);
            }
            if yawn.update(Some(32.0), now) == AlertTransition::Raised {
                yawn_raised_at = Some(now);
            }
        }

        // Each fires on its own schedule.
        assert_eq!(yawn_raised_at, Some(at(46 * 33)));
        assert_eq!(distraction_raised_at, Some(at(91 * 33)));
        assert!(distraction.alert_active() && yawn.alert_active());
    }
}
