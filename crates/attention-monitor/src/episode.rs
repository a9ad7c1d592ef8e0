//! Sustain-and-latch episode tracking

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Edge-triggered outcome of one state machine update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertTransition {
    /// The condition has been sustained past the threshold; at most once
    /// per episode
    Raised,
    /// The condition ended after its alert had fired
    Cleared,
    /// No transition this frame
    None,
}

impl AlertTransition {
    pub fn is_none(&self) -> bool {
        matches!(self, AlertTransition::None)
    }
}

/// One episode of a monitored condition.
///
/// `onset` is recorded on the first frame the condition holds and dropped on
/// the first frame it does not; `alert_fired` latches once the episode
/// outlasts the sustain threshold. `alert_fired` implies `onset` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeState {
    onset: Option<Duration>,
    alert_fired: bool,
}

impl EpisodeState {
    /// Stream time at which the current episode began, if one is running
    pub fn onset(&self) -> Option<Duration> {
        self.onset
    }

    /// Whether this episode's alert has fired
    pub fn alert_fired(&self) -> bool {
        self.alert_fired
    }
}

/// Latch-and-debounce state machine shared by every monitored condition.
///
/// Time is the caller's monotonic stream offset, never wall clock, so frame
/// sequences replay deterministically. Calling [`update`](Self::update)
/// twice with the same `(condition, now)` pair yields no second transition.
#[derive(Debug, Clone)]
pub struct SustainMonitor {
    sustain: Duration,
    state: EpisodeState,
}

impl SustainMonitor {
    pub fn new(sustain: Duration) -> Self {
        Self {
            sustain,
            state: EpisodeState::default(),
        }
    }

    /// Advance one frame.
    ///
    /// `condition` is `None` when the signal could not be evaluated this
    /// frame (no face, failed pose solve): the episode is left untouched,
    /// since a detection dropout is not evidence the condition ended.
    pub fn update(&mut self, condition: Option<bool>, now: Duration) -> AlertTransition {
        let Some(active) = condition else {
            return AlertTransition::None;
        };

        if active {
            let onset = *self.state.onset.get_or_insert(now);
            if !self.state.alert_fired && now.saturating_sub(onset) > self.sustain {
                self.state.alert_fired = true;
                return AlertTransition::Raised;
            }
            AlertTransition::None
        } else {
            let had_fired = self.state.alert_fired;
            self.state = EpisodeState::default();
            if had_fired {
                AlertTransition::Cleared
            } else {
                AlertTransition::None
            }
        }
    }

    /// Whether the condition held on the most recent evaluated frame
    pub fn condition_active(&self) -> bool {
        self.state.onset.is_some()
    }

    /// Whether the alert latch is currently set
    pub fn alert_active(&self) -> bool {
        self.state.alert_fired
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Drop any in-progress episode, e.g. on subject change
    pub fn reset(&mut self) {
        self.state = EpisodeState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME: Duration = Duration::from_millis(33);

    fn at(frame_index: u64) -> Duration {
        Duration::from_millis(33 * frame_index)
    }

    #[test]
    fn test_fires_once_after_sustain() {
        let mut monitor = SustainMonitor::new(Duration::from_secs(3));
        let mut raised = Vec::new();

        // 30 fps for 3.4 seconds, condition held throughout.
        for i in 0..=103 {
            if monitor.update(Some(true), at(i)) == AlertTransition::Raised {
                raised.push(i);
            }
        }

        // First frame strictly past 3.0 s is frame 91 (3.003 s).
        assert_eq!(raised, vec![91]);
        assert!(monitor.alert_active());
    }

    #[test]
    fn test_no_fire_below_threshold() {
        let mut monitor = SustainMonitor::new(Duration::from_secs(3));

        // Condition holds for just under 3 s, then ends.
        for i in 0..=90 {
            assert_eq!(monitor.update(Some(true), at(i)), AlertTransition::None);
        }
        // Ends without having fired: no clear event either.
        assert_eq!(monitor.update(Some(false), at(91)), AlertTransition::None);
        assert!(!monitor.alert_active());
    }

    #[test]
    fn test_exact_threshold_does_not_fire() {
        let mut monitor = SustainMonitor::new(Duration::from_secs(3));
        assert_eq!(monitor.update(Some(true), at(0)), AlertTransition::None);
        // Elapsed exactly equal to the sustain threshold: strictly-greater
        // comparison keeps this silent.
        assert_eq!(
            monitor.update(Some(true), Duration::from_secs(3)),
            AlertTransition::None
        );
        assert_eq!(
            monitor.update(Some(true), Duration::from_secs(3) + FRAME),
            AlertTransition::Raised
        );
    }

    #[test]
    fn test_clear_after_fire_and_rearm() {
        let mut monitor = SustainMonitor::new(Duration::from_millis(100));

        assert_eq!(monitor.update(Some(true), at(0)), AlertTransition::None);
        assert_eq!(monitor.update(Some(true), at(4)), AlertTransition::Raised);
        // Latched: still true, no second fire.
        assert_eq!(monitor.update(Some(true), at(5)), AlertTransition::None);
        assert_eq!(monitor.update(Some(false), at(6)), AlertTransition::Cleared);

        // A fresh episode fires again.
        assert_eq!(monitor.update(Some(true), at(7)), AlertTransition::None);
        assert_eq!(monitor.update(Some(true), at(11)), AlertTransition::Raised);
    }

    #[test]
    fn test_unevaluated_frame_preserves_episode() {
        let mut monitor = SustainMonitor::new(Duration::from_millis(100));

        monitor.update(Some(true), at(0));
        // Dropout in the middle of the episode.
        assert_eq!(monitor.update(None, at(1)), AlertTransition::None);
        assert_eq!(monitor.update(None, at(2)), AlertTransition::None);
        // Onset is still frame 0, so frame 4 is past the threshold.
        assert_eq!(monitor.update(Some(true), at(4)), AlertTransition::Raised);
    }

    #[test]
    fn test_unevaluated_frame_preserves_latched_alert() {
        let mut monitor = SustainMonitor::new(Duration::from_millis(100));
        monitor.update(Some(true), at(0));
        assert_eq!(monitor.update(Some(true), at(4)), AlertTransition::Raised);

        assert_eq!(monitor.update(None, at(5)), AlertTransition::None);
        assert!(monitor.alert_active());
        // The clear only arrives once the condition is observed false.
        assert_eq!(monitor.update(Some(false), at(6)), AlertTransition::Cleared);
    }

    #[test]
    fn test_update_is_idempotent_for_same_instant() {
        let mut monitor = SustainMonitor::new(Duration::from_millis(100));
        monitor.update(Some(true), at(0));

        assert_eq!(monitor.update(Some(true), at(4)), AlertTransition::Raised);
        let state = monitor.state();
        assert_eq!(monitor.update(Some(true), at(4)), AlertTransition::None);
        assert_eq!(monitor.state(), state);
    }

    #[test]
    fn test_reset_drops_episode() {
        let mut monitor = SustainMonitor::new(Duration::from_millis(100));
        monitor.update(Some(true), at(0));
        monitor.update(Some(true), at(4));
        assert!(monitor.alert_active());

        monitor.reset();
        assert!(!monitor.alert_active());
        assert!(!monitor.condition_active());
        // No stale clear after a reset.
        assert_eq!(monitor.update(Some(false), at(5)), AlertTransition::None);
    }

    /// Frames needed for a run of `true` at 33 ms spacing to outlast a
    /// 100 ms sustain: elapsed (len - 1) * 33 ms > 100 ms, so len >= 5.
    fn expected_transitions(pattern: &[bool]) -> (usize, usize) {
        let mut raised = 0;
        let mut cleared = 0;
        let mut run = 0usize;
        for &active in pattern {
            if active {
                run += 1;
                if run == 5 {
                    raised += 1;
                }
            } else {
                if run >= 5 {
                    cleared += 1;
                }
                run = 0;
            }
        }
        (raised, cleared)
    }

    proptest! {
        #[test]
        fn prop_one_alert_per_sustained_run(pattern in proptest::collection::vec(any::<bool>(), 1..400)) {
            let mut monitor = SustainMonitor::new(Duration::from_millis(100));
            let mut raised = 0usize;
            let mut cleared = 0usize;

            for (i, &active) in pattern.iter().enumerate() {
                match monitor.update(Some(active), at(i as u64)) {
                    AlertTransition::Raised => raised += 1,
                    AlertTransition::Cleared => cleared += 1,
                    AlertTransition::None => {}
                }
            }

            let (expected_raised, expected_cleared) = expected_transitions(&pattern);
            prop_assert_eq!(raised, expected_raised);
            prop_assert_eq!(cleared, expected_cleared);
            // Every clear pairs with an earlier raise.
            prop_assert!(cleared <= raised);
        }

        #[test]
        fn prop_unevaluated_frames_never_change_state(
            evaluated in proptest::collection::vec(any::<bool>(), 1..50),
            gap_len in 1usize..10,
        ) {
            let mut direct = SustainMonitor::new(Duration::from_millis(100));
            let mut gapped = SustainMonitor::new(Duration::from_millis(100));

            for (i, &active) in evaluated.iter().enumerate() {
                let now = at(i as u64);
                direct.update(Some(active), now);
                gapped.update(Some(active), now);
                // Interleave skip frames; they must not disturb the episode.
                for g in 0..gap_len {
                    let skip_now = now + Duration::from_millis(3 * (g as u64 + 1));
                    prop_assert_eq!(gapped.update(None, skip_now), AlertTransition::None);
                }
                prop_assert_eq!(direct.state(), gapped.state());
            }
        }
    }
}
