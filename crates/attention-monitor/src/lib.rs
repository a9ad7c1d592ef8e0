//! Attention Monitoring Core
//!
//! Turns per-frame facial landmarks into debounced, latched attention
//! alerts:
//!
//! - sustained head-turn ("distraction"): |yaw| above an angular threshold
//!   for longer than a sustain window
//! - sustained mouth-opening ("yawning"): inter-lip distance above a pixel
//!   threshold for its own sustain window
//!
//! Each condition fires at most once per sustained episode and re-arms when
//! the condition ends. Frames without a usable signal (no face, failed pose
//! solve) leave the episodes untouched, so a detection dropout can neither
//! reset an in-progress episode nor clear a latched alert.

mod analysis;
mod config;
mod episode;
mod monitor;

pub use analysis::{AttentionEvent, FocusState, FrameAnalysis, YawnTransition};
pub use config::{MonitorConfig, DEFAULT_YAWN_MESSAGE};
pub use episode::{AlertTransition, EpisodeState, SustainMonitor};
pub use monitor::{DistractionMonitor, YawnMonitor};

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use face_landmarks::{FrameSize, LandmarkSet};
use head_pose::{CameraIntrinsics, PoseSolver};

/// Attention monitor errors
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Per-frame orchestration: landmarks to pose to state machines.
///
/// Owns one solver and one state machine per condition; feed it every frame
/// of one subject's stream in timestamp order.
pub struct AttentionPipeline {
    config: MonitorConfig,
    solver: PoseSolver,
    distraction: DistractionMonitor,
    yawn: YawnMonitor,
}

impl AttentionPipeline {
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            solver: PoseSolver::new(),
            distraction: DistractionMonitor::new(
                config.yaw_threshold_degrees,
                config.distraction_sustain(),
            ),
            yawn: YawnMonitor::new(config.mouth_open_threshold_px, config.yawn_sustain()),
            config,
        })
    }

    /// Analyze one frame.
    ///
    /// `landmarks` is `None` when the provider found no face; `now` is the
    /// frame's offset on the stream's monotonic clock. Never fails: a frame
    /// that cannot be evaluated is skipped with both episodes left exactly
    /// as they were.
    pub fn process(
        &mut self,
        frame: FrameSize,
        landmarks: Option<&LandmarkSet>,
        now: Duration,
    ) -> FrameAnalysis {
        let Some(set) = landmarks else {
            return FrameAnalysis::skipped();
        };

        let intrinsics = CameraIntrinsics::from_frame(frame);
        let yaw_degrees = match self.solver.solve(&intrinsics, &set.pose_points()) {
            Ok(pose) => Some(pose.angles.yaw),
            Err(err) => {
                // Skip the yaw signal rather than clearing: one bad frame
                // must not reset an in-progress episode.
                debug!("pose solve failed, yaw skipped this frame: {err}");
                None
            }
        };

        let distraction = self.distraction.update(yaw_degrees, now);

        // The mouth signal is pure 2D and survives a failed pose solve.
        let mouth_opening_px = set.mouth_opening_px();
        let yawn = match self.yawn.update(Some(mouth_opening_px), now) {
            AlertTransition::Raised => YawnTransition::Raised {
                message: self.config.yawn_message.clone(),
            },
            AlertTransition::Cleared => YawnTransition::Cleared,
            AlertTransition::None => YawnTransition::None,
        };

        let focus = match yaw_degrees {
            Some(yaw) if yaw.abs() > self.config.yaw_threshold_degrees => FocusState::NotFocused,
            Some(_) => FocusState::Focused,
            None => FocusState::Unknown,
        };

        debug!(
            "frame analyzed: yaw={:?} mouth={:.1}px focus={:?}",
            yaw_degrees, mouth_opening_px, focus
        );

        FrameAnalysis {
            face_detected: true,
            yaw_degrees,
            mouth_opening_px: Some(mouth_opening_px),
            focus,
            distraction,
            yawn,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn distraction(&self) -> &DistractionMonitor {
        &self.distraction
    }

    pub fn yawn(&self) -> &YawnMonitor {
        &self.yawn
    }

    /// Drop both episodes, e.g. when the subject changes
    pub fn reset(&mut self) {
        self.distraction.reset();
        self.yawn.reset();
    }
}
