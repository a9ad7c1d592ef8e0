//! Per-frame analysis results and sink events

use serde::{Deserialize, Serialize};

use crate::episode::AlertTransition;

/// Yawn machine transition. `Raised` carries the notification message
/// handed to the alert sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum YawnTransition {
    Raised { message: String },
    Cleared,
    None,
}

impl YawnTransition {
    pub fn is_none(&self) -> bool {
        matches!(self, YawnTransition::None)
    }
}

/// Per-frame focus level for overlays and telemetry. This is the raw
/// threshold comparison, not the debounced alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocusState {
    Focused,
    NotFocused,
    /// No face or no recoverable pose this frame
    #[default]
    Unknown,
}

/// Edge-triggered events for alert sinks.
///
/// Emitted only on transitions, so a condition holding across many frames
/// reaches the sink exactly once per episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttentionEvent {
    DistractionRaised,
    DistractionCleared,
    YawnRaised { message: String },
    YawnCleared,
}

/// Complete outcome of analyzing one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Whether a complete landmark set was available
    pub face_detected: bool,
    /// Solved head yaw, degrees; `None` when no face or the solve failed
    pub yaw_degrees: Option<f64>,
    /// Inter-lip distance, pixels; `None` when no face
    pub mouth_opening_px: Option<f64>,
    /// Raw focus level this frame
    pub focus: FocusState,
    /// Distraction machine transition
    pub distraction: AlertTransition,
    /// Yawn machine transition
    pub yawn: YawnTransition,
}

impl FrameAnalysis {
    /// Analysis of a frame with no face: both episodes untouched
    pub(crate) fn skipped() -> Self {
        Self {
            face_detected: false,
            yaw_degrees: None,
            mouth_opening_px: None,
            focus: FocusState::Unknown,
            distraction: AlertTransition::None,
            yawn: YawnTransition::None,
        }
    }

    /// Whether either machine fired or cleared this frame
    pub fn has_transition(&self) -> bool {
        !(self.distraction.is_none() && self.yawn.is_none())
    }

    /// Flatten this frame's transitions into sink events
    pub fn events(&self) -> Vec<AttentionEvent> {
        let mut events = Vec::new();
        match self.distraction {
            AlertTransition::Raised => events.push(AttentionEvent::DistractionRaised),
            AlertTransition::Cleared => events.push(AttentionEvent::DistractionCleared),
            AlertTransition::None => {}
        }
        match &self.yawn {
            YawnTransition::Raised { message } => events.push(AttentionEvent::YawnRaised {
                message: message.clone(),
            }),
            YawnTransition::Cleared => events.push(AttentionEvent::YawnCleared),
            YawnTransition::None => {}
        }
        events
    }
}
