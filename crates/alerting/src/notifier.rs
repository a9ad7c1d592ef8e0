//! Shared notification board

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use attention_monitor::AttentionEvent;

/// Externally observable notification pair.
///
/// `message` survives a drain: consumers polling after the pending flag was
/// taken still see the last notification text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Whether an undelivered notification is waiting
    pub pending: bool,
    /// Text of the most recent notification
    pub message: String,
}

/// Receives edge-triggered attention events.
///
/// Implementations sit on the frame path and must be cheap and
/// non-blocking. A sink failure stays on the sink side; it can never reach
/// the episode state machines.
pub trait AlertSink: Send + Sync {
    fn on_event(&self, event: &AttentionEvent);
}

/// Process-wide notification board polled by external notifiers.
///
/// Single writer (the frame loop), any number of readers. The lock keeps
/// the {pending, message} pair consistent: a reader can never observe a
/// fresh flag with a stale message.
#[derive(Debug, Default)]
pub struct Notifier {
    state: Mutex<NotificationState>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a message, marking it pending until a consumer takes it
    pub fn publish(&self, message: &str) {
        let mut state = self.lock();
        state.pending = true;
        state.message = message.to_string();
        info!("notification published: {message}");
    }

    /// Drain the pending notification, if any. Clears the pending flag but
    /// keeps the message readable for later status polls.
    pub fn take(&self) -> Option<String> {
        let mut state = self.lock();
        if state.pending {
            state.pending = false;
            Some(state.message.clone())
        } else {
            None
        }
    }

    /// Consistent copy of the current pair
    pub fn snapshot(&self) -> NotificationState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NotificationState> {
        // A poisoned lock still holds a consistent pair; recover it rather
        // than taking down the monitoring loop.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl AlertSink for Notifier {
    fn on_event(&self, event: &AttentionEvent) {
        match event {
            AttentionEvent::YawnRaised { message } => self.publish(message),
            AttentionEvent::YawnCleared => debug!("yawn episode ended"),
            // Distraction alerts are logged, not queued for the notifier.
            AttentionEvent::DistractionRaised => warn!("subject attention lost"),
            AttentionEvent::DistractionCleared => info!("subject attention recovered"),
        }
    }
}
