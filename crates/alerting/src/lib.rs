//! Alert Delivery
//!
//! Routes edge-triggered attention events to a shared notification board
//! that external notifiers (audio players, status endpoints) poll and drain.

mod notifier;

pub use notifier::{AlertSink, NotificationState, Notifier};
