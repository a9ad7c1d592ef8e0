//! Synthetic attention monitoring demo
//!
//! Plays a scripted head-behavior scenario through the full pipeline
//! (landmarks, pose solve, state machines, notification board) at a fixed
//! frame rate, with a background task standing in for the external
//! notifier, then prints a JSON run summary.

mod scripted;
mod settings;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alerting::{AlertSink, Notifier};
use attention_monitor::{AlertTransition, AttentionPipeline, FrameAnalysis, YawnTransition};
use face_landmarks::{LandmarkProvider, VideoFrame};

use crate::scripted::{HeadScript, ScriptedProvider};
use crate::settings::SimSettings;

/// Initialize logging
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    frames: u32,
    frames_without_face: u32,
    pose_failures: u32,
    distraction_alerts: u32,
    yawn_alerts: u32,
    notifications_delivered: u32,
    last_notification: String,
}

impl RunSummary {
    fn record(&mut self, analysis: &FrameAnalysis) {
        self.frames += 1;
        if !analysis.face_detected {
            self.frames_without_face += 1;
        } else if analysis.yaw_degrees.is_none() {
            self.pose_failures += 1;
        }
        if analysis.distraction == AlertTransition::Raised {
            self.distraction_alerts += 1;
        }
        if matches!(analysis.yawn, YawnTransition::Raised { .. }) {
            self.yawn_alerts += 1;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let settings = SimSettings::load()?;
    info!("=== Attention Monitor Simulation v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "camera {} labeled {}x{} @ {} fps",
        settings.camera_index, settings.frame_width, settings.frame_height, settings.fps
    );

    let mut provider = ScriptedProvider::new(HeadScript::demo());
    let mut pipeline = AttentionPipeline::new(settings.monitor.clone())?;
    let notifier = Arc::new(Notifier::new());

    // Stand-in for the external notifier collaborator: polls and drains the
    // board the way an audio player or status endpoint would.
    let delivered = Arc::new(AtomicU32::new(0));
    let drain_task = tokio::spawn({
        let notifier = Arc::clone(&notifier);
        let delivered = Arc::clone(&delivered);
        async move {
            let mut poll = tokio::time::interval(Duration::from_millis(250));
            loop {
                poll.tick().await;
                if let Some(message) = notifier.take() {
                    info!("external notifier delivering: {message}");
                    delivered.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    });

    let fps = settings.fps.max(1);
    let frame_period = Duration::from_secs_f64(1.0 / f64::from(fps));
    let total_frames = (provider.script().total_duration_s() * f64::from(fps)).ceil() as u32;
    info!(
        "playing {:.1} s script ({} frames)",
        provider.script().total_duration_s(),
        total_frames
    );

    let mut summary = RunSummary::default();
    let mut ticker = tokio::time::interval(frame_period);
    for sequence in 0..total_frames {
        ticker.tick().await;

        // Stream time comes from the frame, not the wall clock, so a run
        // replays identically regardless of scheduler jitter.
        let timestamp_ns = u64::from(sequence) * frame_period.as_nanos() as u64;
        let frame = VideoFrame::blank(
            settings.frame_width,
            settings.frame_height,
            timestamp_ns,
            sequence,
        );

        let landmarks = provider.detect(&frame);
        let analysis = pipeline.process(
            frame.size(),
            landmarks.as_ref(),
            Duration::from_nanos(timestamp_ns),
        );

        summary.record(&analysis);
        for event in analysis.events() {
            notifier.on_event(&event);
        }
    }

    drain_task.abort();
    // Deliver anything still on the board after the last frame.
    if let Some(message) = notifier.take() {
        info!("external notifier delivering: {message}");
        delivered.fetch_add(1, Ordering::Relaxed);
    }

    summary.notifications_delivered = delivered.load(Ordering::Relaxed);
    summary.last_notification = notifier.snapshot().message;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
