//! Head Pose Estimation
//!
//! Recovers head orientation from 2D facial landmarks by aligning a fixed
//! six-point 3D face model with the observations under a pinhole camera
//! estimated from the frame dimensions (focal length = frame width,
//! principal point = frame center, zero lens distortion).
//!
//! The intrinsics are an estimate, not a calibration, and the face model is
//! generic, so the recovered angles are coarse. They are stable enough for
//! wide attention thresholds (tens of degrees) and nothing finer.

mod angles;
mod camera;
mod model;
mod solver;

pub use angles::EulerAngles;
pub use camera::CameraIntrinsics;
pub use model::{FaceModel, REFERENCE_POINTS_MM};
pub use solver::{solve_correspondences, HeadPose, PoseSolver, MIN_CORRESPONDENCES};

use thiserror::Error;

/// Pose solve failures.
///
/// None of these are fatal to a monitoring loop. Callers treat a failed
/// frame as "signal not evaluated" and skip it; a failure is never evidence
/// the head is centered or turned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("need at least {needed} point correspondences, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    #[error("got {image} image points for {model} model points")]
    MismatchedPoints { model: usize, image: usize },

    #[error("degenerate geometry: image points are near-collinear")]
    DegenerateGeometry,

    #[error("solver did not converge after {iterations} iterations (residual {residual:.2} px)")]
    Diverged { iterations: usize, residual: f64 },
}
