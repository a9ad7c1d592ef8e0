//! Facial Landmark Types
//!
//! Defines frame metadata and the canonical landmark scheme consumed by the
//! pose and attention crates. Landmark detection itself is an external
//! collaborator behind the [`LandmarkProvider`] trait: detectors either
//! deliver a complete, validated [`LandmarkSet`] or report no face at all,
//! so downstream code never sees a partial face.

mod frame;
mod landmarks;

pub use frame::{FrameSize, VideoFrame};
pub use landmarks::{
    LandmarkId, LandmarkPoint, LandmarkProvider, LandmarkSet, LANDMARK_COUNT,
    LANDMARK_SCHEME_VERSION,
};

use thiserror::Error;

/// Landmark set construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("landmark set has {got} points, expected {expected}")]
    WrongCount { expected: usize, got: usize },

    #[error("landmark {0:?} has a non-finite coordinate")]
    NonFinite(LandmarkId),
}
