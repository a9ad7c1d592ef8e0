//! Canonical landmark identifiers and per-frame landmark sets

use serde::{Deserialize, Serialize};

use crate::{LandmarkError, VideoFrame};

/// Version of the canonical landmark mapping providers must emit
pub const LANDMARK_SCHEME_VERSION: u32 = 1;

/// Number of landmarks in a complete set
pub const LANDMARK_COUNT: usize = 8;

/// Canonical landmark identifiers.
///
/// Sides are image-space, matching what 2D detectors report on an
/// un-mirrored frame: `LeftEyeOuterCorner` is the eye on the left of the
/// image, which is the subject's right eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkId {
    NoseTip = 0,
    Chin = 1,
    LeftEyeOuterCorner = 2,
    RightEyeOuterCorner = 3,
    LeftMouthCorner = 4,
    RightMouthCorner = 5,
    UpperLipCenter = 6,
    LowerLipCenter = 7,
}

impl LandmarkId {
    /// All identifiers in canonical order
    pub const ALL: [LandmarkId; LANDMARK_COUNT] = [
        LandmarkId::NoseTip,
        LandmarkId::Chin,
        LandmarkId::LeftEyeOuterCorner,
        LandmarkId::RightEyeOuterCorner,
        LandmarkId::LeftMouthCorner,
        LandmarkId::RightMouthCorner,
        LandmarkId::UpperLipCenter,
        LandmarkId::LowerLipCenter,
    ];

    /// The six identifiers consumed by the pose solver, in solver order
    pub const POSE: [LandmarkId; 6] = [
        LandmarkId::NoseTip,
        LandmarkId::Chin,
        LandmarkId::LeftEyeOuterCorner,
        LandmarkId::RightEyeOuterCorner,
        LandmarkId::LeftMouthCorner,
        LandmarkId::RightMouthCorner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkId::NoseTip => "nose_tip",
            LandmarkId::Chin => "chin",
            LandmarkId::LeftEyeOuterCorner => "left_eye_outer_corner",
            LandmarkId::RightEyeOuterCorner => "right_eye_outer_corner",
            LandmarkId::LeftMouthCorner => "left_mouth_corner",
            LandmarkId::RightMouthCorner => "right_mouth_corner",
            LandmarkId::UpperLipCenter => "upper_lip_center",
            LandmarkId::LowerLipCenter => "lower_lip_center",
        }
    }
}

/// 2D landmark position in pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another landmark, pixels
    pub fn distance_to(&self, other: &LandmarkPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A complete set of canonical landmarks for one detected face.
///
/// Construction validates completeness and finiteness, so an existing set
/// always carries every canonical landmark: faces are absent or complete,
/// never partial. The serialized form is the bare point array in canonical
/// order, and deserialization runs the same validation as [`LandmarkSet::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "[LandmarkPoint; LANDMARK_COUNT]",
    into = "[LandmarkPoint; LANDMARK_COUNT]"
)]
pub struct LandmarkSet {
    points: [LandmarkPoint; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Build a set from points in canonical order
    pub fn new(points: [LandmarkPoint; LANDMARK_COUNT]) -> Result<Self, LandmarkError> {
        for (id, point) in LandmarkId::ALL.iter().zip(points.iter()) {
            if !point.is_finite() {
                return Err(LandmarkError::NonFinite(*id));
            }
        }
        Ok(Self { points })
    }

    /// Build a set from a slice in canonical order
    pub fn from_points(points: &[LandmarkPoint]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                got: points.len(),
            });
        }
        let mut fixed = [LandmarkPoint::default(); LANDMARK_COUNT];
        fixed.copy_from_slice(points);
        Self::new(fixed)
    }

    /// Position of one canonical landmark
    pub fn get(&self, id: LandmarkId) -> LandmarkPoint {
        self.points[id as usize]
    }

    /// The six pose correspondences in solver order
    pub fn pose_points(&self) -> [LandmarkPoint; 6] {
        LandmarkId::POSE.map(|id| self.get(id))
    }

    /// Inter-lip distance (upper to lower lip center), pixels.
    ///
    /// Pixel distances scale with resolution and camera distance; thresholds
    /// over this value are tuned per deployment.
    pub fn mouth_opening_px(&self) -> f64 {
        self.get(LandmarkId::UpperLipCenter)
            .distance_to(&self.get(LandmarkId::LowerLipCenter))
    }
}

impl TryFrom<[LandmarkPoint; LANDMARK_COUNT]> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: [LandmarkPoint; LANDMARK_COUNT]) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for [LandmarkPoint; LANDMARK_COUNT] {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

/// Per-frame source of facial landmarks.
///
/// `None` means no face this frame. Implementations that cannot produce a
/// complete canonical set must return `None` rather than a partial set;
/// malformed detector output counts as a missed detection downstream.
pub trait LandmarkProvider: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Option<LandmarkSet>;
}
