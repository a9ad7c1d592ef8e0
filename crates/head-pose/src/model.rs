//! Fixed 3D face reference model

use nalgebra::{Point3, Rotation3, Vector3};

use face_landmarks::LandmarkPoint;

use crate::CameraIntrinsics;

/// Six reference points of a generic adult face, millimeters, nose tip at
/// the origin. Axes: +x toward the side of the face that appears on the
/// image's right, +y up, +z out of the face toward the camera.
///
/// Order matches [`face_landmarks::LandmarkId::POSE`]: nose tip, chin, left
/// eye outer corner, right eye outer corner, left mouth corner, right mouth
/// corner (sides image-space).
pub const REFERENCE_POINTS_MM: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, -330.0, -65.0],
    [-225.0, 170.0, -135.0],
    [225.0, 170.0, -135.0],
    [-150.0, -150.0, -125.0],
    [150.0, -150.0, -125.0],
];

/// The rigid 3D model paired with incoming 2D landmarks
#[derive(Debug, Clone)]
pub struct FaceModel {
    points: [Point3<f64>; 6],
}

impl Default for FaceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceModel {
    pub fn new() -> Self {
        Self {
            points: REFERENCE_POINTS_MM.map(|[x, y, z]| Point3::new(x, y, z)),
        }
    }

    /// Model points in solver order
    pub fn points(&self) -> &[Point3<f64>; 6] {
        &self.points
    }

    /// Centroid of the model points, millimeters
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.points.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.points.len() as f64)
    }

    /// Root-mean-square distance of the points from their centroid,
    /// millimeters. Seeds the solver's depth estimate.
    pub fn rms_radius(&self) -> f64 {
        let centroid = self.centroid();
        let mean_sq = self
            .points
            .iter()
            .map(|p| (p - centroid).norm_squared())
            .sum::<f64>()
            / self.points.len() as f64;
        mean_sq.sqrt()
    }

    /// Project the model through a camera under the given rigid transform
    /// (model to camera). `None` if any point lands at or behind the camera
    /// plane. Used to synthesize landmark observations in tests and sims.
    pub fn project(
        &self,
        intrinsics: &CameraIntrinsics,
        rotation: &Rotation3<f64>,
        translation: &Vector3<f64>,
    ) -> Option<[LandmarkPoint; 6]> {
        let mut projected = [LandmarkPoint::default(); 6];
        for (out, point) in projected.iter_mut().zip(self.points.iter()) {
            let camera_space = rotation * point + translation;
            let pixel = intrinsics.project(&camera_space)?;
            *out = LandmarkPoint::new(pixel.x, pixel.y);
        }
        Some(projected)
    }
}
