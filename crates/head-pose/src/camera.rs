//! Estimated pinhole camera model

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use face_landmarks::FrameSize;

/// Pinhole intrinsics estimated from frame dimensions.
///
/// Focal length = frame width, principal point = frame center, zero lens
/// distortion. Cheap to build, so callers re-derive it per frame rather
/// than caching across a stream whose resolution may change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length along x, pixels
    pub fx: f64,
    /// Focal length along y, pixels
    pub fy: f64,
    /// Principal point x, pixels
    pub cx: f64,
    /// Principal point y, pixels
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Estimate intrinsics for a frame of the given size
    pub fn from_frame(size: FrameSize) -> Self {
        let focal = f64::from(size.width);
        Self {
            fx: focal,
            fy: focal,
            cx: f64::from(size.width) / 2.0,
            cy: f64::from(size.height) / 2.0,
        }
    }

    /// Project a camera-space point (x right, y down, z forward, millimeters)
    /// to pixel coordinates. `None` for points at or behind the camera plane.
    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        if point.z <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(
            self.fx * point.x / point.z + self.cx,
            self.fy * point.y / point.z + self.cy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frame() {
        let k = CameraIntrinsics::from_frame(FrameSize::new(640, 480));
        assert_eq!(k.fx, 640.0);
        assert_eq!(k.fy, 640.0);
        assert_eq!(k.cx, 320.0);
        assert_eq!(k.cy, 240.0);
    }

    #[test]
    fn test_project_optical_axis_hits_principal_point() {
        let k = CameraIntrinsics::from_frame(FrameSize::new(640, 480));
        let p = k.project(&Point3::new(0.0, 0.0, 600.0)).unwrap();
        assert!((p.x - 320.0).abs() < 1e-12);
        assert!((p.y - 240.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_scales_with_depth() {
        let k = CameraIntrinsics::from_frame(FrameSize::new(640, 480));
        let near = k.project(&Point3::new(100.0, 0.0, 500.0)).unwrap();
        let far = k.project(&Point3::new(100.0, 0.0, 1000.0)).unwrap();
        assert!(near.x > far.x);
        assert!((far.x - (320.0 + 640.0 * 100.0 / 1000.0)).abs() < 1e-12);
    }

    #[test]
    fn test_project_behind_camera() {
        let k = CameraIntrinsics::from_frame(FrameSize::new(640, 480));
        assert!(k.project(&Point3::new(10.0, 10.0, -5.0)).is_none());
        assert!(k.project(&Point3::new(10.0, 10.0, 0.0)).is_none());
    }
}
