//! Scripted synthetic face

use nalgebra::{Rotation3, Vector3};

use face_landmarks::{
    FrameSize, LandmarkPoint, LandmarkProvider, LandmarkSet, VideoFrame, LANDMARK_COUNT,
};
use head_pose::{CameraIntrinsics, FaceModel};

/// Simulated distance from camera to face, millimeters
const FACE_DEPTH_MM: f64 = 600.0;

/// One piece of scripted head behavior
#[derive(Debug, Clone)]
pub struct Segment {
    /// Segment length (seconds)
    pub duration_s: f64,
    /// Head yaw held through the segment (degrees, positive = turning
    /// toward the subject's right)
    pub yaw_degrees: f64,
    /// Inter-lip distance held through the segment (pixels)
    pub mouth_opening_px: f64,
    /// Detector dropout: the provider reports no face
    pub dropout: bool,
}

/// Piecewise-constant head behavior over time
#[derive(Debug, Clone)]
pub struct HeadScript {
    segments: Vec<Segment>,
}

impl HeadScript {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Demo scenario: attentive start, a long look-away with a dropout in
    /// the middle, recovery, then a yawn.
    pub fn demo() -> Self {
        Self::new(vec![
            Segment {
                duration_s: 2.0,
                yaw_degrees: 4.0,
                mouth_opening_px: 8.0,
                dropout: false,
            },
            Segment {
                duration_s: 1.5,
                yaw_degrees: 72.0,
                mouth_opening_px: 8.0,
                dropout: false,
            },
            Segment {
                duration_s: 0.2,
                yaw_degrees: 72.0,
                mouth_opening_px: 8.0,
                dropout: true,
            },
            Segment {
                duration_s: 2.3,
                yaw_degrees: 72.0,
                mouth_opening_px: 8.0,
                dropout: false,
            },
            Segment {
                duration_s: 1.0,
                yaw_degrees: 2.0,
                mouth_opening_px: 8.0,
                dropout: false,
            },
            Segment {
                duration_s: 2.2,
                yaw_degrees: 0.0,
                mouth_opening_px: 31.0,
                dropout: false,
            },
            Segment {
                duration_s: 1.5,
                yaw_degrees: 0.0,
                mouth_opening_px: 7.0,
                dropout: false,
            },
        ])
    }

    pub fn total_duration_s(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_s).sum()
    }

    /// Segment active at the given stream time, `None` past the end
    pub fn at(&self, t_s: f64) -> Option<&Segment> {
        let mut elapsed = 0.0;
        for segment in &self.segments {
            elapsed += segment.duration_s;
            if t_s < elapsed {
                return Some(segment);
            }
        }
        None
    }
}

/// Landmark provider that plays a script by projecting the reference face
/// model through the frame's estimated intrinsics, exactly the geometry the
/// solver inverts.
pub struct ScriptedProvider {
    script: HeadScript,
    model: FaceModel,
}

impl ScriptedProvider {
    pub fn new(script: HeadScript) -> Self {
        Self {
            script,
            model: FaceModel::new(),
        }
    }

    pub fn script(&self) -> &HeadScript {
        &self.script
    }

    fn landmarks_at(&self, t_s: f64, size: FrameSize) -> Option<LandmarkSet> {
        let segment = self.script.at(t_s)?;
        if segment.dropout {
            return None;
        }

        let intrinsics = CameraIntrinsics::from_frame(size);
        let frontal = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
        let attitude =
            Rotation3::from_axis_angle(&Vector3::y_axis(), -segment.yaw_degrees.to_radians());
        let pose_points = self.model.project(
            &intrinsics,
            &(frontal * attitude),
            &Vector3::new(0.0, 0.0, FACE_DEPTH_MM),
        )?;

        // Lip pair: split vertically around the mouth-corner midpoint.
        let mid_x = (pose_points[4].x + pose_points[5].x) / 2.0;
        let mid_y = (pose_points[4].y + pose_points[5].y) / 2.0;
        let half = segment.mouth_opening_px / 2.0;

        let mut all = [LandmarkPoint::default(); LANDMARK_COUNT];
        all[..6].copy_from_slice(&pose_points);
        all[6] = LandmarkPoint::new(mid_x, mid_y - half);
        all[7] = LandmarkPoint::new(mid_x, mid_y + half);
        LandmarkSet::new(all).ok()
    }
}

impl LandmarkProvider for ScriptedProvider {
    fn detect(&mut self, frame: &VideoFrame) -> Option<LandmarkSet> {
        let t_s = frame.timestamp_ns as f64 / 1e9;
        self.landmarks_at(t_s, frame.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(t_s: f64) -> VideoFrame {
        VideoFrame::blank(640, 480, (t_s * 1e9) as u64, 0)
    }

    #[test]
    fn test_script_segment_lookup() {
        let script = HeadScript::demo();
        assert!((script.total_duration_s() - 10.7).abs() < 1e-9);
        assert_eq!(script.at(0.0).unwrap().yaw_degrees, 4.0);
        assert_eq!(script.at(2.5).unwrap().yaw_degrees, 72.0);
        assert!(script.at(99.0).is_none());
    }

    #[test]
    fn test_dropout_segment_reports_no_face() {
        let mut provider = ScriptedProvider::new(HeadScript::demo());
        // 3.6 s falls inside the 0.2 s dropout window.
        assert!(provider.detect(&frame_at(3.6)).is_none());
        assert!(provider.detect(&frame_at(3.8)).is_some());
    }

    #[test]
    fn test_scripted_mouth_opening_is_exact() {
        let mut provider = ScriptedProvider::new(HeadScript::demo());
        let set = provider.detect(&frame_at(7.0)).unwrap();
        assert!((set.mouth_opening_px() - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_scripted_yaw_round_trips_through_solver() {
        let mut provider = ScriptedProvider::new(HeadScript::demo());
        let set = provider.detect(&frame_at(2.5)).unwrap();

        let intrinsics = CameraIntrinsics::from_frame(FrameSize::new(640, 480));
        let pose = head_pose::PoseSolver::new()
            .solve(&intrinsics, &set.pose_points())
            .unwrap();
        assert!((pose.angles.yaw - 72.0).abs() < 1.0, "yaw {}", pose.angles.yaw);
    }
}
