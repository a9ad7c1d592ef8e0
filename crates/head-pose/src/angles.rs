//! Euler angle decomposition of the solved head rotation

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Head orientation as Tait-Bryan angles, degrees, zero-centered on a face
/// looking straight into the camera.
///
/// Convention: with `R` mapping model coordinates (x image-right, y up,
/// z out of the face) into camera coordinates (x right, y down, z forward)
/// and `F = diag(1, -1, -1)` the frontal pose, `F * R` is decomposed as
/// `Ry(a) * Rx(b) * Rz(c)`; then `yaw = -a`, `pitch = b`, `roll = c`.
///
/// Signs: positive yaw = subject turning toward their own right, positive
/// pitch = tilting down (chin toward chest), positive roll = tilting toward
/// their own right shoulder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Horizontal head turn, degrees
    pub yaw: f64,
    /// Vertical head tilt, degrees
    pub pitch: f64,
    /// Lateral head tilt, degrees
    pub roll: f64,
}

impl EulerAngles {
    /// Decompose a model-to-camera rotation
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        let flip = Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0));
        let a = flip * *rotation.matrix();

        // a = Ry(yaw') * Rx(pitch) * Rz(roll), so a[(1,2)] = -sin(pitch).
        let sin_pitch = -a[(1, 2)];
        let (yaw_raw, pitch, roll) = if sin_pitch.abs() < 1.0 - 1e-9 {
            (
                a[(0, 2)].atan2(a[(2, 2)]),
                sin_pitch.asin(),
                a[(1, 0)].atan2(a[(1, 1)]),
            )
        } else {
            // Gimbal lock: pitch at +/-90 degrees, roll folded into yaw.
            (
                (-a[(2, 0)]).atan2(a[(0, 0)]),
                std::f64::consts::FRAC_PI_2.copysign(sin_pitch),
                0.0,
            )
        };

        Self {
            yaw: -yaw_raw.to_degrees(),
            pitch: pitch.to_degrees(),
            roll: roll.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontal() -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    }

    /// Model-to-camera rotation for the given head attitude.
    fn pose(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> Rotation3<f64> {
        let attitude = Rotation3::from_axis_angle(&Vector3::y_axis(), -yaw_deg.to_radians())
            * Rotation3::from_axis_angle(&Vector3::x_axis(), pitch_deg.to_radians())
            * Rotation3::from_axis_angle(&Vector3::z_axis(), roll_deg.to_radians());
        frontal() * attitude
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_frontal_face_is_zero() {
        let angles = EulerAngles::from_rotation(&frontal());
        assert_close(angles.yaw, 0.0);
        assert_close(angles.pitch, 0.0);
        assert_close(angles.roll, 0.0);
    }

    #[test]
    fn test_yaw_sign_right_turn_positive() {
        let angles = EulerAngles::from_rotation(&pose(40.0, 0.0, 0.0));
        assert_close(angles.yaw, 40.0);
        assert_close(angles.pitch, 0.0);
        assert_close(angles.roll, 0.0);

        let angles = EulerAngles::from_rotation(&pose(-65.0, 0.0, 0.0));
        assert_close(angles.yaw, -65.0);
    }

    #[test]
    fn test_pitch_and_roll_recovered() {
        let angles = EulerAngles::from_rotation(&pose(0.0, 12.5, 0.0));
        assert_close(angles.pitch, 12.5);

        let angles = EulerAngles::from_rotation(&pose(0.0, 0.0, -7.0));
        assert_close(angles.roll, -7.0);
    }

    #[test]
    fn test_combined_angles_recovered() {
        let angles = EulerAngles::from_rotation(&pose(35.0, 10.0, 5.0));
        assert_close(angles.yaw, 35.0);
        assert_close(angles.pitch, 10.0);
        assert_close(angles.roll, 5.0);
    }

    #[test]
    fn test_gimbal_lock_keeps_yaw_finite() {
        let angles = EulerAngles::from_rotation(&pose(30.0, 90.0, 0.0));
        assert_close(angles.pitch, 90.0);
        assert_close(angles.roll, 0.0);
        assert_close(angles.yaw, 30.0);
    }
}
