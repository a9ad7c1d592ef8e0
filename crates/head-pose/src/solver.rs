//! Damped least-squares perspective pose solve

use nalgebra::{DMatrix, DVector, Point3, Rotation3, Vector3};
use tracing::debug;

use face_landmarks::LandmarkPoint;

use crate::{CameraIntrinsics, EulerAngles, FaceModel, PoseError};

/// Minimum number of 2D-3D correspondences a solve accepts
pub const MIN_CORRESPONDENCES: usize = 4;

/// Iteration cap per initialization
const MAX_ITERATIONS: usize = 100;

/// Parameter step norm below which an initialization is converged
const STEP_TOLERANCE: f64 = 1e-10;

/// Points closer than this to the camera plane invalidate a trial step, mm
const MIN_DEPTH_MM: f64 = 1.0;

/// Damping factor ceiling; past this the step search is stuck
const MAX_DAMPING: f64 = 1e12;

/// Accepted solutions must reproject within this fraction of the focal
/// length (RMS over all points)
const RESIDUAL_GATE_FOCAL_FRACTION: f64 = 0.05;

/// An initialization fitting this tightly (RMS pixels) ends the restart
/// sweep early
const EXACT_FIT_RMS_PX: f64 = 1e-5;

/// Coarse yaw restarts, degrees. A far-turned head can sit outside the
/// frontal initialization's convergence basin, and near-orthographic
/// geometry has a mirrored local minimum; the sweep keeps whichever
/// initialization reprojects best.
const YAW_RESTARTS_DEG: [f64; 3] = [0.0, 75.0, -75.0];

/// Recovered head pose
#[derive(Debug, Clone)]
pub struct HeadPose {
    /// Orientation angles, degrees
    pub angles: EulerAngles,
    /// Model-to-camera rotation
    pub rotation: Rotation3<f64>,
    /// Model-to-camera translation, millimeters
    pub translation: Vector3<f64>,
    /// RMS reprojection error of the accepted solution, pixels
    pub reprojection_rms_px: f64,
}

/// Pose solver bound to the fixed six-point face model
#[derive(Debug, Clone, Default)]
pub struct PoseSolver {
    model: FaceModel,
}

impl PoseSolver {
    pub fn new() -> Self {
        Self {
            model: FaceModel::new(),
        }
    }

    pub fn model(&self) -> &FaceModel {
        &self.model
    }

    /// Solve for the head pose from the six canonical pose landmarks,
    /// in [`face_landmarks::LandmarkId::POSE`] order.
    pub fn solve(
        &self,
        intrinsics: &CameraIntrinsics,
        image_points: &[LandmarkPoint; 6],
    ) -> Result<HeadPose, PoseError> {
        solve_correspondences(intrinsics, self.model.points(), image_points)
    }
}

/// Solve a perspective pose from arbitrary 2D-3D correspondences.
///
/// Minimizes reprojection error over rotation (scaled-axis) and translation
/// with Levenberg-Marquardt, restarted from a few coarse yaw initializations.
pub fn solve_correspondences(
    intrinsics: &CameraIntrinsics,
    model_points: &[Point3<f64>],
    image_points: &[LandmarkPoint],
) -> Result<HeadPose, PoseError> {
    if model_points.len() != image_points.len() {
        return Err(PoseError::MismatchedPoints {
            model: model_points.len(),
            image: image_points.len(),
        });
    }
    if image_points.len() < MIN_CORRESPONDENCES {
        return Err(PoseError::InsufficientPoints {
            needed: MIN_CORRESPONDENCES,
            got: image_points.len(),
        });
    }
    if is_degenerate(image_points) {
        return Err(PoseError::DegenerateGeometry);
    }

    let frontal = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
    let residual_gate = intrinsics.fx * RESIDUAL_GATE_FOCAL_FRACTION;

    let mut best: Option<LmSolution> = None;
    let mut total_iterations = 0;
    for yaw_deg in YAW_RESTARTS_DEG {
        let start_rotation =
            Rotation3::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians()) * frontal;
        let start_translation =
            seed_translation(intrinsics, model_points, image_points, &start_rotation);

        match lm_refine(
            intrinsics,
            model_points,
            image_points,
            &start_rotation,
            &start_translation,
        ) {
            Some(solution) => {
                total_iterations += solution.iterations;
                if best
                    .as_ref()
                    .map_or(true, |held| solution.rms_px < held.rms_px)
                {
                    best = Some(solution);
                }
                if best
                    .as_ref()
                    .is_some_and(|held| held.rms_px < EXACT_FIT_RMS_PX)
                {
                    break;
                }
            }
            None => total_iterations += MAX_ITERATIONS,
        }
    }

    match best {
        Some(solution) if solution.rms_px <= residual_gate => {
            let angles = EulerAngles::from_rotation(&solution.rotation);
            debug!(
                "pose solve converged: yaw {:+.1} deg, rms {:.3} px, {} iterations",
                angles.yaw, solution.rms_px, solution.iterations
            );
            Ok(HeadPose {
                angles,
                rotation: solution.rotation,
                translation: solution.translation,
                reprojection_rms_px: solution.rms_px,
            })
        }
        Some(solution) => Err(PoseError::Diverged {
            iterations: total_iterations,
            residual: solution.rms_px,
        }),
        None => Err(PoseError::Diverged {
            iterations: total_iterations,
            residual: f64::INFINITY,
        }),
    }
}

struct LmSolution {
    rotation: Rotation3<f64>,
    translation: Vector3<f64>,
    rms_px: f64,
    iterations: usize,
}

/// Refine one initialization. `None` if the start (or a finite-difference
/// step while forming the Jacobian) already puts model points behind the
/// camera.
fn lm_refine(
    intrinsics: &CameraIntrinsics,
    model_points: &[Point3<f64>],
    image_points: &[LandmarkPoint],
    start_rotation: &Rotation3<f64>,
    start_translation: &Vector3<f64>,
) -> Option<LmSolution> {
    let axis = start_rotation.scaled_axis();
    let mut params = [
        axis.x,
        axis.y,
        axis.z,
        start_translation.x,
        start_translation.y,
        start_translation.z,
    ];

    let mut residual = residuals(intrinsics, model_points, image_points, &params)?;
    let mut cost = residual.norm_squared();
    let mut lambda = 1e-3;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS && !converged {
        iterations += 1;
        let jac = jacobian(intrinsics, model_points, image_points, &params)?;
        let jt = jac.transpose();
        let hessian = &jt * &jac;
        let gradient = &jt * &residual;

        // Inflate damping until a step lowers the cost.
        let mut accepted = false;
        while lambda <= MAX_DAMPING {
            let mut damped = hessian.clone();
            for i in 0..6 {
                damped[(i, i)] += lambda * hessian[(i, i)].max(1e-12);
            }
            let Some(step) = damped.lu().solve(&gradient) else {
                lambda *= 10.0;
                continue;
            };

            let mut trial = params;
            for i in 0..6 {
                trial[i] -= step[i];
            }
            if let Some(trial_residual) = residuals(intrinsics, model_points, image_points, &trial)
            {
                let trial_cost = trial_residual.norm_squared();
                if trial_cost < cost {
                    params = trial;
                    residual = trial_residual;
                    cost = trial_cost;
                    lambda = (lambda / 10.0).max(1e-12);
                    accepted = true;
                    let scale = 1.0 + params.iter().map(|p| p * p).sum::<f64>().sqrt();
                    converged = step.norm() < STEP_TOLERANCE * scale;
                    break;
                }
            }
            lambda *= 10.0;
        }
        if !accepted {
            break;
        }
    }

    let point_count = model_points.len() as f64;
    Some(LmSolution {
        rotation: Rotation3::new(Vector3::new(params[0], params[1], params[2])),
        translation: Vector3::new(params[3], params[4], params[5]),
        rms_px: (cost / point_count).sqrt(),
        iterations,
    })
}

/// Stacked (u, v) reprojection residuals. `None` if any model point falls
/// at or behind the camera plane under the trial parameters.
fn residuals(
    intrinsics: &CameraIntrinsics,
    model_points: &[Point3<f64>],
    image_points: &[LandmarkPoint],
    params: &[f64; 6],
) -> Option<DVector<f64>> {
    let rotation = Rotation3::new(Vector3::new(params[0], params[1], params[2]));
    let translation = Vector3::new(params[3], params[4], params[5]);

    let mut residual = DVector::zeros(2 * model_points.len());
    for (i, (point, observed)) in model_points.iter().zip(image_points.iter()).enumerate() {
        let camera_space = rotation * point + translation;
        if camera_space.z < MIN_DEPTH_MM {
            return None;
        }
        residual[2 * i] = intrinsics.fx * camera_space.x / camera_space.z + intrinsics.cx
            - observed.x;
        residual[2 * i + 1] = intrinsics.fy * camera_space.y / camera_space.z + intrinsics.cy
            - observed.y;
    }
    Some(residual)
}

/// Central-difference Jacobian of the residual vector
fn jacobian(
    intrinsics: &CameraIntrinsics,
    model_points: &[Point3<f64>],
    image_points: &[LandmarkPoint],
    params: &[f64; 6],
) -> Option<DMatrix<f64>> {
    let mut jac = DMatrix::zeros(2 * model_points.len(), 6);
    for col in 0..6 {
        let h = 1e-6 * (1.0 + params[col].abs());
        let mut plus = *params;
        plus[col] += h;
        let mut minus = *params;
        minus[col] -= h;

        let r_plus = residuals(intrinsics, model_points, image_points, &plus)?;
        let r_minus = residuals(intrinsics, model_points, image_points, &minus)?;
        jac.set_column(col, &((r_plus - r_minus) / (2.0 * h)));
    }
    Some(jac)
}

/// Depth from apparent scale, then the image centroid back-projected
fn seed_translation(
    intrinsics: &CameraIntrinsics,
    model_points: &[Point3<f64>],
    image_points: &[LandmarkPoint],
    rotation: &Rotation3<f64>,
) -> Vector3<f64> {
    let n = model_points.len() as f64;

    let model_centroid: Vector3<f64> =
        model_points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n;
    let model_rms = (model_points
        .iter()
        .map(|p| (p.coords - model_centroid).norm_squared())
        .sum::<f64>()
        / n)
        .sqrt();

    let image_cx = image_points.iter().map(|p| p.x).sum::<f64>() / n;
    let image_cy = image_points.iter().map(|p| p.y).sum::<f64>() / n;
    let image_rms = (image_points
        .iter()
        .map(|p| {
            let dx = p.x - image_cx;
            let dy = p.y - image_cy;
            dx * dx + dy * dy
        })
        .sum::<f64>()
        / n)
        .sqrt();

    let depth = if image_rms > 1.0 {
        intrinsics.fx * model_rms / image_rms
    } else {
        intrinsics.fx
    };
    let back_projected = Vector3::new(
        (image_cx - intrinsics.cx) * depth / intrinsics.fx,
        (image_cy - intrinsics.cy) * depth / intrinsics.fy,
        depth,
    );
    back_projected - rotation * model_centroid
}

/// Near-collinear 2D points give an unobservable pose; checked via the
/// eigenvalue ratio of the point covariance.
fn is_degenerate(image_points: &[LandmarkPoint]) -> bool {
    let n = image_points.len() as f64;
    let mean_x = image_points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = image_points.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in image_points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let disc = (trace * trace - 4.0 * det).max(0.0).sqrt();
    let lambda_max = (trace + disc) / 2.0;
    let lambda_min = (trace - disc) / 2.0;

    lambda_max <= f64::EPSILON || lambda_min <= 1e-4 * lambda_max
}
