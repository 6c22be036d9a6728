//! Center/zero calibration reference.
//!
//! Owned by the loop thread; the request flags that drive it live in the
//! shared engine state and are consumed once per cycle.

use crate::rotation::{self, Mat3};
use crate::types::Pose;

/// The anchor that all emitted poses are reported relative to.
///
/// Starts at identity/origin, overwritten only when a center request is
/// serviced; persists across cycles otherwise.
pub struct Calibration {
    reference_rotation: Mat3,
    reference_translation: [f64; 3],
}

impl Default for Calibration {
    fn default() -> Calibration {
        Calibration {
            reference_rotation: rotation::IDENTITY,
            reference_translation: [0.0; 3],
        }
    }
}

impl Calibration {
    /// Re-anchor the reference to the given pose (one-shot "center").
    pub fn center(&mut self, pose: &Pose) {
        let [yaw, pitch, roll] = pose.rotation();
        self.reference_translation = pose.translation();
        self.reference_rotation = rotation::euler_to_matrix(yaw, pitch, roll);
    }

    /// Reconstruct a working pose from the stored reference.
    ///
    /// Consumed each cycle while zeroing is engaged, in place of the live
    /// sample. Feeding this through `apply_delta` collapses the result to
    /// the origin by construction, which is exactly the intended continuous
    /// freeze.
    pub fn frozen_pose(&self) -> Pose {
        let euler = rotation::matrix_to_euler(&self.reference_rotation);
        Pose {
            x: self.reference_translation[0],
            y: self.reference_translation[1],
            z: self.reference_translation[2],
            yaw: euler[0],
            pitch: euler[1],
            roll: euler[2],
        }
    }

    /// Rewrite `pose` as a delta against the reference: translations get
    /// the reference subtracted, rotations become the orientation delta
    /// since the last center.
    pub fn apply_delta(&self, pose: &mut Pose) {
        let [yaw, pitch, roll] = pose.rotation();
        let rmat = rotation::euler_to_matrix(yaw, pitch, roll);
        let delta = rotation::mat_mul(&rmat, &rotation::transpose(&self.reference_rotation));
        let euler = rotation::matrix_to_euler(&delta);

        pose.x -= self.reference_translation[0];
        pose.y -= self.reference_translation[1];
        pose.z -= self.reference_translation[2];
        pose.yaw = euler[0];
        pose.pitch = euler[1];
        pose.roll = euler[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pose {
        Pose {
            x: 10.0,
            y: -3.0,
            z: 0.5,
            yaw: 25.0,
            pitch: -40.0,
            roll: 5.0,
        }
    }

    fn assert_origin(pose: &Pose, tol: f64) {
        for v in pose.to_array() {
            assert!(v.abs() < tol, "expected origin, got {:?}", pose);
        }
    }

    #[test]
    fn test_default_reference_is_identity() {
        let cal = Calibration::default();
        let mut pose = sample();
        let before = pose;
        cal.apply_delta(&mut pose);
        assert!((pose.x - before.x).abs() < 1e-12);
        assert!((pose.yaw - before.yaw).abs() < 1e-9);
        assert!((pose.pitch - before.pitch).abs() < 1e-9);
    }

    #[test]
    fn test_center_makes_same_pose_zero() {
        let mut cal = Calibration::default();
        let anchor = sample();
        cal.center(&anchor);

        let mut pose = anchor;
        cal.apply_delta(&mut pose);
        assert_origin(&pose, 1e-9);
    }

    #[test]
    fn test_delta_after_center() {
        let mut cal = Calibration::default();
        cal.center(&sample());

        let mut pose = sample();
        pose.x += 5.0;
        cal.apply_delta(&mut pose);
        assert!((pose.x - 5.0).abs() < 1e-9);
        assert!(pose.yaw.abs() < 1e-9);
    }

    #[test]
    fn test_frozen_pose_round_trips_reference() {
        let mut cal = Calibration::default();
        let anchor = sample();
        cal.center(&anchor);

        let frozen = cal.frozen_pose();
        assert!((frozen.x - anchor.x).abs() < 1e-12);
        assert!((frozen.yaw - anchor.yaw).abs() < 1e-9);
        assert!((frozen.pitch - anchor.pitch).abs() < 1e-9);
        assert!((frozen.roll - anchor.roll).abs() < 1e-9);

        // frozen pose fed back through the delta collapses to the origin
        let mut pose = frozen;
        cal.apply_delta(&mut pose);
        assert_origin(&pose, 1e-9);
    }
}
