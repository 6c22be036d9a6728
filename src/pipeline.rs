//! The per-cycle pose pipeline.
//!
//! One cycle takes the working raw sample through zero-freeze substitution,
//! center servicing, the rotation/translation delta against the calibration
//! reference, per-channel mapping, the optional filter, axis inversion,
//! optional translation compensation, and the final axis remap, then hands
//! the result to the sink and publishes the snapshot pair.

use crate::calibration::Calibration;
use crate::engine::{Filter, SharedState, Sink};
use crate::rotation;
use crate::types::{Axis, Pose, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleKind {
    Normal,
    /// Final pass on stop: the working pose is forced to the origin and the
    /// calibration stages (zero reconstruction, centering, reference delta)
    /// are bypassed, so the sink's last input is the mapped origin pose.
    Shutdown,
}

pub(crate) fn run_cycle(
    raw: Pose,
    kind: CycleKind,
    shared: &SharedState,
    calibration: &mut Calibration,
    mut filter: Option<&mut dyn Filter>,
    sink: &mut dyn Sink,
) {
    // one snapshot of the invert flags per cycle, used both for curve
    // selection and the post-filter sign flip
    let inverts: [bool; 6] = std::array::from_fn(|i| shared.axes[i].invert());

    let (mut value, raw_report) = match kind {
        CycleKind::Shutdown => (Pose::ZERO, Pose::ZERO),
        CycleKind::Normal => {
            let working = if shared.zero_engaged() {
                calibration.frozen_pose()
            } else {
                raw
            };
            (working, working)
        }
    };

    if kind == CycleKind::Normal {
        if shared.take_center_request() {
            calibration.center(&value);
        }
        calibration.apply_delta(&mut value);
    }

    for (i, axis) in Axis::ALL.iter().enumerate() {
        value[*axis] = shared.axes[i].map(value[*axis], inverts[i]);
    }

    if let Some(f) = filter.as_mut() {
        value = f.filter(value);
    }

    // invert before compensation; the matrix rebuild below is sign-sensitive
    for (i, axis) in Axis::ALL.iter().enumerate() {
        if inverts[i] {
            value[*axis] = -value[*axis];
        }
    }

    if shared.compensation_enabled() {
        let rmat = rotation::euler_to_matrix(value.yaw, value.pitch, value.roll);
        let xyz = rotation::compensate_translation(
            &rmat,
            value.translation(),
            shared.compensation_bypass_z(),
        );
        value.x = xyz[0];
        value.y = xyz[1];
        value.z = xyz[2];
    }

    // axis remap: out-of-range source mutes the channel
    let mut output = Pose::ZERO;
    for (i, axis) in Axis::ALL.iter().enumerate() {
        output[*axis] = match Axis::from_index(shared.axes[i].source()) {
            Some(src) => value[src],
            None => 0.0,
        };
    }

    if let Err(e) = sink.deliver(output) {
        log::warn!("sink delivery failed: {}", e);
    }

    shared.publish(Snapshot {
        mapped: output,
        raw: raw_report,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::identity_axes;
    use crate::Result;

    struct VecSink(Vec<Pose>);

    impl Sink for VecSink {
        fn deliver(&mut self, pose: Pose) -> Result<()> {
            self.0.push(pose);
            Ok(())
        }
    }

    struct OffsetFilter(f64);

    impl Filter for OffsetFilter {
        fn filter(&mut self, mut pose: Pose) -> Pose {
            pose.x += self.0;
            pose
        }
    }

    fn shared() -> SharedState {
        SharedState::new(identity_axes(), false, false)
    }

    fn cycle(raw: Pose, shared: &SharedState, cal: &mut Calibration, sink: &mut VecSink) {
        run_cycle(raw, CycleKind::Normal, shared, cal, None, sink);
    }

    fn pose_x(x: f64) -> Pose {
        Pose { x, ..Pose::ZERO }
    }

    fn assert_pose_close(got: Pose, want: Pose, tol: f64) {
        for (g, w) in got.to_array().iter().zip(want.to_array()) {
            assert!((g - w).abs() < tol, "got {:?}, want {:?}", got, want);
        }
    }

    #[test]
    fn test_identity_passthrough() {
        let shared = shared();
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        cycle(pose_x(10.0), &shared, &mut cal, &mut sink);

        assert_pose_close(sink.0[0], pose_x(10.0), 1e-9);
        let snap = shared.latest();
        assert_pose_close(snap.mapped, pose_x(10.0), 1e-9);
        assert_pose_close(snap.raw, pose_x(10.0), 1e-9);
    }

    #[test]
    fn test_center_then_delta() {
        let shared = shared();
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        let anchor = Pose {
            x: 10.0,
            yaw: 30.0,
            ..Pose::ZERO
        };
        shared.request_center();
        cycle(anchor, &shared, &mut cal, &mut sink);
        assert_pose_close(*sink.0.last().unwrap(), Pose::ZERO, 1e-9);

        cycle(pose_x(15.0), &shared, &mut cal, &mut sink);
        let out = *sink.0.last().unwrap();
        assert!((out.x - 5.0).abs() < 1e-9);
        assert!((out.yaw - (-30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_engaged_forces_origin() {
        let shared = shared();
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        // anchor away from the origin first
        let anchor = Pose {
            x: 2.0,
            pitch: 15.0,
            ..Pose::ZERO
        };
        shared.request_center();
        cycle(anchor, &shared, &mut cal, &mut sink);

        shared.set_zero(true);
        for x in [50.0, -3.0, 0.25] {
            cycle(pose_x(x), &shared, &mut cal, &mut sink);
            assert_pose_close(*sink.0.last().unwrap(), Pose::ZERO, 1e-9);
            // the snapshot reports the frozen reference as the raw pose
            assert_pose_close(shared.latest().raw, anchor, 1e-9);
        }
    }

    #[test]
    fn test_filter_runs_before_inversion() {
        let shared = shared();
        shared.axes[0].set_invert(true);
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());
        let mut filter = OffsetFilter(1.0);

        run_cycle(
            pose_x(10.0),
            CycleKind::Normal,
            &shared,
            &mut cal,
            Some(&mut filter),
            &mut sink,
        );

        // mapped 10, filtered to 11, then sign-flipped
        assert!((sink.0[0].x - (-11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_translation_compensation() {
        let shared = SharedState::new(identity_axes(), true, false);
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        let raw = Pose {
            x: 1.0,
            yaw: 90.0,
            ..Pose::ZERO
        };
        cycle(raw, &shared, &mut cal, &mut sink);

        let out = sink.0[0];
        assert!(out.x.abs() < 1e-9);
        assert!(out.y.abs() < 1e-9);
        assert!((out.z - (-1.0)).abs() < 1e-9);
        assert!((out.yaw - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_compensation_bypass_z() {
        let shared = SharedState::new(identity_axes(), true, true);
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        let raw = Pose {
            x: 1.0,
            z: 7.0,
            yaw: 90.0,
            ..Pose::ZERO
        };
        cycle(raw, &shared, &mut cal, &mut sink);
        assert_eq!(sink.0[0].z, 7.0);
    }

    #[test]
    fn test_out_of_range_source_mutes() {
        let shared = shared();
        shared.axes[0].set_source(6);
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        cycle(pose_x(10.0), &shared, &mut cal, &mut sink);
        assert_eq!(sink.0[0].x, 0.0);
    }

    #[test]
    fn test_shutdown_bypasses_calibration() {
        let shared = shared();
        let mut cal = Calibration::default();
        let mut sink = VecSink(Vec::new());

        // a non-trivial reference must not leak into the shutdown pose
        shared.request_center();
        cycle(
            Pose {
                x: 4.0,
                yaw: 20.0,
                ..Pose::ZERO
            },
            &shared,
            &mut cal,
            &mut sink,
        );
        shared.set_zero(true);

        run_cycle(
            Pose::ZERO,
            CycleKind::Shutdown,
            &shared,
            &mut cal,
            None,
            &mut sink,
        );
        assert_eq!(*sink.0.last().unwrap(), Pose::ZERO);
        assert_eq!(shared.latest().raw, Pose::ZERO);
    }
}
