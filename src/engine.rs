//! The real-time loop and its cross-thread control surface.

use crate::calibration::Calibration;
use crate::mapping::{identity_axes, AxisMapping};
use crate::pipeline::{run_cycle, CycleKind};
use crate::timing;
use crate::types::{Axis, Pose, Snapshot};
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Produces the latest raw 6DOF sample. Non-blocking, latest-value
/// semantics: a slow producer means the same value is returned again. A
/// transient fault is reported as [`EngineError::Source`]; the loop logs it
/// and keeps the previous sample.
///
/// [`EngineError::Source`]: crate::EngineError::Source
pub trait Source: Send {
    fn sample(&mut self) -> Result<Pose>;
}

/// Optional smoothing stage, called at most once per cycle with the mapped
/// pre-filter pose. Absence means identity pass-through.
pub trait Filter: Send {
    fn filter(&mut self, pose: Pose) -> Pose;
}

/// Consumes the final output pose each cycle. Must return in bounded time;
/// a delivery error is logged and the cycle's output dropped.
pub trait Sink: Send {
    fn deliver(&mut self, pose: Pose) -> Result<()>;
}

/// State shared between the worker thread and control threads.
///
/// Everything except the snapshot is a relaxed atomic consulted once per
/// cycle; a write may take effect a cycle late, which is the documented
/// worst case. The snapshot pair alone needs the mutex so readers never see
/// fields from two different cycles.
pub(crate) struct SharedState {
    stop: AtomicBool,
    enabled: AtomicBool,
    center: AtomicBool,
    zero: AtomicBool,
    compensate: AtomicBool,
    compensate_bypass_z: AtomicBool,
    pub(crate) axes: [AxisMapping; 6],
    snapshot: Mutex<Snapshot>,
}

impl SharedState {
    pub(crate) fn new(axes: [AxisMapping; 6], compensate: bool, bypass_z: bool) -> SharedState {
        SharedState {
            stop: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
            center: AtomicBool::new(false),
            zero: AtomicBool::new(false),
            compensate: AtomicBool::new(compensate),
            compensate_bypass_z: AtomicBool::new(bypass_z),
            axes,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn zero_engaged(&self) -> bool {
        self.zero.load(Ordering::Relaxed)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn request_center(&self) {
        self.center.store(true, Ordering::Relaxed);
    }

    /// Consume the one-shot center request.
    pub(crate) fn take_center_request(&self) -> bool {
        self.center.swap(false, Ordering::Relaxed)
    }

    pub(crate) fn set_zero(&self, engaged: bool) {
        self.zero.store(engaged, Ordering::Relaxed);
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub(crate) fn compensation_enabled(&self) -> bool {
        self.compensate.load(Ordering::Relaxed)
    }

    pub(crate) fn compensation_bypass_z(&self) -> bool {
        self.compensate_bypass_z.load(Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        if let Ok(mut slot) = self.snapshot.lock() {
            *slot = snapshot;
        }
    }

    pub(crate) fn latest(&self) -> Snapshot {
        self.snapshot.lock().map(|s| *s).unwrap_or_default()
    }
}

/// Engine construction parameters.
///
/// `axes` is the per-channel mapping configuration; it stays writable from
/// any thread after start through [`Engine::axis`].
pub struct EngineConfig {
    /// Target cycle period. Each cycle compensates only for its own
    /// overrun; there is no drift correction across cycles.
    pub period: Duration,
    pub compensate_translation: bool,
    pub compensate_bypass_z: bool,
    pub axes: [AxisMapping; 6],
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            period: Duration::from_millis(3),
            compensate_translation: false,
            compensate_bypass_z: false,
            axes: identity_axes(),
        }
    }
}

/// Handle to a running pose-processing engine.
///
/// A dedicated worker thread pulls samples, runs the pipeline, and paces
/// itself against the configured period. All control methods are safe from
/// any thread; effects become visible from some subsequent cycle. Stopping
/// is terminal: dropping the handle (or calling [`Engine::stop`]) runs the
/// shutdown pass and joins the worker.
pub struct Engine {
    shared: Arc<SharedState>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Engine {
    /// Spawn the worker thread with the given capabilities. The engine does
    /// no discovery of its own; source, filter, and sink are injected here.
    pub fn start(
        config: EngineConfig,
        source: impl Source + 'static,
        filter: Option<Box<dyn Filter>>,
        sink: impl Sink + 'static,
    ) -> Result<Engine> {
        let shared = Arc::new(SharedState::new(
            config.axes,
            config.compensate_translation,
            config.compensate_bypass_z,
        ));
        let loop_shared = shared.clone();
        let period = config.period;

        let thread = std::thread::Builder::new()
            .name("posepipe-loop".into())
            .spawn(move || run_loop(loop_shared, source, filter, sink, period))?;

        Ok(Engine {
            shared,
            thread: Some(thread),
        })
    }

    /// Freeze (`false`) or resume (`true`) consumption of new samples. While
    /// frozen the pipeline keeps running on the held sample, so centering,
    /// zeroing, and mapping changes stay live.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.set_enabled(enabled);
    }

    /// Request a one-shot re-anchor to the current pose, serviced on a
    /// subsequent cycle.
    pub fn request_center(&self) {
        self.shared.request_center();
    }

    /// Engage or release the continuous freeze at the origin.
    pub fn set_zero_engaged(&self, engaged: bool) {
        self.shared.set_zero(engaged);
    }

    pub fn set_compensation(&self, enabled: bool, bypass_z: bool) {
        self.shared.compensate.store(enabled, Ordering::Relaxed);
        self.shared
            .compensate_bypass_z
            .store(bypass_z, Ordering::Relaxed);
    }

    /// Per-channel mapping configuration, writable from any thread.
    pub fn axis(&self, axis: Axis) -> &AxisMapping {
        &self.shared.axes[axis as usize]
    }

    /// The last committed cycle's (mapped, raw) pose pair.
    pub fn latest(&self) -> Snapshot {
        self.shared.latest()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.stop_requested()
    }

    /// Stop the loop and wait for the worker to finish its shutdown pass.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.shared.request_stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The worker loop. Observes the stop flag at the top of each iteration,
/// so shutdown latency is bounded by one period plus one cycle.
fn run_loop<S: Source, K: Sink>(
    shared: Arc<SharedState>,
    mut source: S,
    mut filter: Option<Box<dyn Filter>>,
    mut sink: K,
    period: Duration,
) {
    let _timer = timing::TimerResolution::acquire();
    let mut calibration = Calibration::default();
    let mut newpose = Pose::ZERO;

    log::info!("pose loop started, period {:?}", period);

    while !shared.stop_requested() {
        let start = Instant::now();

        match source.sample() {
            Ok(sample) => {
                if shared.enabled() {
                    newpose = sample;
                }
            }
            Err(e) => log::warn!("source pull failed, holding last sample: {}", e),
        }

        run_cycle(
            newpose,
            CycleKind::Normal,
            &shared,
            &mut calibration,
            filter.as_mut().map(|f| &mut **f as &mut dyn Filter),
            &mut sink,
        );

        timing::sleep_remainder(start, period);
    }

    log::info!("pose loop stopping");

    // one last pass with the origin pose, then release the curves
    run_cycle(
        Pose::ZERO,
        CycleKind::Shutdown,
        &shared,
        &mut calibration,
        filter.as_mut().map(|f| &mut **f as &mut dyn Filter),
        &mut sink,
    );
    for axis in &shared.axes {
        axis.deactivate();
    }

    log::info!("pose loop stopped");
}
