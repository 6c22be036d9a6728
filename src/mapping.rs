//! Per-axis response mapping.
//!
//! Each output channel owns a primary and an alternate response curve, an
//! invert flag, a zero offset, and a source-channel index for the final
//! axis remap. All scalar fields are mutable from any thread; the loop
//! reads them once per cycle with relaxed ordering, so a write may take
//! effect one cycle late. That staleness is tolerated to keep the hot loop
//! free of heavier synchronization.

use crate::types::Axis;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};

/// A scalar response curve.
///
/// `set_active` is invoked every cycle to mark which of the two curves the
/// mapping selected; implementations can expose that state (e.g. to
/// highlight the live curve in a UI). Implementations must be cheap and
/// side-effect free in `value`.
pub trait Curve: Send + Sync {
    fn value(&self, x: f64) -> f64;
    fn set_active(&self, active: bool);
    fn is_active(&self) -> bool;
}

/// Stock curve: `y = scale * x`. `scale = 1.0` is the identity curve.
pub struct LinearCurve {
    scale: f64,
    active: AtomicBool,
}

impl LinearCurve {
    pub fn new(scale: f64) -> LinearCurve {
        LinearCurve {
            scale,
            active: AtomicBool::new(false),
        }
    }

    pub fn identity() -> LinearCurve {
        LinearCurve::new(1.0)
    }
}

impl Curve for LinearCurve {
    fn value(&self, x: f64) -> f64 {
        self.scale * x
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// f64 stored as raw bits so it can sit in shared config without a lock.
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(v: f64) -> AtomicF64 {
        AtomicF64(AtomicU64::new(v.to_bits()))
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// One identity mapping per channel, each wired straight through from its
/// own index.
pub fn identity_axes() -> [AxisMapping; 6] {
    std::array::from_fn(|i| AxisMapping::identity(Axis::ALL[i]))
}

/// Configuration and response curves for one output channel.
pub struct AxisMapping {
    invert: AtomicBool,
    alt_sign: AtomicBool,
    zero_offset: AtomicF64,
    source: AtomicI32,
    curve: Box<dyn Curve>,
    alt_curve: Box<dyn Curve>,
}

impl AxisMapping {
    pub fn new(curve: Box<dyn Curve>, alt_curve: Box<dyn Curve>, source: Axis) -> AxisMapping {
        AxisMapping {
            invert: AtomicBool::new(false),
            alt_sign: AtomicBool::new(false),
            zero_offset: AtomicF64::new(0.0),
            source: AtomicI32::new(source as i32),
            curve,
            alt_curve,
        }
    }

    /// Identity curves wired straight through from the same-index channel.
    pub fn identity(axis: Axis) -> AxisMapping {
        AxisMapping::new(
            Box::new(LinearCurve::identity()),
            Box::new(LinearCurve::identity()),
            axis,
        )
    }

    pub fn invert(&self) -> bool {
        self.invert.load(Ordering::Relaxed)
    }

    pub fn set_invert(&self, invert: bool) {
        self.invert.store(invert, Ordering::Relaxed);
    }

    pub fn alt_sign(&self) -> bool {
        self.alt_sign.load(Ordering::Relaxed)
    }

    pub fn set_alt_sign(&self, enabled: bool) {
        self.alt_sign.store(enabled, Ordering::Relaxed);
    }

    pub fn zero_offset(&self) -> f64 {
        self.zero_offset.get()
    }

    pub fn set_zero_offset(&self, offset: f64) {
        self.zero_offset.set(offset);
    }

    /// Source channel for the final axis remap. Anything outside `[0, 6)`
    /// mutes the channel; use -1 as the conventional mute value.
    pub fn source(&self) -> i32 {
        self.source.load(Ordering::Relaxed)
    }

    pub fn set_source(&self, source: i32) {
        self.source.store(source, Ordering::Relaxed);
    }

    pub fn curve(&self) -> &dyn Curve {
        self.curve.as_ref()
    }

    pub fn alt_curve(&self) -> &dyn Curve {
        self.alt_curve.as_ref()
    }

    /// Map one raw scalar through the channel's response curve.
    ///
    /// `invert` is the caller's per-cycle snapshot of the invert flag, so
    /// curve selection here and the sign flip later in the cycle agree even
    /// if the flag is written mid-cycle. The alternate curve handles the
    /// "wrong-sign" half of the range when enabled.
    pub fn map(&self, raw: f64, invert: bool) -> f64 {
        let alt = (raw < 0.0) == !invert && self.alt_sign();
        self.curve.set_active(!alt);
        self.alt_curve.set_active(alt);
        let fc = if alt { &self.alt_curve } else { &self.curve };
        fc.value(raw) + self.zero_offset.get()
    }

    /// Mark both curves inactive. Signals consumers that tracking ceased.
    pub fn deactivate(&self) {
        self.curve.set_active(false);
        self.alt_curve.set_active(false);
    }
}
