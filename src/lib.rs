//! # posepipe - real-time 6DOF pose-processing engine
//!
//! Pulls raw 6DOF samples (three translations, three rotations) from a
//! source, applies calibration, per-axis response mapping, optional
//! smoothing, translation compensation, and axis remapping, and delivers
//! the result to a sink at a fixed cadence. Provides:
//! - Center (one-shot re-anchor) and zero (continuous freeze) calibration
//! - Per-channel curves, inversion, offsets, and cross-wiring/muting
//! - A paced worker thread with a thread-safe (mapped, raw) snapshot
//!
//! ## Quick Start
//! ```no_run
//! use posepipe::{channel_sink, channel_source, Engine, EngineConfig, Pose};
//!
//! let (sender, source) = channel_source(64);
//! let (sink, output) = channel_sink(64);
//! let engine = Engine::start(EngineConfig::default(), source, None, sink).unwrap();
//!
//! sender.send(Pose { x: 10.0, ..Pose::ZERO });
//! engine.request_center();
//! println!("latest: {:?}", engine.latest().mapped);
//! # drop(output);
//! engine.stop();
//! ```

pub mod adapters;
pub mod calibration;
pub mod engine;
pub mod error;
pub mod mapping;
mod pipeline;
pub mod rotation;
mod timing;
pub mod types;

pub use adapters::{channel_sink, channel_source, ChannelSink, ChannelSource, PoseSender};
pub use engine::{Engine, EngineConfig, Filter, Sink, Source};
pub use error::EngineError;
pub use mapping::{AxisMapping, Curve, LinearCurve};
pub use types::{Axis, Pose, Snapshot};

/// Result type alias for posepipe operations.
pub type Result<T> = std::result::Result<T, EngineError>;
