/// Errors surfaced by the pose-processing engine.
///
/// Steady-state cycles never fail: degenerate rotations are handled by the
/// explicit gimbal branch in `rotation`, and an out-of-range axis remap
/// index means "mute", not "error". Capability faults reported here are
/// logged by the loop, which then continues with the previous sample.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("source error: {0}")]
    Source(String),

    #[error("sink error: {0}")]
    Sink(String),
}
