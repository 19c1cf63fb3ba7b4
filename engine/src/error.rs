use std::time::Duration;

/// Failures of the engine process bridge.
///
/// `Clone` so that a single process failure can be delivered to every
/// queued caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Engine process unavailable: {0}")]
    ProcessUnavailable(String),
    #[error("Engine process error: {0}")]
    ProcessError(String),
    #[error("Engine process exited")]
    ProcessExited,
    #[error("Engine build failed ({status}):\n{output}")]
    BuildFailed { status: String, output: String },
    #[error("No engine response within {0:?}")]
    Timeout(Duration),
    #[error("Invalid engine response: {0}")]
    InvalidResponse(#[from] chess::MoveParseError),
    #[error("Engine rejected position: {0}")]
    PositionRejected(String),
}
