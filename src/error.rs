//! Error taxonomy for the burn-in pipeline
//!
//! Every failure kind here is recoverable: the pipeline returns to idle after
//! reporting it, and a later submission with valid inputs is accepted.

use thiserror::Error;

/// Burn pipeline errors
#[derive(Error, Debug)]
pub enum BurnError {
    #[error("invalid dimensions {width}x{height}: both sides must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unsupported rotation {0}: expected 0, 90, 180 or 270")]
    UnsupportedRotation(i64),

    #[error("empty {0} path")]
    EmptyPath(&'static str),

    #[error("no video stream in {0}")]
    NoVideoStream(String),

    #[error("probe failed: {0}")]
    ProbeFailed(String),

    #[error("transcoding engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("a transcode job is already running")]
    AlreadyRunning,

    #[error("transcode failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BurnError>;
