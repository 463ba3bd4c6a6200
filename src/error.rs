//! Error types for headmotion

use crate::schema::ValidationError;
use thiserror::Error;

/// Errors that can occur while processing a motion stream
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("Failed to parse stream event: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stream event: {0}")]
    InvalidEvent(#[from] ValidationError),

    #[error("Frame received before the stream header")]
    HeaderMissing,

    #[error("Stream header already declared for this session")]
    HeaderAlreadyDeclared,

    #[error("Frame arity mismatch: header declares {expected} columns, frame has {actual}")]
    FrameArity { expected: usize, actual: usize },

    #[error("Non-numeric value in column {column} (index {index})")]
    NonNumericField { column: String, index: usize },

    #[error("Row sink is unavailable")]
    SinkUnavailable,

    #[error("Event for stream '{actual}' sent to a session bound to '{expected}'")]
    StreamMismatch { expected: String, actual: String },
}
