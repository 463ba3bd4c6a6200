//! Headmotion - Head gesture detection for headset motion-sensor streams
//!
//! Headmotion consumes a named motion stream (a one-time header followed by
//! ordered frames) and turns it into delimited output rows through a
//! deterministic pipeline: header resolution → unit conversion → drift
//! integration → gesture classification → row sink.
//!
//! ## Modules
//!
//! - **Schema**: stream events and header resolution into a sensor variant
//! - **Units**: ADC code to dps / g / gauss conversion
//! - **Integrator / Classifier**: drift integral and the four head gestures
//! - **Orientation**: quaternion to Euler angle conversion

pub mod classifier;
pub mod error;
pub mod integrator;
pub mod orientation;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod types;
pub mod units;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::GestureClassifier;
pub use error::MotionError;
pub use orientation::quaternion_to_euler;
pub use pipeline::{process_stream, MotionSession, SessionOptions, SessionSummary};
pub use sink::{DelimitedWriter, RowSink};

// Schema exports
pub use schema::{ColumnSchema, StreamEvent, StreamEventAdapter, StreamHeader, DEFAULT_STREAM};

/// Headmotion version
pub const HEADMOTION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name stamped on every `SessionSummary`
pub const PRODUCER_NAME: &str = "headmotion";
