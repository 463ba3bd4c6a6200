//! Gesture classification
//!
//! Maps the baseline-gated drift integral onto four head gestures:
//! - Action1 look down: pitch (y) integral negative
//! - Action2 look up: pitch (y) integral zero or positive
//! - Action3 tilt left: roll (z) integral negative
//! - Action4 tilt right: roll (z) integral zero or positive

use crate::types::{AxisTriple, GestureState};

/// Output column names appended to classified rows, in flag order
pub const ACTION_COLUMNS: &[&str] = &["Action1", "Action2", "Action3", "Action4"];

/// Classifier for head gestures
pub struct GestureClassifier;

impl GestureClassifier {
    /// Classify from effective (baseline-gated) integrals.
    ///
    /// An effective value of exactly zero selects look-up and tilt-right.
    pub fn classify(effective: &AxisTriple) -> GestureState {
        GestureState {
            look_down: effective.y < 0.0,
            look_up: effective.y >= 0.0,
            tilt_left: effective.z < 0.0,
            tilt_right: effective.z >= 0.0,
        }
    }
}
