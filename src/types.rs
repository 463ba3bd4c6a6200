//! Core types for the headmotion pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: stream field values, resolved sensor variants, gesture flags,
//! orientation types, and the output rows handed to a sink.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor layout detected from the stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorVariant {
    /// Two angular-rate channels (GYROX, GYROY)
    AngularRateDual,
    /// Three angular-rate channels (GYROX, GYROY, GYROZ), reported in dps
    AngularRateTriple,
    /// Four quaternion components (Q0..Q3)
    Quaternion,
    /// Header matched none of the known layouts
    Unknown,
}

impl SensorVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorVariant::AngularRateDual => "angular_rate_dual",
            SensorVariant::AngularRateTriple => "angular_rate_triple",
            SensorVariant::Quaternion => "quaternion",
            SensorVariant::Unknown => "unknown",
        }
    }

    /// Whether frames of this variant go through the gesture classifier
    pub fn is_classified(&self) -> bool {
        matches!(self, SensorVariant::AngularRateTriple)
    }
}

impl fmt::Display for SensorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scalar in a stream frame or output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One ordered row handed to the downstream sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub fields: Vec<FieldValue>,
}

impl OutputRow {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-axis values for the three spatial axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTriple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisTriple {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Head gesture flags derived from one frame
///
/// `look_down`/`look_up` and `tilt_left`/`tilt_right` are complementary pairs:
/// exactly one flag of each pair is set on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureState {
    /// Action1: effective pitch integral is negative
    pub look_down: bool,
    /// Action2: effective pitch integral is zero or positive
    pub look_up: bool,
    /// Action3: effective roll integral is negative
    pub tilt_left: bool,
    /// Action4: effective roll integral is zero or positive
    pub tilt_right: bool,
}

impl GestureState {
    /// Flags in Action1..Action4 order, as 0/1
    pub fn as_flags(&self) -> [u8; 4] {
        [
            self.look_down as u8,
            self.look_up as u8,
            self.tilt_left as u8,
            self.tilt_right as u8,
        ]
    }
}

/// Orientation sample as a (not necessarily unit) quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }
}

/// Roll, pitch, yaw in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn to_degrees(self) -> Self {
        Self {
            roll: self.roll.to_degrees(),
            pitch: self.pitch.to_degrees(),
            yaw: self.yaw.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Number(1.0).to_string(), "1");
        assert_eq!(FieldValue::Number(-25.5).to_string(), "-25.5");
        assert_eq!(FieldValue::from("GYROX").to_string(), "GYROX");
    }

    #[test]
    fn test_field_value_deserializes_mixed() {
        let values: Vec<FieldValue> = serde_json::from_str(r#"[1.5, "label", 3]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Number(1.5),
                FieldValue::Text("label".to_string()),
                FieldValue::Number(3.0),
            ]
        );
    }

    #[test]
    fn test_gesture_flags_order() {
        let state = GestureState {
            look_down: true,
            look_up: false,
            tilt_left: false,
            tilt_right: true,
        };
        assert_eq!(state.as_flags(), [1, 0, 0, 1]);
    }

    #[test]
    fn test_variant_serialization() {
        let json = serde_json::to_string(&SensorVariant::AngularRateTriple).unwrap();
        assert_eq!(json, "\"angular_rate_triple\"");
        assert!(SensorVariant::AngularRateTriple.is_classified());
        assert!(!SensorVariant::Quaternion.is_classified());
    }
}
