//! Header resolution
//!
//! The header of a motion stream tells us which sensor layout the headset
//! exposes. Resolution tests the known layouts in priority order and records
//! where each channel sits in the frame. Frames carry a leading timestamp that
//! the header does not declare, so a synthetic `Timestamp` column is prepended
//! before indices are taken.

use crate::error::MotionError;
use crate::types::{FieldValue, SensorVariant};
use serde::{Deserialize, Serialize};

/// Synthetic first column prepended to every header
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

pub const GYRO_X: &str = "GYROX";
pub const GYRO_Y: &str = "GYROY";
pub const GYRO_Z: &str = "GYROZ";

/// Quaternion components, scalar part first
pub const QUATERNION_COLUMNS: [&str; 4] = ["Q0", "Q1", "Q2", "Q3"];

/// Positions of the semantic channels within a frame
///
/// Every index of a variant is resolved, or the schema is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ColumnSchema {
    AngularRateDual { x: usize, y: usize },
    AngularRateTriple { x: usize, y: usize, z: usize },
    Quaternion { w: usize, x: usize, y: usize, z: usize },
    Unknown,
}

impl ColumnSchema {
    pub fn variant(&self) -> SensorVariant {
        match self {
            ColumnSchema::AngularRateDual { .. } => SensorVariant::AngularRateDual,
            ColumnSchema::AngularRateTriple { .. } => SensorVariant::AngularRateTriple,
            ColumnSchema::Quaternion { .. } => SensorVariant::Quaternion,
            ColumnSchema::Unknown => SensorVariant::Unknown,
        }
    }
}

/// Resolved stream header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamHeader {
    /// Declared columns with the synthetic timestamp prepended
    pub columns: Vec<String>,
    pub schema: ColumnSchema,
}

impl StreamHeader {
    /// Resolve a declared header into a variant and channel positions.
    ///
    /// Never fails: unrecognized layouts resolve to `ColumnSchema::Unknown`.
    pub fn resolve<S: AsRef<str>>(declared: &[S]) -> Self {
        let mut columns = Vec::with_capacity(declared.len() + 1);
        columns.push(TIMESTAMP_COLUMN.to_string());
        columns.extend(declared.iter().map(|c| c.as_ref().to_string()));

        let position = |name: &str| columns.iter().position(|c| c == name);

        let schema = match (position(GYRO_X), position(GYRO_Y), position(GYRO_Z)) {
            (Some(x), Some(y), Some(z)) => ColumnSchema::AngularRateTriple { x, y, z },
            (Some(x), Some(y), None) => ColumnSchema::AngularRateDual { x, y },
            _ => {
                let q: Vec<Option<usize>> =
                    QUATERNION_COLUMNS.iter().map(|&name| position(name)).collect();
                match q.as_slice() {
                    [Some(w), Some(x), Some(y), Some(z)] => ColumnSchema::Quaternion {
                        w: *w,
                        x: *x,
                        y: *y,
                        z: *z,
                    },
                    _ => ColumnSchema::Unknown,
                }
            }
        };

        Self { columns, schema }
    }

    pub fn variant(&self) -> SensorVariant {
        self.schema.variant()
    }

    /// Number of values every frame must carry
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Check a frame against the declared arity
    pub fn check_arity(&self, values: &[FieldValue]) -> Result<(), MotionError> {
        if values.len() != self.arity() {
            return Err(MotionError::FrameArity {
                expected: self.arity(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Read a numeric value at a resolved position; missing and text values
    /// are reported against the column name
    pub fn numeric(&self, values: &[FieldValue], index: usize) -> Result<f64, MotionError> {
        values
            .get(index)
            .and_then(FieldValue::as_f64)
            .ok_or_else(|| MotionError::NonNumericField {
                column: self.columns.get(index).cloned().unwrap_or_default(),
                index,
            })
    }
}
