//! Unit conversion
//!
//! Raw motion readings arrive as 16-bit ADC codes. This module rescales them into
//! signed physical ranges:
//! - Angular rate: ±500 deg/s
//! - Acceleration: ±4 g
//! - Magnetic field: ±4 gauss

use serde::{Deserialize, Serialize};

/// ADC resolution of the motion sensor, in bits
pub const ADC_RESOLUTION_BITS: i32 = 16;

/// Full-scale angular rate (deg/s)
pub const MAX_ANGULAR_RATE_DPS: f64 = 500.0;

/// Full-scale acceleration (g)
pub const MAX_ACCELERATION_G: f64 = 4.0;

/// Full-scale magnetic field (gauss)
pub const MAX_MAGNETIC_FIELD_GAUSS: f64 = 4.0;

/// Physical quantity measured by a motion channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalQuantity {
    AngularRate,
    Acceleration,
    MagneticField,
}

impl PhysicalQuantity {
    /// Full-scale value of the signed physical range
    pub fn max_scale(&self) -> f64 {
        match self {
            PhysicalQuantity::AngularRate => MAX_ANGULAR_RATE_DPS,
            PhysicalQuantity::Acceleration => MAX_ACCELERATION_G,
            PhysicalQuantity::MagneticField => MAX_MAGNETIC_FIELD_GAUSS,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            PhysicalQuantity::AngularRate => "dps",
            PhysicalQuantity::Acceleration => "g",
            PhysicalQuantity::MagneticField => "gauss",
        }
    }

    /// Convert a raw ADC code for this quantity
    pub fn convert(&self, raw: f64) -> f64 {
        convert(raw, self.max_scale())
    }
}

/// Rescale a raw ADC code into `[-max_scale, max_scale)`.
///
/// `physical = (raw * 4 * max_scale * 2) / 2^16 - max_scale`
pub fn convert(raw: f64, max_scale: f64) -> f64 {
    (raw * 4.0 * max_scale * 2.0) / 2f64.powi(ADC_RESOLUTION_BITS) - max_scale
}

/// Gyroscope reading in deg/s
pub fn convert_angular_rate(raw: f64) -> f64 {
    convert(raw, MAX_ANGULAR_RATE_DPS)
}

/// Accelerometer reading in g
pub fn convert_acceleration(raw: f64) -> f64 {
    convert(raw, MAX_ACCELERATION_G)
}

/// Magnetometer reading in gauss
pub fn convert_magnetic_field(raw: f64) -> f64 {
    convert(raw, MAX_MAGNETIC_FIELD_GAUSS)
}
