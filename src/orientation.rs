//! Quaternion to Euler angle conversion

use crate::types::{EulerAngles, Quaternion};
use std::f64::consts::FRAC_PI_2;

/// Convert an orientation quaternion to roll/pitch/yaw (radians).
///
/// The quaternion is used as given; pass a unit quaternion for exact angles.
/// At gimbal lock the pitch is clamped to ±π/2 instead of going NaN.
pub fn quaternion_to_euler(q: &Quaternion) -> EulerAngles {
    // roll (x-axis rotation)
    let sinr_cosp = 2.0 * (q.w * q.x + q.y * q.z);
    let cosr_cosp = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);

    // pitch (y-axis rotation)
    let sinp = 2.0 * (q.w * q.y - q.z * q.x);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    // yaw (z-axis rotation)
    let siny_cosp = 2.0 * (q.w * q.z + q.x * q.y);
    let cosy_cosp = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);

    EulerAngles {
        roll: sinr_cosp.atan2(cosr_cosp),
        pitch,
        yaw: siny_cosp.atan2(cosy_cosp),
    }
}

impl From<Quaternion> for EulerAngles {
    fn from(q: Quaternion) -> Self {
        quaternion_to_euler(&q)
    }
}
