//! Drift integration
//!
//! Angular-rate readings are dead-zone filtered and summed per axis into an
//! open-loop running integral. The sum is never reset, decayed or clamped, so it
//! tracks sustained head motion rather than instantaneous jitter. Before the sum
//! is used for classification it is gated against a baseline magnitude.

use crate::types::AxisTriple;
use serde::{Deserialize, Serialize};

/// Readings with a magnitude below this (deg/s) contribute nothing
pub const NOISE_THRESHOLD: f64 = 20.0;

/// Accumulated drift below this magnitude is treated as no motion
pub const BASELINE_THRESHOLD: f64 = 1000.0;

/// Zero out readings inside the noise dead zone
pub fn dead_zone(value: f64) -> f64 {
    if value.abs() < NOISE_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Effective value of an accumulator: zero until it reaches the baseline
pub fn baseline_gate(sum: f64) -> f64 {
    if sum.abs() < BASELINE_THRESHOLD {
        0.0
    } else {
        sum
    }
}

/// Result of feeding one frame into the integral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegralStep {
    /// Dead-zone filtered contribution of this frame
    pub filtered: AxisTriple,
    /// Accumulators after this frame
    pub sums: AxisTriple,
    /// Baseline-gated accumulators used for classification
    pub effective: AxisTriple,
}

/// Unbounded per-axis running sum of filtered angular rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningIntegral {
    sums: AxisTriple,
}

impl RunningIntegral {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter a frame of physical readings, add it, and gate the new sums
    pub fn update(&mut self, physical: AxisTriple) -> IntegralStep {
        let filtered = AxisTriple::new(
            dead_zone(physical.x),
            dead_zone(physical.y),
            dead_zone(physical.z),
        );

        self.sums.x += filtered.x;
        self.sums.y += filtered.y;
        self.sums.z += filtered.z;

        IntegralStep {
            filtered,
            sums: self.sums,
            effective: self.effective(),
        }
    }

    /// Raw accumulator values
    pub fn sums(&self) -> AxisTriple {
        self.sums
    }

    /// Baseline-gated accumulator values
    pub fn effective(&self) -> AxisTriple {
        AxisTriple::new(
            baseline_gate(self.sums.x),
            baseline_gate(self.sums.y),
            baseline_gate(self.sums.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dead_zone_boundary() {
        assert_eq!(dead_zone(19.999), 0.0);
        assert_eq!(dead_zone(-19.999), 0.0);
        assert_eq!(dead_zone(20.0), 20.0);
        assert_eq!(dead_zone(-20.0), -20.0);
        assert_eq!(dead_zone(-25.0), -25.0);
    }

    #[test]
    fn test_baseline_gate_boundary() {
        assert_eq!(baseline_gate(999.0), 0.0);
        assert_eq!(baseline_gate(-999.0), 0.0);
        assert_eq!(baseline_gate(1000.0), 1000.0);
        assert_eq!(baseline_gate(-1000.0), -1000.0);
    }

    #[test]
    fn test_sum_of_filtered_inputs() {
        let mut integral = RunningIntegral::new();
        let inputs = [
            AxisTriple::new(5.0, -25.0, 30.0),
            AxisTriple::new(40.0, -10.0, 30.0),
            AxisTriple::new(-60.0, -300.0, 19.0),
        ];
        for input in inputs {
            integral.update(input);
        }

        // 5, -10 and 19 fall inside the dead zone
        assert_eq!(integral.sums(), AxisTriple::new(-20.0, -325.0, 60.0));
    }

    #[test]
    fn test_no_clamp_or_decay() {
        let mut integral = RunningIntegral::new();
        for _ in 0..100 {
            integral.update(AxisTriple::new(0.0, 500.0, -500.0));
        }
        assert_eq!(integral.sums(), AxisTriple::new(0.0, 50_000.0, -50_000.0));
        assert_eq!(integral.effective(), integral.sums());
    }

    #[test]
    fn test_step_reports_gated_sums() {
        let mut integral = RunningIntegral::new();
        let step = integral.update(AxisTriple::new(0.0, -500.0, 499.0));
        assert_eq!(step.filtered, AxisTriple::new(0.0, -500.0, 499.0));
        assert_eq!(step.effective, AxisTriple::new(0.0, 0.0, 0.0));

        let step = integral.update(AxisTriple::new(0.0, -500.0, 501.0));
        assert_eq!(step.sums, AxisTriple::new(0.0, -1000.0, 1000.0));
        assert_eq!(step.effective, AxisTriple::new(0.0, -1000.0, 1000.0));
    }
}
