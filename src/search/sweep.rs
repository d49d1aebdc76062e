//! Angle schedule for the rotation sweep.

use crate::util::{RotMatchError, RotMatchResult};

/// Upper bound on the number of angles a single sweep may evaluate.
const MAX_SWEEP_ANGLES: usize = 1_000_000;

/// Non-fatal problems with an angle sweep configuration.
///
/// These are reported (trace warning and `MatchReport::warnings`) but never
/// abort a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigWarning {
    /// The step is larger than the half range; only the two end angles run.
    StepExceedsRange { half_range_deg: f64, step_deg: f64 },
    /// The step is negative; it is treated as zero (a single angle).
    NegativeStep { step_deg: f64 },
}

/// Inclusive sweep from `-half_range_deg` to `+half_range_deg`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleSweep {
    half_range_deg: f64,
    step_deg: f64,
}

impl AngleSweep {
    /// Creates a sweep; the half range must be finite and non-negative.
    pub fn new(half_range_deg: f64, step_deg: f64) -> RotMatchResult<Self> {
        if !half_range_deg.is_finite() || !step_deg.is_finite() {
            return Err(RotMatchError::InvalidInput("non-finite angle sweep parameters"));
        }
        if half_range_deg < 0.0 {
            return Err(RotMatchError::InvalidInput("angle half range must be >= 0"));
        }
        let sweep = Self {
            half_range_deg,
            step_deg,
        };
        if sweep.len() > MAX_SWEEP_ANGLES {
            return Err(RotMatchError::InvalidInput("angle step too small for range"));
        }
        Ok(sweep)
    }

    /// Returns the half range in degrees.
    pub fn half_range_deg(&self) -> f64 {
        self.half_range_deg
    }

    /// Returns the configured step in degrees.
    pub fn step_deg(&self) -> f64 {
        self.step_deg
    }

    /// Returns the configuration warnings for this sweep.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        if self.step_deg < 0.0 {
            out.push(ConfigWarning::NegativeStep {
                step_deg: self.step_deg,
            });
        } else if self.step_deg > self.half_range_deg {
            out.push(ConfigWarning::StepExceedsRange {
                half_range_deg: self.half_range_deg,
                step_deg: self.step_deg,
            });
        }
        out
    }

    fn steps(&self) -> usize {
        if self.step_deg <= 0.0 {
            return 0;
        }
        let ratio = 2.0 * self.half_range_deg / self.step_deg;
        if ratio >= MAX_SWEEP_ANGLES as f64 {
            return MAX_SWEEP_ANGLES;
        }
        (ratio + 1e-9).floor() as usize
    }

    /// Returns the number of angles the sweep evaluates.
    pub fn len(&self) -> usize {
        let steps = self.steps();
        if self.step_deg <= 0.0 {
            return 1;
        }
        let last = -self.half_range_deg + steps as f64 * self.step_deg;
        if last < self.half_range_deg - 1e-9 {
            steps + 2
        } else {
            steps + 1
        }
    }

    /// Always false; a sweep evaluates at least one angle.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the angles in evaluation order.
    ///
    /// Angles start at `-half_range` and advance by `step`; the last one is
    /// clamped to `+half_range`, which is always included. A zero or negative
    /// step yields the single angle `-half_range`.
    pub fn angles(&self) -> Vec<f64> {
        let a = self.half_range_deg;
        if self.step_deg <= 0.0 {
            return vec![-a + 0.0];
        }
        let steps = self.steps();
        let mut out = Vec::with_capacity(steps + 2);
        for i in 0..=steps {
            let angle = (-a + i as f64 * self.step_deg).min(a);
            out.push(angle + 0.0);
        }
        if out.last().is_some_and(|&last| last < a - 1e-9) {
            out.push(a);
        }
        out
    }
}
