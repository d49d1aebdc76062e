//! Angle-swept template search.

mod angle;
mod sweep;

pub use angle::{match_with_angle, AngleMatch, SweepOptions};
pub use sweep::{AngleSweep, ConfigWarning};
