//! # Trajectory module
//!
//! Trajectories are functions of time giving the desired position and velocity of the vehicle.
//! One dimensional trajectories describe a single axis, four dimensional trajectories describe
//! x, y, z and yaw together.
//!
//! Every generator anchors its own time zero to the first time it is queried with, so a
//! trajectory behaves the same whether it is first sampled at 0 s or at 10,000 s. The anchor is
//! set exactly once per instance and never reset, which is why sampling takes `&mut self`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod choreo;
mod hold;
mod line;
mod periodic;
mod swing;

pub use choreo::{Choreography, ChoreographyBuilder, SegmentBuilder};
pub use hold::{Hold1d, Hold4d};
pub use line::{Linear1d, StraightLine4d};
pub use periodic::{Circle4d, ConstantVelocityAngular1d, YawMode};
pub use swing::{ConstantSwing1d, Swing4d};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geom::{InertialFrameVelocity, Pose};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Ceiling on the linear speed of any checked trajectory. Also applied to yaw rates, in rad/s.
pub const MAX_ABSOLUTE_SPEED_MS: f64 = 1.0;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trajectory along a single axis.
pub trait Trajectory1d: Send {
    /// Desired position at the given time.
    fn position(&mut self, time_s: f64) -> f64;

    /// Desired velocity at the given time.
    fn velocity(&mut self, time_s: f64) -> f64;
}

/// A trajectory in x, y, z and yaw.
pub trait Trajectory4d: Send {
    /// Desired pose at the given time.
    fn position(&mut self, time_s: f64) -> Pose;

    /// Desired velocity at the given time.
    fn velocity(&mut self, time_s: f64) -> InertialFrameVelocity;

    /// Desired pose and velocity sampled together at the given time.
    fn state(&mut self, time_s: f64) -> (Pose, InertialFrameVelocity) {
        (self.position(time_s), self.velocity(time_s))
    }
}

/// A trajectory which is only meaningful for a known length of time.
pub trait FiniteTrajectory4d: Trajectory4d {
    /// Length of the trajectory in seconds.
    fn duration_s(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The time zero of a trajectory, set by the first query.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TimeAnchor {
    start_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while configuring a trajectory.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum TrajError {
    #[error(
        "Trajectory would reach {speed_ms} (m or rad)/s which exceeds the limit of {limit_ms}"
    )]
    SpeedLimitExceeded { speed_ms: f64, limit_ms: f64 },

    #[error("Expected a positive finite speed, found {0}")]
    InvalidSpeed(f64),

    #[error("Expected a positive finite duration, found {0} s")]
    InvalidDuration(f64),

    #[error("Trajectory parameter {name} is not finite ({value})")]
    NonFiniteParameter { name: &'static str, value: f64 },

    #[error("A choreography must contain at least one segment")]
    EmptyChoreography,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimeAnchor {
    /// Time relative to the anchor, anchoring on this time if this is the first call.
    pub fn relative(&mut self, time_s: f64) -> f64 {
        let start_s = *self.start_s.get_or_insert(time_s);
        time_s - start_s
    }

    /// The anchor time, if set.
    pub fn start_s(&self) -> Option<f64> {
        self.start_s
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Fail if the magnitude of `speed` is above the trajectory speed ceiling.
pub(crate) fn check_speed(speed: f64) -> Result<(), TrajError> {
    check_finite("speed", speed)?;

    if speed.abs() > MAX_ABSOLUTE_SPEED_MS {
        Err(TrajError::SpeedLimitExceeded {
            speed_ms: speed.abs(),
            limit_ms: MAX_ABSOLUTE_SPEED_MS,
        })
    } else {
        Ok(())
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<(), TrajError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TrajError::NonFiniteParameter { name, value })
    }
}

pub(crate) fn check_duration(duration_s: f64) -> Result<(), TrajError> {
    if duration_s.is_finite() && duration_s > 0.0 {
        Ok(())
    } else {
        Err(TrajError::InvalidDuration(duration_s))
    }
}
