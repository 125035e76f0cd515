//! # Vehicle services
//!
//! Capabilities the flight software needs from the outside world. Implementations wrap a
//! particular vehicle's transport and state estimation, the core only ever sees these traits.
//!
//! All services are shared between the command executing a task and whoever else observes the
//! vehicle, so they take `&self` and must be `Send + Sync`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::geom::{BodyFrameVelocity, InertialFrameVelocity, Pose};
pub use comms_if::eqpt::flight::FlyingState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A snapshot from the state estimator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    pub pose: Pose,

    pub velocity: InertialFrameVelocity,

    /// Time at which the estimate was made, in the estimator's own clock.
    ///
    /// Only compared against other timestamps from the same estimator to detect stale data.
    pub timestamp_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Faults raised by vehicle services.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ServiceError {
    /// The message could not be sent this time, trying again may succeed
    #[error("Vehicle transport unavailable: {0}")]
    Unavailable(String),

    /// The link to the vehicle is gone for good
    #[error("Vehicle link disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Provides the latest estimate of the vehicle's state.
pub trait StateEstimator: Send + Sync {
    /// The latest state, or `None` if there has been no observation yet.
    fn current_state(&self) -> Option<DroneState>;

    fn current_pose(&self) -> Option<Pose> {
        self.current_state().map(|s| s.pose)
    }

    fn current_velocity(&self) -> Option<InertialFrameVelocity> {
        self.current_state().map(|s| s.velocity)
    }
}

/// Sends velocity commands to the vehicle.
pub trait VelocityIssuer: Send + Sync {
    fn send_velocity(&self, velocity: &BodyFrameVelocity) -> Result<(), ServiceError>;
}

/// Sends the takeoff signal.
pub trait TakeOffIssuer: Send + Sync {
    /// Ask the vehicle to take off, optionally to a given altitude.
    fn send_takeoff(&self, altitude_m: Option<f64>) -> Result<(), ServiceError>;
}

/// Sends the land signal.
pub trait LandIssuer: Send + Sync {
    fn send_land(&self) -> Result<(), ServiceError>;
}

/// Reports the vehicle's flight state.
pub trait FlyingStateObserver: Send + Sync {
    /// The most recent flight state, `Ok(None)` if none has been reported yet.
    ///
    /// `Err(ServiceError::Disconnected)` means no state will ever be reported again.
    fn current_flying_state(&self) -> Result<Option<FlyingState>, ServiceError>;
}
