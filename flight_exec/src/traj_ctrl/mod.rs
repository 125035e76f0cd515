//! # Trajectory control module
//!
//! Trajectory control keeps the vehicle on a [`Trajectory4d`](crate::traj::Trajectory4d). Each
//! control tick the trajectory is sampled, compared against the latest state estimate, and four
//! independent PID controllers (x, y, z and yaw) produce a velocity command. The command is worked
//! out in the inertial frame and rotated into the body frame before being sent, since vehicles
//! are commanded relative to themselves.
//!
//! Yaw errors are wrapped so the vehicle always turns the short way round.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
pub use controllers::*;
pub use params::{FlightCtrlParams, ParamsError, PidParams};
use util::params::{load as load_params, LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the flight control parameter file in the params directory.
pub const PARAMS_FILE: &str = "flight_ctrl.toml";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Couldn't load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load and check the flight control parameters from the params directory.
pub fn load_flight_ctrl_params() -> Result<FlightCtrlParams, TrajCtrlError> {
    let params: FlightCtrlParams = load_params(PARAMS_FILE)?;
    params.validate()?;

    info!("Flight control parameters loaded from {}", PARAMS_FILE);

    Ok(params)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<LoadError> for TrajCtrlError {
    fn from(e: LoadError) -> Self {
        Self::ParamLoadError(e)
    }
}

impl From<ParamsError> for TrajCtrlError {
    fn from(e: ParamsError) -> Self {
        Self::InvalidParams(e)
    }
}
