//! Takeoff command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use std::sync::Arc;

// Internal
use super::{run_periodic, CancelToken, CmdError, CmdStatus, Command, TickAction};
use crate::{
    services::{FlyingStateObserver, ServiceError, TakeOffIssuer},
    traj_ctrl::FlightCtrlParams,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time allowed for the vehicle to become airborne.
pub const DEFAULT_TAKEOFF_TIMEOUT_S: f64 = 10.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Take off and wait until the vehicle is hovering or flying.
///
/// The takeoff signal is repeated each poll until the vehicle reports it is taking off, since
/// delivery of a single signal is not guaranteed.
pub struct Takeoff {
    issuer: Arc<dyn TakeOffIssuer>,
    observer: Arc<dyn FlyingStateObserver>,
    altitude_m: Option<f64>,
    poll_period_s: f64,
    timeout_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Takeoff {
    pub fn new(
        issuer: Arc<dyn TakeOffIssuer>,
        observer: Arc<dyn FlyingStateObserver>,
        params: &FlightCtrlParams,
    ) -> Result<Self, CmdError> {
        params.validate()?;

        Ok(Self {
            issuer,
            observer,
            altitude_m: None,
            poll_period_s: params.poll_period_s,
            timeout_s: DEFAULT_TAKEOFF_TIMEOUT_S,
        })
    }

    /// Ask the vehicle to climb to the given altitude.
    pub fn with_altitude(mut self, altitude_m: f64) -> Result<Self, CmdError> {
        if !altitude_m.is_finite() {
            return Err(CmdError::NonFiniteArgument {
                name: "altitude_m",
                value: altitude_m,
            });
        }
        self.altitude_m = Some(altitude_m);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout_s: f64) -> Result<Self, CmdError> {
        super::check_duration(timeout_s)?;
        self.timeout_s = timeout_s;
        Ok(self)
    }
}

impl Command for Takeoff {
    fn name(&self) -> &'static str {
        "Takeoff"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Taking off (altitude {:?} m)", self.altitude_m);

        run_periodic(self.poll_period_s, None, cancel, |elapsed_s| {
            let state = match self.observer.current_flying_state() {
                Ok(s) => s,
                Err(ServiceError::Disconnected) => return Err(CmdError::FeedbackLost),
                Err(e) => {
                    trace!("Flying state unavailable: {}", e);
                    None
                }
            };

            match state {
                Some(s) if s.is_airborne() => return Ok(TickAction::Done),
                Some(s) if s.is_taking_off() => (),
                _ => match self.issuer.send_takeoff(self.altitude_m) {
                    Ok(()) => (),
                    Err(ServiceError::Disconnected) => {
                        return Err(ServiceError::Disconnected.into())
                    }
                    Err(e) => warn!("Couldn't send takeoff signal: {}", e),
                },
            }

            if elapsed_s >= self.timeout_s {
                Err(CmdError::Timeout {
                    name: "Takeoff",
                    timeout_s: self.timeout_s,
                })
            } else {
                Ok(TickAction::Continue)
            }
        })
    }
}
