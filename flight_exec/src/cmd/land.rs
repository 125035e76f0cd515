//! Land command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use std::sync::Arc;

// Internal
use super::{run_periodic, CancelToken, CmdError, CmdStatus, Command, TickAction};
use crate::{
    services::{FlyingState, FlyingStateObserver, LandIssuer, ServiceError},
    traj_ctrl::FlightCtrlParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Land and wait until the vehicle reports it has landed.
///
/// The transport gives no delivery guarantee so the land signal is sent every poll until
/// [`FlyingState::Landed`] is observed. Missing feedback never stops the signal. If the observer
/// reports the feedback is gone for good the command faults with [`CmdError::FeedbackLost`].
pub struct Land {
    issuer: Arc<dyn LandIssuer>,
    observer: Arc<dyn FlyingStateObserver>,
    poll_period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Land {
    pub fn new(
        issuer: Arc<dyn LandIssuer>,
        observer: Arc<dyn FlyingStateObserver>,
        params: &FlightCtrlParams,
    ) -> Result<Self, CmdError> {
        params.validate()?;

        Ok(Self {
            issuer,
            observer,
            poll_period_s: params.poll_period_s,
        })
    }
}

impl Command for Land {
    fn name(&self) -> &'static str {
        "Land"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Landing");

        run_periodic(self.poll_period_s, None, cancel, |_| {
            match self.observer.current_flying_state() {
                Ok(Some(FlyingState::Landed)) => return Ok(TickAction::Done),
                Ok(_) => (),
                Err(ServiceError::Disconnected) => return Err(CmdError::FeedbackLost),
                Err(e) => trace!("Flying state unavailable: {}", e),
            }

            match self.issuer.send_land() {
                Ok(()) => Ok(TickAction::Continue),
                Err(ServiceError::Disconnected) => Err(ServiceError::Disconnected.into()),
                Err(e) => {
                    warn!("Couldn't send land signal, will retry: {}", e);
                    Ok(TickAction::Continue)
                }
            }
        })
    }
}
