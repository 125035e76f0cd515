//! # Commands module
//!
//! A command is a single action performed by the vehicle, such as taking off, hovering for a time
//! or following a trajectory. Commands run synchronously on the task executor's thread and block
//! until their completion condition holds.
//!
//! Cancellation is cooperative. Every command polls the [`CancelToken`] it is given at each tick
//! boundary and returns [`CmdStatus::Cancelled`] within one tick of it being set. Commands which
//! loop do so through [`run_periodic`], which handles the timing and the cancellation polling.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod follow;
mod land;
mod mnvr;
mod move_to;
mod takeoff;
mod wait_loc;

#[cfg(test)]
mod mock;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError,
    },
    thread,
    time::{Duration, Instant},
};

// Internal
pub use follow::FollowTrajectory;
pub use land::Land;
pub use mnvr::{Hover, Move};
pub use move_to::MoveToPose;
pub use takeoff::Takeoff;
pub use wait_loc::WaitForLocalization;

use crate::{
    geom::BodyFrameVelocity,
    services::{ServiceError, VelocityIssuer},
    traj::TrajError,
    traj_ctrl::ParamsError,
};
use util::time::seconds_to_duration;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tick period used by commands which aren't given one.
pub const DEFAULT_TICK_PERIOD_S: f64 = 0.05;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single action making up part of a task.
pub trait Command: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the command, blocking until it completes, faults or is cancelled.
    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Flag shared between whoever may cancel a command and the command itself.
///
/// Clones share the same flag. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a command that didn't fault finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CmdStatus {
    /// The command's completion condition was met
    Completed,

    /// The command stopped early because its token was cancelled
    Cancelled,
}

/// What a periodic tick wants to happen next.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickAction {
    Continue,
    Done,
}

/// Unrecoverable faults raised while executing a command.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CmdError {
    #[error("Vehicle service error: {0}")]
    ServiceError(ServiceError),

    #[error("{name} timed out after {timeout_s} s")]
    Timeout { name: &'static str, timeout_s: f64 },

    #[error("Flying state feedback was permanently lost")]
    FeedbackLost,

    #[error("Invalid control parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Invalid trajectory: {0}")]
    TrajError(TrajError),

    #[error("Command argument {name} must be finite (found {value})")]
    NonFiniteArgument { name: &'static str, value: f64 },

    #[error("Expected a positive finite duration, found {0} s")]
    InvalidDuration(f64),

    #[error("Expected a positive finite period, found {0} s")]
    InvalidPeriod(f64),

    #[error("Sync primitive is poisoned")]
    PoisonError,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every command using this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl From<ServiceError> for CmdError {
    fn from(e: ServiceError) -> Self {
        Self::ServiceError(e)
    }
}

impl From<ParamsError> for CmdError {
    fn from(e: ParamsError) -> Self {
        Self::InvalidParams(e)
    }
}

impl From<TrajError> for CmdError {
    fn from(e: TrajError) -> Self {
        Self::TrajError(e)
    }
}

impl<G> From<PoisonError<G>> for CmdError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Call `tick` every `period_s` seconds until it returns [`TickAction::Done`], `duration_s` has
/// elapsed, or `cancel` is set.
///
/// `tick` is given the time in seconds since the loop started. The token is checked before every
/// tick, so cancellation is seen within one period. A tick which takes longer than the period is
/// logged and the next one starts straight away.
///
/// Returns [`CmdStatus::Completed`] when the tick finishes or the duration runs out, and
/// [`CmdStatus::Cancelled`] if the token was set first. Errors from `tick` end the loop.
pub fn run_periodic<F>(
    period_s: f64,
    duration_s: Option<f64>,
    cancel: &CancelToken,
    mut tick: F,
) -> Result<CmdStatus, CmdError>
where
    F: FnMut(f64) -> Result<TickAction, CmdError>,
{
    let period = match seconds_to_duration(period_s) {
        Some(p) if p > Duration::from_secs(0) => p,
        _ => return Err(CmdError::InvalidPeriod(period_s)),
    };

    let loop_start = Instant::now();

    loop {
        if cancel.is_cancelled() {
            return Ok(CmdStatus::Cancelled);
        }

        let tick_start = Instant::now();
        let elapsed_s = (tick_start - loop_start).as_secs_f64();

        if let Some(d) = duration_s {
            if elapsed_s >= d {
                return Ok(CmdStatus::Completed);
            }
        }

        if tick(elapsed_s)? == TickAction::Done {
            return Ok(CmdStatus::Completed);
        }

        let tick_dur = Instant::now() - tick_start;
        match period.checked_sub(tick_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Tick overran by {:.06} s",
                tick_dur.as_secs_f64() - period.as_secs_f64()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Send a velocity, tolerating a transport which is only temporarily unavailable.
fn send_velocity(issuer: &dyn VelocityIssuer, velocity: &BodyFrameVelocity) -> Result<(), CmdError> {
    match issuer.send_velocity(velocity) {
        Ok(()) => Ok(()),
        Err(ServiceError::Disconnected) => Err(ServiceError::Disconnected.into()),
        Err(e) => {
            warn!("Couldn't send velocity command: {}", e);
            Ok(())
        }
    }
}

/// Check a command duration is positive and finite.
fn check_duration(duration_s: f64) -> Result<(), CmdError> {
    if duration_s.is_finite() && duration_s > 0.0 {
        Ok(())
    } else {
        Err(CmdError::InvalidDuration(duration_s))
    }
}

/// Check a tick period is positive and finite.
fn check_period(period_s: f64) -> Result<(), CmdError> {
    if period_s.is_finite() && period_s > 0.0 {
        Ok(())
    } else {
        Err(CmdError::InvalidPeriod(period_s))
    }
}
