//! # Trajectory following command
//!
//! Closes the loop between a [`Trajectory4d`] and the state estimator using a
//! [`PidController4d`]. Trajectories anchor on the first time they are sampled, and this command
//! samples with the time since it started, so a trajectory plays from its beginning the first
//! time the command runs.
//!
//! A task may be shared by several executors, in which case the trajectory is followed by one of
//! them at a time. The others wait for it, still watching their cancel token.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

// Internal
use super::{
    check_duration, run_periodic, send_velocity, CancelToken, CmdError, CmdStatus, Command,
    TickAction,
};
use crate::{
    geom::{BodyFrameVelocity, Pose},
    services::{StateEstimator, VelocityIssuer},
    traj::{Choreography, FiniteTrajectory4d, Trajectory4d},
    traj_ctrl::{FlightCtrlParams, PidController4d},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follow a trajectory for a fixed time, then stop.
///
/// Ticks without a state estimate are skipped. An estimate whose timestamp hasn't changed for
/// longer than the feedback lifetime is treated as stale and nothing is sent until it updates.
pub struct FollowTrajectory {
    traj: Mutex<Box<dyn Trajectory4d>>,
    duration_s: f64,
    estimator: Arc<dyn StateEstimator>,
    issuer: Arc<dyn VelocityIssuer>,
    params: FlightCtrlParams,

    /// Pose which ends the command early once reached
    goal: Option<Pose>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowTrajectory {
    /// Follow `traj` for `duration_s` seconds.
    pub fn new<T>(
        traj: T,
        duration_s: f64,
        estimator: Arc<dyn StateEstimator>,
        issuer: Arc<dyn VelocityIssuer>,
        params: FlightCtrlParams,
    ) -> Result<Self, CmdError>
    where
        T: Trajectory4d + 'static,
    {
        check_duration(duration_s)?;
        params.validate()?;

        Ok(Self {
            traj: Mutex::new(Box::new(traj)),
            duration_s,
            estimator,
            issuer,
            params,
            goal: None,
        })
    }

    /// Complete as soon as the estimated pose is close to `goal`, rather than only when the
    /// duration runs out.
    pub fn until_close_to(mut self, goal: Pose) -> Self {
        self.goal = Some(goal);
        self
    }

    /// Follow a finite trajectory for its whole length.
    pub fn finite<T>(
        traj: T,
        estimator: Arc<dyn StateEstimator>,
        issuer: Arc<dyn VelocityIssuer>,
        params: FlightCtrlParams,
    ) -> Result<Self, CmdError>
    where
        T: FiniteTrajectory4d + 'static,
    {
        let duration_s = traj.duration_s();
        Self::new(traj, duration_s, estimator, issuer, params)
    }

    /// Perform a choreography from start to end.
    pub fn perform_choreography(
        choreography: Choreography,
        estimator: Arc<dyn StateEstimator>,
        issuer: Arc<dyn VelocityIssuer>,
        params: FlightCtrlParams,
    ) -> Result<Self, CmdError> {
        Self::finite(choreography, estimator, issuer, params)
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Number of consecutive ticks with an unchanged timestamp after which the state is stale.
    fn stale_tick_limit(&self) -> u64 {
        let ticks = (self.params.state_lifetime_s / self.params.control_period_s).ceil();
        if ticks < 1.0 {
            1
        } else {
            ticks as u64
        }
    }

    /// Take the trajectory, polling so that cancellation is seen while another executor holds it.
    fn lock_traj(
        &self,
        cancel: &CancelToken,
    ) -> Result<Option<MutexGuard<'_, Box<dyn Trajectory4d>>>, CmdError> {
        let mut guard = None;
        let mut waiting = false;

        let status = run_periodic(self.params.control_period_s, None, cancel, |_| {
            match self.traj.try_lock() {
                Ok(g) => {
                    guard = Some(g);
                    Ok(TickAction::Done)
                }
                Err(TryLockError::WouldBlock) => {
                    if !waiting {
                        debug!("Trajectory is in use elsewhere, waiting for it");
                        waiting = true;
                    }
                    Ok(TickAction::Continue)
                }
                Err(TryLockError::Poisoned(e)) => Err(e.into()),
            }
        })?;

        match status {
            CmdStatus::Completed => Ok(guard),
            CmdStatus::Cancelled => Ok(None),
        }
    }
}

impl Command for FollowTrajectory {
    fn name(&self) -> &'static str {
        "FollowTrajectory"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Following trajectory for {} s", self.duration_s);

        let mut traj = match self.lock_traj(cancel)? {
            Some(t) => t,
            None => return Ok(CmdStatus::Cancelled),
        };
        let mut ctrl = PidController4d::from_params(&self.params)?;

        let stale_limit = self.stale_tick_limit();
        let mut last_timestamp_s: Option<f64> = None;
        let mut unchanged_ticks = 0u64;

        let status = run_periodic(
            self.params.control_period_s,
            Some(self.duration_s),
            cancel,
            |time_s| {
                let state = match self.estimator.current_state() {
                    Some(s) => s,
                    None => {
                        trace!("No state estimate at {:.3} s, skipping tick", time_s);
                        return Ok(TickAction::Continue);
                    }
                };

                if last_timestamp_s == Some(state.timestamp_s) {
                    unchanged_ticks += 1;
                } else {
                    last_timestamp_s = Some(state.timestamp_s);
                    unchanged_ticks = 0;
                }

                if unchanged_ticks >= stale_limit {
                    if unchanged_ticks == stale_limit {
                        warn!(
                            "State estimate from {} s is stale, holding commands",
                            state.timestamp_s
                        );
                    }
                    return Ok(TickAction::Continue);
                }

                if let Some(goal) = &self.goal {
                    if state.pose.is_close(goal) {
                        debug!("Reached {:?} after {:.3} s", goal, time_s);
                        return Ok(TickAction::Done);
                    }
                }

                let cmd = ctrl.compute_body(&mut **traj, time_s, &state.pose, &state.velocity);
                send_velocity(&*self.issuer, &cmd)?;

                Ok(TickAction::Continue)
            },
        )?;

        if status == CmdStatus::Completed {
            send_velocity(&*self.issuer, &BodyFrameVelocity::zero())?;
        }

        Ok(status)
    }
}
