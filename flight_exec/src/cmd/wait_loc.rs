//! Wait for the state estimator before running a command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::sync::Arc;

// Internal
use super::{run_periodic, CancelToken, CmdError, CmdStatus, Command, TickAction};
use crate::{services::StateEstimator, traj_ctrl::FlightCtrlParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Poll the state estimator until it has an estimate, then run the wrapped command.
pub struct WaitForLocalization {
    estimator: Arc<dyn StateEstimator>,
    inner: Box<dyn Command>,
    poll_period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaitForLocalization {
    pub fn new<C>(
        estimator: Arc<dyn StateEstimator>,
        inner: C,
        params: &FlightCtrlParams,
    ) -> Result<Self, CmdError>
    where
        C: Command + 'static,
    {
        params.validate()?;

        Ok(Self {
            estimator,
            inner: Box::new(inner),
            poll_period_s: params.poll_period_s,
        })
    }
}

impl Command for WaitForLocalization {
    fn name(&self) -> &'static str {
        "WaitForLocalization"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        let status = run_periodic(self.poll_period_s, None, cancel, |_| {
            Ok(match self.estimator.current_state() {
                Some(_) => TickAction::Done,
                None => TickAction::Continue,
            })
        })?;

        match status {
            CmdStatus::Completed => {
                debug!("Localised, starting {}", self.inner.name());
                self.inner.execute(cancel)
            }
            CmdStatus::Cancelled => Ok(CmdStatus::Cancelled),
        }
    }
}
