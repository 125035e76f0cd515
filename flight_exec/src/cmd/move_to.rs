//! Fly to a pose and stop once there

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::sync::Arc;

// Internal
use super::{CancelToken, CmdError, CmdStatus, Command, FollowTrajectory};
use crate::{
    geom::Pose,
    services::{StateEstimator, VelocityIssuer},
    traj::Hold4d,
    traj_ctrl::FlightCtrlParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Hold a target pose until the vehicle is close to it or the timeout runs out.
///
/// Closeness uses [`Pose::is_close`]. Running out of time is not a fault, the vehicle is left
/// wherever the controller got it to.
pub struct MoveToPose {
    target: Pose,
    follow: FollowTrajectory,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MoveToPose {
    pub fn new(
        target: Pose,
        timeout_s: f64,
        estimator: Arc<dyn StateEstimator>,
        issuer: Arc<dyn VelocityIssuer>,
        params: FlightCtrlParams,
    ) -> Result<Self, CmdError> {
        let follow = FollowTrajectory::new(Hold4d::new(target), timeout_s, estimator, issuer, params)?
            .until_close_to(target);

        Ok(Self { target, follow })
    }

    pub fn target(&self) -> &Pose {
        &self.target
    }
}

impl Command for MoveToPose {
    fn name(&self) -> &'static str {
        "MoveToPose"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Moving to {:?}", self.target);
        self.follow.execute(cancel)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cmd::mock::{FixedEstimator, RecordingIssuer},
        geom::BodyFrameVelocity,
        services::DroneState,
    };
    use approx::assert_relative_eq;
    use std::time::{Duration, Instant};

    fn params() -> FlightCtrlParams {
        FlightCtrlParams {
            control_period_s: 0.01,
            state_lifetime_s: 0.03,
            ..Default::default()
        }
    }

    fn estimate(pose: Pose) -> Option<DroneState> {
        Some(DroneState {
            pose,
            velocity: Default::default(),
            timestamp_s: 1.0,
        })
    }

    #[test]
    fn test_completes_once_close() {
        let estimator = Arc::new(FixedEstimator::default());
        let issuer = Arc::new(RecordingIssuer::default());
        let target = Pose::new(1.0, 2.0, 1.5, 0.5);

        // Within the default tolerances of the target
        estimator.set(estimate(Pose::new(1.02, 1.99, 1.52, 0.48)));

        let cmd =
            MoveToPose::new(target, 10.0, estimator, issuer.clone(), params()).unwrap();
        assert_eq!(cmd.target(), &target);

        let start = Instant::now();
        assert_eq!(cmd.execute(&CancelToken::new()), Ok(CmdStatus::Completed));
        assert!(start.elapsed() < Duration::from_secs(1));

        // Nothing but the final stop
        assert_eq!(issuer.sent(), vec![BodyFrameVelocity::zero()]);
    }

    #[test]
    fn test_gives_up_after_timeout() {
        let estimator = Arc::new(FixedEstimator::default());
        let issuer = Arc::new(RecordingIssuer::default());

        estimator.set(estimate(Pose::new(0.0, 0.0, 1.0, 0.0)));

        let cmd = MoveToPose::new(
            Pose::new(1.0, 0.0, 1.0, 0.0),
            0.05,
            estimator,
            issuer.clone(),
            params(),
        )
        .unwrap();

        let start = Instant::now();
        assert_eq!(cmd.execute(&CancelToken::new()), Ok(CmdStatus::Completed));
        assert!(start.elapsed() >= Duration::from_millis(50));

        // Pushed towards the target, then stopped
        let sent = issuer.sent();
        assert!(sent.len() >= 2);
        assert_relative_eq!(sent[0].linear_x_ms, 2.0, epsilon = 1e-9);
        assert_eq!(*sent.last().unwrap(), BodyFrameVelocity::zero());
    }

    #[test]
    fn test_bad_timeout() {
        let estimator = Arc::new(FixedEstimator::default());
        let issuer = Arc::new(RecordingIssuer::default());

        assert!(matches!(
            MoveToPose::new(Pose::default(), 0.0, estimator, issuer, params()),
            Err(CmdError::InvalidDuration(_))
        ));
    }
}
