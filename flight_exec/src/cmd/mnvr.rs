//! Open loop manoeuvres: hovering and constant velocity moves

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::sync::Arc;

// Internal
use super::{
    check_duration, check_period, run_periodic, send_velocity, CancelToken, CmdError, CmdStatus, Command,
    TickAction, DEFAULT_TICK_PERIOD_S,
};
use crate::{geom::BodyFrameVelocity, services::VelocityIssuer};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Hold position by commanding zero velocity for a time.
pub struct Hover {
    issuer: Arc<dyn VelocityIssuer>,
    duration_s: f64,
    period_s: f64,
}

/// Fly at a constant body frame velocity for a time, then stop.
pub struct Move {
    issuer: Arc<dyn VelocityIssuer>,
    velocity: BodyFrameVelocity,
    duration_s: f64,
    period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Hover {
    pub fn new(issuer: Arc<dyn VelocityIssuer>, duration_s: f64) -> Result<Self, CmdError> {
        check_duration(duration_s)?;

        Ok(Self {
            issuer,
            duration_s,
            period_s: DEFAULT_TICK_PERIOD_S,
        })
    }

    /// Use a different tick period.
    pub fn with_period(mut self, period_s: f64) -> Result<Self, CmdError> {
        check_period(period_s)?;
        self.period_s = period_s;
        Ok(self)
    }
}

impl Command for Hover {
    fn name(&self) -> &'static str {
        "Hover"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Hovering for {} s", self.duration_s);

        run_periodic(self.period_s, Some(self.duration_s), cancel, |_| {
            send_velocity(&*self.issuer, &BodyFrameVelocity::zero())?;
            Ok(TickAction::Continue)
        })
    }
}

impl Move {
    pub fn new(
        issuer: Arc<dyn VelocityIssuer>,
        velocity: BodyFrameVelocity,
        duration_s: f64,
    ) -> Result<Self, CmdError> {
        for (name, value) in &[
            ("linear_x_ms", velocity.linear_x_ms),
            ("linear_y_ms", velocity.linear_y_ms),
            ("linear_z_ms", velocity.linear_z_ms),
            ("angular_z_rads", velocity.angular_z_rads),
        ] {
            if !value.is_finite() {
                return Err(CmdError::NonFiniteArgument {
                    name: *name,
                    value: *value,
                });
            }
        }
        check_duration(duration_s)?;

        Ok(Self {
            issuer,
            velocity,
            duration_s,
            period_s: DEFAULT_TICK_PERIOD_S,
        })
    }

    /// Move forwards (positive) or backwards.
    pub fn along_x(
        issuer: Arc<dyn VelocityIssuer>,
        speed_ms: f64,
        duration_s: f64,
    ) -> Result<Self, CmdError> {
        Self::new(
            issuer,
            BodyFrameVelocity::new(speed_ms, 0.0, 0.0, 0.0),
            duration_s,
        )
    }

    /// Move left (positive) or right.
    pub fn along_y(
        issuer: Arc<dyn VelocityIssuer>,
        speed_ms: f64,
        duration_s: f64,
    ) -> Result<Self, CmdError> {
        Self::new(
            issuer,
            BodyFrameVelocity::new(0.0, speed_ms, 0.0, 0.0),
            duration_s,
        )
    }

    /// Move up (positive) or down.
    pub fn along_z(
        issuer: Arc<dyn VelocityIssuer>,
        speed_ms: f64,
        duration_s: f64,
    ) -> Result<Self, CmdError> {
        Self::new(
            issuer,
            BodyFrameVelocity::new(0.0, 0.0, speed_ms, 0.0),
            duration_s,
        )
    }

    /// Turn on the spot, anticlockwise for a positive rate.
    pub fn rotate(
        issuer: Arc<dyn VelocityIssuer>,
        rate_rads: f64,
        duration_s: f64,
    ) -> Result<Self, CmdError> {
        Self::new(
            issuer,
            BodyFrameVelocity::new(0.0, 0.0, 0.0, rate_rads),
            duration_s,
        )
    }

    /// Use a different tick period.
    pub fn with_period(mut self, period_s: f64) -> Result<Self, CmdError> {
        check_period(period_s)?;
        self.period_s = period_s;
        Ok(self)
    }
}

impl Command for Move {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        debug!("Moving at {:?} for {} s", self.velocity, self.duration_s);

        let status = run_periodic(self.period_s, Some(self.duration_s), cancel, |_| {
            send_velocity(&*self.issuer, &self.velocity)?;
            Ok(TickAction::Continue)
        })?;

        if status == CmdStatus::Completed {
            send_velocity(&*self.issuer, &BodyFrameVelocity::zero())?;
        }

        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd::mock::RecordingIssuer;

    #[test]
    fn test_move_stops_on_completion() {
        let issuer = Arc::new(RecordingIssuer::default());
        let cmd = Move::along_x(issuer.clone(), 0.5, 0.05)
            .unwrap()
            .with_period(0.01)
            .unwrap();

        assert_eq!(cmd.execute(&CancelToken::new()), Ok(CmdStatus::Completed));

        let sent = issuer.sent();
        assert!(sent.len() >= 3);
        assert_eq!(sent[0], BodyFrameVelocity::new(0.5, 0.0, 0.0, 0.0));
        assert_eq!(*sent.last().unwrap(), BodyFrameVelocity::zero());
    }

    #[test]
    fn test_move_cancelled() {
        let issuer = Arc::new(RecordingIssuer::default());
        let cmd = Move::rotate(issuer.clone(), 0.3, 10.0).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        assert_eq!(cmd.execute(&cancel), Ok(CmdStatus::Cancelled));
        assert!(issuer.sent().is_empty());
    }

    #[test]
    fn test_move_rejects_bad_args() {
        let issuer = Arc::new(RecordingIssuer::default());

        assert!(matches!(
            Move::along_y(issuer.clone(), 0.2, 0.0),
            Err(CmdError::InvalidDuration(_))
        ));
        assert!(matches!(
            Move::along_z(issuer.clone(), std::f64::INFINITY, 1.0),
            Err(CmdError::NonFiniteArgument {
                name: "linear_z_ms",
                ..
            })
        ));

        // Bad periods are caught when the command is built, not when it runs
        assert!(matches!(
            Move::along_x(issuer.clone(), 0.1, 1.0).unwrap().with_period(0.0),
            Err(CmdError::InvalidPeriod(p)) if p == 0.0
        ));
        assert!(matches!(
            Hover::new(issuer, 1.0).unwrap().with_period(-0.05),
            Err(CmdError::InvalidPeriod(p)) if p == -0.05
        ));
    }

    #[test]
    fn test_hover() {
        let issuer = Arc::new(RecordingIssuer::default());
        let cmd = Hover::new(issuer.clone(), 0.05)
            .unwrap()
            .with_period(0.01)
            .unwrap();

        assert_eq!(cmd.execute(&CancelToken::new()), Ok(CmdStatus::Completed));

        let sent = issuer.sent();
        assert!(!sent.is_empty());
        assert!(sent.iter().all(|v| *v == BodyFrameVelocity::zero()));
    }
}
