//! Constant velocity trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{
    check_finite, check_speed, FiniteTrajectory4d, TimeAnchor, TrajError,
    Trajectory1d, Trajectory4d, MAX_ABSOLUTE_SPEED_MS,
};
use crate::geom::{InertialFrameVelocity, Pose};
use util::maths::{get_ang_dist, norm};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Move along one axis at a constant velocity for a fixed time, then hold.
#[derive(Debug, Clone, Copy)]
pub struct Linear1d {
    anchor: TimeAnchor,
    origin: f64,
    velocity: f64,
    duration_s: f64,
}

/// Fly in a straight line from a source pose to a target pose at a constant speed, then hold the
/// target.
///
/// Yaw is turned through the shortest angle over the same time. If the turn would need a yaw rate
/// above the speed ceiling the whole manoeuvre is slowed down to match.
#[derive(Debug, Clone, Copy)]
pub struct StraightLine4d {
    anchor: TimeAnchor,
    x: Linear1d,
    y: Linear1d,
    z: Linear1d,
    yaw: Linear1d,
    target: Pose,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Linear1d {
    /// A trajectory starting at `origin` and moving at `velocity` for `duration_s`.
    ///
    /// A zero duration gives a trajectory which immediately holds `origin`.
    pub fn new(origin: f64, velocity: f64, duration_s: f64) -> Result<Self, TrajError> {
        check_finite("origin", origin)?;
        check_finite("velocity", velocity)?;
        if !duration_s.is_finite() || duration_s < 0.0 {
            return Err(TrajError::InvalidDuration(duration_s));
        }

        Ok(Self {
            anchor: TimeAnchor::default(),
            origin,
            velocity,
            duration_s,
        })
    }
}

impl Trajectory1d for Linear1d {
    fn position(&mut self, time_s: f64) -> f64 {
        let rel_s = self.anchor.relative(time_s).max(0.0).min(self.duration_s);
        self.origin + self.velocity * rel_s
    }

    fn velocity(&mut self, time_s: f64) -> f64 {
        let rel_s = self.anchor.relative(time_s);
        if rel_s >= 0.0 && rel_s < self.duration_s {
            self.velocity
        } else {
            0.0
        }
    }
}

impl StraightLine4d {
    pub fn new(source: Pose, target: Pose, speed_ms: f64) -> Result<Self, TrajError> {
        if !speed_ms.is_finite() || speed_ms <= 0.0 {
            return Err(TrajError::InvalidSpeed(speed_ms));
        }
        check_speed(speed_ms)?;
        for (name, value) in &[
            ("target x", target.x_m),
            ("target y", target.y_m),
            ("target z", target.z_m),
            ("target yaw", target.yaw_rad),
        ] {
            check_finite(*name, *value)?;
        }

        let distance_m = norm(&source.position(), &target.position()).unwrap_or(0.0);
        let turn_rad = get_ang_dist(source.yaw_rad, target.yaw_rad);

        let duration_s = (distance_m / speed_ms).max(turn_rad.abs() / MAX_ABSOLUTE_SPEED_MS);

        let rate = |delta: f64| {
            if duration_s > 0.0 {
                delta / duration_s
            } else {
                0.0
            }
        };

        Ok(Self {
            anchor: TimeAnchor::default(),
            x: Linear1d::new(source.x_m, rate(target.x_m - source.x_m), duration_s)?,
            y: Linear1d::new(source.y_m, rate(target.y_m - source.y_m), duration_s)?,
            z: Linear1d::new(source.z_m, rate(target.z_m - source.z_m), duration_s)?,
            yaw: Linear1d::new(source.yaw_rad, rate(turn_rad), duration_s)?,
            target,
            duration_s,
        })
    }
}

impl Trajectory4d for StraightLine4d {
    fn position(&mut self, time_s: f64) -> Pose {
        let rel_s = self.anchor.relative(time_s);

        if rel_s >= self.duration_s {
            return self.target;
        }

        Pose::new(
            self.x.position(rel_s),
            self.y.position(rel_s),
            self.z.position(rel_s),
            self.yaw.position(rel_s),
        )
    }

    fn velocity(&mut self, time_s: f64) -> InertialFrameVelocity {
        let rel_s = self.anchor.relative(time_s);

        InertialFrameVelocity::new(
            self.x.velocity(rel_s),
            self.y.velocity(rel_s),
            self.z.velocity(rel_s),
            self.yaw.velocity(rel_s),
        )
    }
}

impl FiniteTrajectory4d for StraightLine4d {
    fn duration_s(&self) -> f64 {
        self.duration_s
    }
}
