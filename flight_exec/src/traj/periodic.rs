//! Periodic trajectories: circles and constant rate rotations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::TAU;

use super::{check_finite, check_speed, Hold1d, TimeAnchor, TrajError, Trajectory1d, Trajectory4d};
use crate::geom::{InertialFrameVelocity, Pose};
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An angle rotating at a constant rate, wrapped into [0, 2pi).
#[derive(Debug, Clone, Copy)]
pub struct ConstantVelocityAngular1d {
    anchor: TimeAnchor,
    angular_rate_rads: f64,
    phase_rad: f64,
}

/// Fly around a circle at a constant frequency.
///
/// The circle lies in the horizontal plane unless tilted with [`Circle4d::with_plane_angle`], in
/// which case it is rotated about the inertial X axis.
#[derive(Debug, Clone, Copy)]
pub struct Circle4d {
    anchor: TimeAnchor,
    centre: Pose,
    radius_m: f64,
    frequency_hz: f64,
    phase_rad: f64,
    plane_angle_rad: f64,
    yaw: CircleYaw,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the heading behaves while flying a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YawMode {
    /// Hold the given yaw throughout
    Fixed(f64),

    /// Turn once per revolution, keeping the same side facing the centre
    Rotating,
}

#[derive(Debug, Clone, Copy)]
enum CircleYaw {
    Fixed(Hold1d),
    Rotating(ConstantVelocityAngular1d),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConstantVelocityAngular1d {
    /// Rotate at `frequency_hz` turns per second starting from `phase_rad`.
    pub fn new(frequency_hz: f64, phase_rad: f64) -> Result<Self, TrajError> {
        check_finite("phase", phase_rad)?;
        let angular_rate_rads = TAU * frequency_hz;
        check_speed(angular_rate_rads)?;

        Ok(Self {
            anchor: TimeAnchor::default(),
            angular_rate_rads,
            phase_rad,
        })
    }
}

impl Trajectory1d for ConstantVelocityAngular1d {
    fn position(&mut self, time_s: f64) -> f64 {
        let rel_s = self.anchor.relative(time_s);
        rem_euclid(self.angular_rate_rads * rel_s + self.phase_rad, TAU)
    }

    fn velocity(&mut self, _time_s: f64) -> f64 {
        self.angular_rate_rads
    }
}

impl Circle4d {
    /// A horizontal circle about `centre`, holding the centre's yaw.
    ///
    /// Fails if the speed around the circle would exceed the trajectory speed ceiling.
    pub fn new(
        centre: Pose,
        radius_m: f64,
        frequency_hz: f64,
        phase_rad: f64,
    ) -> Result<Self, TrajError> {
        for (name, value) in &[
            ("centre x", centre.x_m),
            ("centre y", centre.y_m),
            ("centre z", centre.z_m),
            ("centre yaw", centre.yaw_rad),
            ("radius", radius_m),
            ("phase", phase_rad),
        ] {
            check_finite(*name, *value)?;
        }
        check_speed(radius_m * TAU * frequency_hz)?;

        Ok(Self {
            anchor: TimeAnchor::default(),
            centre,
            radius_m: radius_m.abs(),
            frequency_hz,
            phase_rad,
            plane_angle_rad: 0.0,
            yaw: CircleYaw::Fixed(Hold1d::new(centre.yaw_rad)),
        })
    }

    /// Tilt the circle's plane about the inertial X axis.
    pub fn with_plane_angle(mut self, plane_angle_rad: f64) -> Result<Self, TrajError> {
        check_finite("plane angle", plane_angle_rad)?;
        self.plane_angle_rad = plane_angle_rad;
        Ok(self)
    }

    /// Set how the heading behaves around the circle.
    pub fn with_yaw(mut self, mode: YawMode) -> Result<Self, TrajError> {
        self.yaw = match mode {
            YawMode::Fixed(yaw_rad) => {
                check_finite("yaw", yaw_rad)?;
                CircleYaw::Fixed(Hold1d::new(yaw_rad))
            }
            YawMode::Rotating => CircleYaw::Rotating(ConstantVelocityAngular1d::new(
                self.frequency_hz,
                self.phase_rad,
            )?),
        };
        Ok(self)
    }

    fn angle_rad(&self, rel_s: f64) -> f64 {
        TAU * self.frequency_hz * rel_s + self.phase_rad
    }
}

impl Trajectory4d for Circle4d {
    fn position(&mut self, time_s: f64) -> Pose {
        let rel_s = self.anchor.relative(time_s);
        let (sin, cos) = self.angle_rad(rel_s).sin_cos();
        let (plane_sin, plane_cos) = self.plane_angle_rad.sin_cos();

        let abscissa = self.radius_m * cos;
        let ordinate = self.radius_m * sin;

        Pose::new(
            self.centre.x_m + abscissa,
            self.centre.y_m + ordinate * plane_cos,
            self.centre.z_m + ordinate * plane_sin,
            self.yaw.position(rel_s),
        )
    }

    fn velocity(&mut self, time_s: f64) -> InertialFrameVelocity {
        let rel_s = self.anchor.relative(time_s);
        let (sin, cos) = self.angle_rad(rel_s).sin_cos();
        let (plane_sin, plane_cos) = self.plane_angle_rad.sin_cos();
        let speed_ms = self.radius_m * TAU * self.frequency_hz;

        let d_abscissa = -speed_ms * sin;
        let d_ordinate = speed_ms * cos;

        InertialFrameVelocity::new(
            d_abscissa,
            d_ordinate * plane_cos,
            d_ordinate * plane_sin,
            self.yaw.velocity(rel_s),
        )
    }
}

impl Trajectory1d for CircleYaw {
    fn position(&mut self, time_s: f64) -> f64 {
        match self {
            CircleYaw::Fixed(t) => t.position(time_s),
            CircleYaw::Rotating(t) => t.position(time_s),
        }
    }

    fn velocity(&mut self, time_s: f64) -> f64 {
        match self {
            CircleYaw::Fixed(t) => t.velocity(time_s),
            CircleYaw::Rotating(t) => t.velocity(time_s),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_circle_position() {
        let centre = Pose::new(1.0, 2.0, 3.0, 0.5);
        let mut circle = Circle4d::new(centre, 0.2, 0.1, 0.0).unwrap();

        // Anchors at the first query
        let p = circle.position(500.0);
        assert_abs_diff_eq!(p.x_m, 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y_m, 2.0, epsilon = 1e-12);
        assert_eq!(p.z_m, 3.0);
        assert_eq!(p.yaw_rad, 0.5);

        // Quarter period later
        let p = circle.position(502.5);
        assert_abs_diff_eq!(p.x_m, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y_m, 2.2, epsilon = 1e-12);

        // Full period later
        let p = circle.position(510.0);
        assert_abs_diff_eq!(p.x_m, 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y_m, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_velocity_is_derivative() {
        let mut circle = Circle4d::new(Pose::default(), 0.5, 0.2, 0.3).unwrap();
        circle.position(0.0);

        let dt = 1e-6;
        for &t in &[0.1, 1.3, 2.7] {
            let v = circle.velocity(t);
            let p0 = circle.position(t - dt);
            let p1 = circle.position(t + dt);
            assert_abs_diff_eq!(v.linear_x_ms, (p1.x_m - p0.x_m) / (2.0 * dt), epsilon = 1e-6);
            assert_abs_diff_eq!(v.linear_y_ms, (p1.y_m - p0.y_m) / (2.0 * dt), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tilted_circle() {
        let mut circle = Circle4d::new(Pose::default(), 1.0, 0.1, FRAC_PI_2)
            .unwrap()
            .with_plane_angle(FRAC_PI_2)
            .unwrap();

        // Fully tilted the ordinate maps onto Z
        let p = circle.position(0.0);
        assert_abs_diff_eq!(p.x_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z_m, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotating_yaw() {
        let mut circle = Circle4d::new(Pose::default(), 0.2, 0.1, 0.0)
            .unwrap()
            .with_yaw(YawMode::Rotating)
            .unwrap();

        assert_eq!(circle.position(3.0).yaw_rad, 0.0);
        assert_abs_diff_eq!(circle.position(8.0).yaw_rad, PI, epsilon = 1e-12);
        assert_abs_diff_eq!(circle.velocity(8.0).angular_z_rads, TAU * 0.1, epsilon = 1e-12);

        // Wrapped after a full turn
        let yaw = circle.position(15.5).yaw_rad;
        assert!(yaw >= 0.0 && yaw < TAU);
        assert_abs_diff_eq!(yaw, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_limit() {
        // 0.2 m at 1 Hz is 1.26 m/s
        assert!(matches!(
            Circle4d::new(Pose::default(), 0.2, 1.0, 0.0),
            Err(TrajError::SpeedLimitExceeded { .. })
        ));

        // Fine as a circle but the heading would turn too fast
        assert!(matches!(
            Circle4d::new(Pose::default(), 0.1, 0.5, 0.0)
                .unwrap()
                .with_yaw(YawMode::Rotating),
            Err(TrajError::SpeedLimitExceeded { .. })
        ));
    }
}
