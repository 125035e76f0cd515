//! Swinging trajectories, oscillating back and forth about an origin

use std::f64::consts::TAU;

use super::{check_finite, check_speed, TimeAnchor, TrajError, Trajectory1d, Trajectory4d};
use crate::geom::{InertialFrameVelocity, Pose};

/// Oscillate along one axis: `origin + amplitude * cos(2 pi f t + phase)`.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSwing1d {
    anchor: TimeAnchor,
    origin: f64,
    amplitude: f64,
    frequency_hz: f64,
    phase_rad: f64,
}

/// Swing back and forth through `origin` along a horizontal direction, holding altitude and yaw.
#[derive(Debug, Clone, Copy)]
pub struct Swing4d {
    anchor: TimeAnchor,
    origin: Pose,
    swing: ConstantSwing1d,
    direction: (f64, f64),
}

impl ConstantSwing1d {
    /// Fails if the peak speed of the swing, `amplitude * 2 pi * frequency`, exceeds the trajectory
    /// speed ceiling.
    pub fn new(
        origin: f64,
        amplitude: f64,
        frequency_hz: f64,
        phase_rad: f64,
    ) -> Result<Self, TrajError> {
        check_finite("origin", origin)?;
        check_finite("amplitude", amplitude)?;
        check_finite("phase", phase_rad)?;
        check_speed(amplitude * TAU * frequency_hz)?;

        Ok(Self {
            anchor: TimeAnchor::default(),
            origin,
            amplitude,
            frequency_hz,
            phase_rad,
        })
    }

    fn angle_rad(&self, rel_s: f64) -> f64 {
        TAU * self.frequency_hz * rel_s + self.phase_rad
    }
}

impl Trajectory1d for ConstantSwing1d {
    fn position(&mut self, time_s: f64) -> f64 {
        let rel_s = self.anchor.relative(time_s);
        self.origin + self.amplitude * self.angle_rad(rel_s).cos()
    }

    fn velocity(&mut self, time_s: f64) -> f64 {
        let rel_s = self.anchor.relative(time_s);
        -self.amplitude * TAU * self.frequency_hz * self.angle_rad(rel_s).sin()
    }
}

impl Swing4d {
    /// Swing through `origin` along the horizontal direction `heading_rad` (anti-clockwise from
    /// the inertial X axis), reaching `amplitude_m` either side.
    pub fn new(
        origin: Pose,
        amplitude_m: f64,
        frequency_hz: f64,
        phase_rad: f64,
        heading_rad: f64,
    ) -> Result<Self, TrajError> {
        check_finite("heading", heading_rad)?;
        for (name, value) in &[
            ("origin x", origin.x_m),
            ("origin y", origin.y_m),
            ("origin z", origin.z_m),
            ("origin yaw", origin.yaw_rad),
        ] {
            check_finite(*name, *value)?;
        }

        let (sin, cos) = heading_rad.sin_cos();

        Ok(Self {
            anchor: TimeAnchor::default(),
            origin,
            swing: ConstantSwing1d::new(0.0, amplitude_m, frequency_hz, phase_rad)?,
            direction: (cos, sin),
        })
    }
}

impl Trajectory4d for Swing4d {
    fn position(&mut self, time_s: f64) -> Pose {
        let rel_s = self.anchor.relative(time_s);
        let offset_m = self.swing.position(rel_s);

        Pose::new(
            self.origin.x_m + self.direction.0 * offset_m,
            self.origin.y_m + self.direction.1 * offset_m,
            self.origin.z_m,
            self.origin.yaw_rad,
        )
    }

    fn velocity(&mut self, time_s: f64) -> InertialFrameVelocity {
        let rel_s = self.anchor.relative(time_s);
        let speed_ms = self.swing.velocity(rel_s);

        InertialFrameVelocity::new(
            self.direction.0 * speed_ms,
            self.direction.1 * speed_ms,
            0.0,
            0.0,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_swing_1d() {
        let mut swing = ConstantSwing1d::new(1.0, 0.5, 0.25, 0.0).unwrap();

        assert_eq!(swing.position(42.0), 1.5);
        assert_eq!(swing.velocity(42.0), 0.0);

        // Passing through the origin a quarter period later at peak speed
        assert_abs_diff_eq!(swing.position(43.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(swing.velocity(43.0), -0.5 * TAU * 0.25, epsilon = 1e-12);

        // Far side at half period
        assert_abs_diff_eq!(swing.position(44.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_swing_speed_ceiling() {
        assert!(matches!(
            ConstantSwing1d::new(0.0, 1.0, 0.5, 0.0),
            Err(TrajError::SpeedLimitExceeded { .. })
        ));
        assert!(ConstantSwing1d::new(0.0, 1.0, 0.15, 0.0).is_ok());
    }

    #[test]
    fn test_swing_4d_direction() {
        let origin = Pose::new(2.0, 3.0, 1.5, 0.7);
        let mut swing = Swing4d::new(origin, 0.4, 0.2, 0.0, FRAC_PI_2).unwrap();

        let p = swing.position(0.0);
        assert_abs_diff_eq!(p.x_m, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y_m, 3.4, epsilon = 1e-12);
        assert_eq!(p.z_m, 1.5);
        assert_eq!(p.yaw_rad, 0.7);

        let v = swing.velocity(1.25);
        assert_abs_diff_eq!(v.linear_x_ms, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.linear_y_ms, -0.4 * TAU * 0.2, epsilon = 1e-12);
        assert_eq!(v.linear_z_ms, 0.0);
    }
}
