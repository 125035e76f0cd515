//! # Trajectory controllers module
//!
//! This module provides the PID controllers used to follow trajectories. A single axis controller
//! acts on the position and velocity errors of one axis, and the four dimensional controller
//! combines four of them to command x, y, z and yaw.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::params::{FlightCtrlParams, ParamsError, PidParams};
use crate::{
    geom::{BodyFrameVelocity, InertialFrameVelocity, Pose},
    traj::{Trajectory1d, Trajectory4d},
};
use util::maths::{clamp, get_ang_dist};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller for a single axis.
///
/// The proportional and integral terms act on the position error and the derivative term on the
/// velocity error, so that velocity feedforward from the trajectory is included in the output.
#[derive(Debug, Serialize, Clone)]
pub struct PidController1d {
    params: PidParams,

    /// Time of the previous call, used to find the time step
    prev_time_s: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// Four single axis controllers following a [`Trajectory4d`].
#[derive(Debug, Serialize, Clone)]
pub struct PidController4d {
    x_ctrl: PidController1d,
    y_ctrl: PidController1d,
    z_ctrl: PidController1d,
    yaw_ctrl: PidController1d,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController1d {
    /// Create a new controller, checking the parameters.
    pub fn new(params: PidParams) -> Result<Self, ParamsError> {
        params.validate()?;

        Ok(Self {
            params,
            prev_time_s: None,
            integral: 0.0,
        })
    }

    pub fn params(&self) -> &PidParams {
        &self.params
    }

    /// Get the controller output.
    ///
    /// The time step is the gap since the previous call, so the first call accumulates no
    /// integral. The integral is clamped to its limits on every call and the output to the output
    /// limits.
    pub fn compute(
        &mut self,
        time_s: f64,
        current_pos: f64,
        current_vel: f64,
        desired_pos: f64,
        desired_vel: f64,
    ) -> f64 {
        let pos_error = desired_pos - current_pos;
        let vel_error = desired_vel - current_vel;

        // Out of order calls contribute nothing rather than unwinding the integral
        let dt_s = self
            .prev_time_s
            .map_or(0.0, |prev_s| (time_s - prev_s).max(0.0));

        self.integral = clamp(
            self.integral + pos_error * dt_s,
            self.params.min_integral,
            self.params.max_integral,
        );

        let out = self.params.k_p * pos_error
            + self.params.k_i * self.integral
            + self.params.k_d * vel_error;

        self.prev_time_s = Some(time_s);

        clamp(out, self.params.min_output, self.params.max_output)
    }

    /// Get the controller output for following a trajectory, which is sampled `lag_time_s` ahead.
    pub fn track(
        &mut self,
        traj: &mut dyn Trajectory1d,
        time_s: f64,
        current_pos: f64,
        current_vel: f64,
    ) -> f64 {
        let desired_time_s = time_s + self.params.lag_time_s;
        let desired_pos = traj.position(desired_time_s);
        let desired_vel = traj.velocity(desired_time_s);

        self.compute(time_s, current_pos, current_vel, desired_pos, desired_vel)
    }

    /// Clear the integral and the time of the previous call.
    pub fn reset(&mut self) {
        self.prev_time_s = None;
        self.integral = 0.0;
    }
}

impl PidController4d {
    /// Create a new controller using `linear` for x, y and z and `angular` for yaw.
    pub fn new(linear: PidParams, angular: PidParams) -> Result<Self, ParamsError> {
        Ok(Self {
            x_ctrl: PidController1d::new(linear)?,
            y_ctrl: PidController1d::new(linear)?,
            z_ctrl: PidController1d::new(linear)?,
            yaw_ctrl: PidController1d::new(angular)?,
        })
    }

    /// Create a new controller from the flight control parameters.
    pub fn from_params(params: &FlightCtrlParams) -> Result<Self, ParamsError> {
        Self::new(params.linear_pid, params.angular_pid)
    }

    /// Get the inertial frame velocity which moves the vehicle towards the trajectory.
    pub fn compute(
        &mut self,
        traj: &mut dyn Trajectory4d,
        time_s: f64,
        pose: &Pose,
        velocity: &InertialFrameVelocity,
    ) -> InertialFrameVelocity {
        let linear_lag_s = self.x_ctrl.params().lag_time_s;
        let angular_lag_s = self.yaw_ctrl.params().lag_time_s;

        let (lin_pose, lin_vel) = traj.state(time_s + linear_lag_s);
        let (ang_pose, ang_vel) = if angular_lag_s == linear_lag_s {
            (lin_pose, lin_vel)
        } else {
            traj.state(time_s + angular_lag_s)
        };

        // Express the current yaw on the same branch as the desired yaw so the controller always
        // turns the short way round
        let yaw_error_rad = get_ang_dist(pose.yaw_rad, ang_pose.yaw_rad);
        let adapted_yaw_rad = ang_pose.yaw_rad - yaw_error_rad;

        trace!(
            "PID 4D target {:?}, current {:?}, yaw error {:.4} rad",
            lin_pose,
            pose,
            yaw_error_rad
        );

        InertialFrameVelocity::new(
            self.x_ctrl.compute(
                time_s,
                pose.x_m,
                velocity.linear_x_ms,
                lin_pose.x_m,
                lin_vel.linear_x_ms,
            ),
            self.y_ctrl.compute(
                time_s,
                pose.y_m,
                velocity.linear_y_ms,
                lin_pose.y_m,
                lin_vel.linear_y_ms,
            ),
            self.z_ctrl.compute(
                time_s,
                pose.z_m,
                velocity.linear_z_ms,
                lin_pose.z_m,
                lin_vel.linear_z_ms,
            ),
            self.yaw_ctrl.compute(
                time_s,
                adapted_yaw_rad,
                velocity.angular_z_rads,
                ang_pose.yaw_rad,
                ang_vel.angular_z_rads,
            ),
        )
    }

    /// As [`PidController4d::compute`] but expressed in the vehicle's body frame, ready to be
    /// sent to the vehicle.
    pub fn compute_body(
        &mut self,
        traj: &mut dyn Trajectory4d,
        time_s: f64,
        pose: &Pose,
        velocity: &InertialFrameVelocity,
    ) -> BodyFrameVelocity {
        self.compute(traj, time_s, pose, velocity)
            .to_body_frame(pose.yaw_rad)
    }

    /// Reset all four controllers.
    pub fn reset(&mut self) {
        self.x_ctrl.reset();
        self.y_ctrl.reset();
        self.z_ctrl.reset();
        self.yaw_ctrl.reset();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{Hold1d, Hold4d, Linear1d};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pid_1d_hold() {
        let mut ctrl = PidController1d::new(PidParams::new(0.05, 0.0, 1.0)).unwrap();
        let mut traj = Hold1d::new(10.0);

        assert_abs_diff_eq!(ctrl.track(&mut traj, 0.0, 0.0, 0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ctrl.track(&mut traj, 0.1, 0.5, 0.5), -0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_1d_integral() {
        let mut ctrl = PidController1d::new(PidParams::new(0.0, 1.0, 0.0)).unwrap();

        // No history on the first call
        assert_eq!(ctrl.compute(0.0, 0.0, 0.0, 2.0, 0.0), 0.0);
        assert_abs_diff_eq!(ctrl.compute(0.5, 0.0, 0.0, 2.0, 0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ctrl.compute(1.0, 0.0, 0.0, 2.0, 0.0), 2.0, epsilon = 1e-12);

        ctrl.reset();
        assert_eq!(ctrl.compute(5.0, 0.0, 0.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_pid_1d_anti_windup() {
        let params = PidParams::new(0.0, 1.0, 0.0).with_integral_limits(-0.5, 0.5);
        let mut ctrl = PidController1d::new(params).unwrap();

        ctrl.compute(0.0, 0.0, 0.0, 10.0, 0.0);
        for i in 1..100 {
            assert!(ctrl.compute(i as f64, 0.0, 0.0, 10.0, 0.0) <= 0.5);
        }

        // Recovers as soon as the error changes sign, with no wound up integral to unwind
        assert_abs_diff_eq!(ctrl.compute(100.5, 0.0, 0.0, -1.0, 0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_1d_output_limits() {
        let params = PidParams::new(1.0, 0.0, 0.0).with_output_limits(-0.3, 0.3);
        let mut ctrl = PidController1d::new(params).unwrap();

        assert_eq!(ctrl.compute(0.0, 0.0, 0.0, 10.0, 0.0), 0.3);
        assert_eq!(ctrl.compute(0.1, 0.0, 0.0, -10.0, 0.0), -0.3);
        assert_abs_diff_eq!(ctrl.compute(0.2, 0.0, 0.0, 0.1, 0.0), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_1d_lag() {
        let params = PidParams::new(1.0, 0.0, 0.0).with_lag_time(0.5);
        let mut ctrl = PidController1d::new(params).unwrap();
        let mut traj = Linear1d::new(0.0, 1.0, 10.0).unwrap();

        // Anchor the trajectory at zero, then sample half a second ahead
        traj.position(0.0);
        assert_abs_diff_eq!(ctrl.track(&mut traj, 2.0, 2.0, 1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_1d_rejects_bad_params() {
        assert!(PidController1d::new(PidParams::new(1.0, 0.0, 0.0).with_output_limits(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_pid_4d_inertial() {
        let mut ctrl = PidController4d::new(PidParams::new(1.0, 0.0, 0.0), PidParams::new(2.0, 0.0, 0.0))
            .unwrap();
        let mut traj = Hold4d::new(Pose::new(1.0, -2.0, 3.0, 0.5));

        let out = ctrl.compute(&mut traj, 0.0, &Pose::default(), &InertialFrameVelocity::default());

        assert_abs_diff_eq!(out.linear_x_ms, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.linear_y_ms, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.linear_z_ms, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.angular_z_rads, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_4d_yaw_short_way() {
        let mut ctrl = PidController4d::new(PidParams::new(1.0, 0.0, 0.0), PidParams::new(1.0, 0.0, 0.0))
            .unwrap();
        let mut traj = Hold4d::new(Pose::new(0.0, 0.0, 0.0, -3.0));
        let pose = Pose::new(0.0, 0.0, 0.0, 3.0);

        // Naively the error is -6 rad, the short way round is anti-clockwise
        let out = ctrl.compute(&mut traj, 0.0, &pose, &InertialFrameVelocity::default());
        assert_abs_diff_eq!(
            out.angular_z_rads,
            2.0 * std::f64::consts::PI - 6.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pid_4d_body_frame() {
        let mut ctrl = PidController4d::from_params(&FlightCtrlParams {
            linear_pid: PidParams::new(1.0, 0.0, 0.0),
            angular_pid: PidParams::new(1.0, 0.0, 0.0),
            ..Default::default()
        })
        .unwrap();

        // Target is along inertial Y, which is straight ahead when facing +Y
        let mut traj = Hold4d::new(Pose::new(0.0, 1.0, 0.0, FRAC_PI_2));
        let pose = Pose::new(0.0, 0.0, 0.0, FRAC_PI_2);

        let out = ctrl.compute_body(&mut traj, 0.0, &pose, &InertialFrameVelocity::default());
        assert_abs_diff_eq!(out.linear_x_ms, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.linear_y_ms, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.angular_z_rads, 0.0, epsilon = 1e-12);
    }
}
