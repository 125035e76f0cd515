//! # Geometry module
//!
//! Poses, velocities and the transforms between the inertial (world fixed) frame and the body
//! (vehicle fixed) frame. Only rotations about the vertical axis are considered, the vehicle is
//! assumed to hold itself level.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default tolerance on position when comparing poses.
pub const DEFAULT_POSITION_EPS_M: f64 = 0.05;

/// Default tolerance on yaw when comparing poses.
pub const DEFAULT_YAW_EPS_RAD: f64 = 0.05;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of the vehicle in the inertial frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,

    /// Heading about the vertical axis, anti-clockwise from the inertial X axis
    pub yaw_rad: f64,
}

/// Velocity expressed in the inertial frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InertialFrameVelocity {
    pub linear_x_ms: f64,
    pub linear_y_ms: f64,
    pub linear_z_ms: f64,
    pub angular_z_rads: f64,
}

/// Velocity expressed in the body frame, X pointing forwards and Y to the left.
///
/// This is the shape most vehicle transports accept as a command.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BodyFrameVelocity {
    pub linear_x_ms: f64,
    pub linear_y_ms: f64,
    pub linear_z_ms: f64,
    pub angular_z_rads: f64,
}

/// Roll (about X), pitch (about Y) and yaw (about Z) angles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EulerAngles {
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, z_m: f64, yaw_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            z_m,
            yaw_rad,
        }
    }

    /// Build a pose from a position and an attitude quaternion, as usually produced by state
    /// estimators.
    pub fn from_position_attitude(
        position_m: &Vector3<f64>,
        attitude_q: &UnitQuaternion<f64>,
    ) -> Self {
        Self {
            x_m: position_m[0],
            y_m: position_m[1],
            z_m: position_m[2],
            yaw_rad: EulerAngles::from_quaternion(attitude_q).yaw_rad,
        }
    }

    /// Compare two poses using the default tolerances.
    pub fn is_close(&self, other: &Pose) -> bool {
        self.is_close_within(other, DEFAULT_POSITION_EPS_M, DEFAULT_YAW_EPS_RAD)
    }

    /// Compare two poses component by component. Yaw is compared by the shortest angular distance.
    pub fn is_close_within(&self, other: &Pose, position_eps_m: f64, yaw_eps_rad: f64) -> bool {
        (self.x_m - other.x_m).abs() <= position_eps_m
            && (self.y_m - other.y_m).abs() <= position_eps_m
            && (self.z_m - other.z_m).abs() <= position_eps_m
            && get_ang_dist(self.yaw_rad, other.yaw_rad).abs() <= yaw_eps_rad
    }

    /// The position part of the pose.
    pub fn position(&self) -> [f64; 3] {
        [self.x_m, self.y_m, self.z_m]
    }
}

impl InertialFrameVelocity {
    pub fn new(linear_x_ms: f64, linear_y_ms: f64, linear_z_ms: f64, angular_z_rads: f64) -> Self {
        Self {
            linear_x_ms,
            linear_y_ms,
            linear_z_ms,
            angular_z_rads,
        }
    }

    /// Express this velocity in the body frame of a vehicle with the given yaw.
    pub fn to_body_frame(&self, yaw_rad: f64) -> BodyFrameVelocity {
        let (x, y) = rotate_z(self.linear_x_ms, self.linear_y_ms, -yaw_rad);

        BodyFrameVelocity {
            linear_x_ms: x,
            linear_y_ms: y,
            linear_z_ms: self.linear_z_ms,
            angular_z_rads: self.angular_z_rads,
        }
    }
}

impl BodyFrameVelocity {
    pub fn new(linear_x_ms: f64, linear_y_ms: f64, linear_z_ms: f64, angular_z_rads: f64) -> Self {
        Self {
            linear_x_ms,
            linear_y_ms,
            linear_z_ms,
            angular_z_rads,
        }
    }

    /// A command to stop moving.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Express this velocity in the inertial frame given the vehicle's yaw.
    pub fn to_inertial_frame(&self, yaw_rad: f64) -> InertialFrameVelocity {
        let (x, y) = rotate_z(self.linear_x_ms, self.linear_y_ms, yaw_rad);

        InertialFrameVelocity {
            linear_x_ms: x,
            linear_y_ms: y,
            linear_z_ms: self.linear_z_ms,
            angular_z_rads: self.angular_z_rads,
        }
    }
}

impl EulerAngles {
    /// Convert an attitude quaternion into euler angles.
    ///
    /// The pitch is limited to [-pi/2, pi/2], at which point roll and yaw become degenerate.
    pub fn from_quaternion(q: &UnitQuaternion<f64>) -> Self {
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);

        let roll_rad = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

        // Rounding on near-vertical attitudes can push the argument just outside asin's domain
        let pitch_rad = (2.0 * (w * y - z * x)).max(-1.0).min(1.0).asin();

        let yaw_rad = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        Self {
            roll_rad,
            pitch_rad,
            yaw_rad,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate a 2D vector anti-clockwise about Z by the given angle.
fn rotate_z(x: f64, y: f64, angle_rad: f64) -> (f64, f64) {
    let (sin, cos) = angle_rad.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}
