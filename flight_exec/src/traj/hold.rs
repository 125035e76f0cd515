//! Constant position trajectories

use super::{Trajectory1d, Trajectory4d};
use crate::geom::{InertialFrameVelocity, Pose};

/// Hold a single axis at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hold1d {
    position: f64,
}

/// Hold a fixed pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hold4d {
    pose: Pose,
}

impl Hold1d {
    pub fn new(position: f64) -> Self {
        Self { position }
    }
}

impl Trajectory1d for Hold1d {
    fn position(&mut self, _time_s: f64) -> f64 {
        self.position
    }

    fn velocity(&mut self, _time_s: f64) -> f64 {
        0.0
    }
}

impl Hold4d {
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl Trajectory4d for Hold4d {
    fn position(&mut self, _time_s: f64) -> Pose {
        self.pose
    }

    fn velocity(&mut self, _time_s: f64) -> InertialFrameVelocity {
        InertialFrameVelocity::default()
    }
}
