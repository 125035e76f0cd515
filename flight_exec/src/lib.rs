//! # Flight library.
//!
//! Trajectory generation, trajectory control and task execution for small drones. Vehicle
//! specific transport and state estimation are provided by implementing the traits in
//! [`services`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Commands - the individual actions a task is made of
pub mod cmd;

/// Emergency notifiers - watch for trigger conditions and submit a safety task
pub mod emergency;

/// Geometry - poses, velocities and frame transforms
pub mod geom;

/// Vehicle services - the capabilities the flight software consumes
pub mod services;

/// Task execution - runs tasks on a dedicated thread with priority based preemption
pub mod task_exec;

/// Trajectory generation - 1D and 4D generators and choreographies
pub mod traj;

/// Trajectory control module - keeps the vehicle on the given trajectory
pub mod traj_ctrl;
