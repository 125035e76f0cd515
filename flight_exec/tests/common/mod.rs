//! Mock vehicle shared by the integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use flight_lib::{
    cmd::{run_periodic, CancelToken, CmdError, CmdStatus, Command, TickAction},
    geom::{BodyFrameVelocity, Pose},
    services::{
        DroneState, FlyingState, FlyingStateObserver, LandIssuer, ServiceError, StateEstimator,
        TakeOffIssuer, VelocityIssuer,
    },
};

/// A vehicle which records what it is sent. Landing completes after a set number of land
/// signals.
pub struct MockVehicle {
    pub velocities: Mutex<Vec<BodyFrameVelocity>>,
    pub lands: AtomicUsize,
    pub takeoffs: AtomicUsize,
    pub lands_to_touchdown: usize,
    pub flying_state: Mutex<Option<FlyingState>>,
}

/// A command which ticks every 10 ms for a while, counting starts and completions.
pub struct CountingCmd {
    pub duration_s: f64,
    pub started: &'static AtomicUsize,
    pub completed: &'static AtomicUsize,
}

impl MockVehicle {
    pub fn flying(lands_to_touchdown: usize) -> Self {
        Self {
            velocities: Mutex::new(Vec::new()),
            lands: AtomicUsize::new(0),
            takeoffs: AtomicUsize::new(0),
            lands_to_touchdown,
            flying_state: Mutex::new(Some(FlyingState::Flying)),
        }
    }

    pub fn num_velocities(&self) -> usize {
        self.velocities.lock().unwrap().len()
    }

    pub fn state(&self) -> Option<FlyingState> {
        *self.flying_state.lock().unwrap()
    }
}

impl VelocityIssuer for MockVehicle {
    fn send_velocity(&self, velocity: &BodyFrameVelocity) -> Result<(), ServiceError> {
        self.velocities.lock().unwrap().push(*velocity);
        Ok(())
    }
}

impl LandIssuer for MockVehicle {
    fn send_land(&self) -> Result<(), ServiceError> {
        let lands = self.lands.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.flying_state.lock().unwrap();
        *state = Some(if lands >= self.lands_to_touchdown {
            FlyingState::Landed
        } else {
            FlyingState::Landing
        });
        Ok(())
    }
}

impl TakeOffIssuer for MockVehicle {
    fn send_takeoff(&self, _altitude_m: Option<f64>) -> Result<(), ServiceError> {
        self.takeoffs.fetch_add(1, Ordering::SeqCst);
        *self.flying_state.lock().unwrap() = Some(FlyingState::Hovering);
        Ok(())
    }
}

impl FlyingStateObserver for MockVehicle {
    fn current_flying_state(&self) -> Result<Option<FlyingState>, ServiceError> {
        Ok(self.state())
    }
}

impl StateEstimator for MockVehicle {
    fn current_state(&self) -> Option<DroneState> {
        Some(DroneState {
            pose: Pose::new(0.0, 0.0, 1.0, 0.0),
            velocity: Default::default(),
            timestamp_s: self.num_velocities() as f64,
        })
    }
}

impl Command for CountingCmd {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let status = run_periodic(0.01, Some(self.duration_s), cancel, |_| {
            Ok(TickAction::Continue)
        })?;
        if status == CmdStatus::Completed {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(status)
    }
}

/// Leak a counter so commands can hold it without lifetimes getting in the way.
pub fn counter() -> &'static AtomicUsize {
    Box::leak(Box::new(AtomicUsize::new(0)))
}
