//! Recording vehicle services for command tests

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::{
    geom::BodyFrameVelocity,
    services::{
        DroneState, FlyingState, FlyingStateObserver, LandIssuer, ServiceError, StateEstimator,
        TakeOffIssuer, VelocityIssuer,
    },
};

/// Records every velocity sent.
#[derive(Default)]
pub struct RecordingIssuer {
    pub sent: Mutex<Vec<BodyFrameVelocity>>,
}

/// Counts land and takeoff signals.
#[derive(Default)]
pub struct SignalCounter {
    pub lands: AtomicUsize,
    pub takeoffs: AtomicUsize,
}

/// Reports whatever flying state it is set to.
pub struct ScriptedObserver {
    pub state: Mutex<Result<Option<FlyingState>, ServiceError>>,
}

/// Reports whatever drone state it is set to.
#[derive(Default)]
pub struct FixedEstimator {
    pub state: Mutex<Option<DroneState>>,
}

impl RecordingIssuer {
    pub fn sent(&self) -> Vec<BodyFrameVelocity> {
        self.sent.lock().unwrap().clone()
    }
}

impl VelocityIssuer for RecordingIssuer {
    fn send_velocity(&self, velocity: &BodyFrameVelocity) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(*velocity);
        Ok(())
    }
}

impl LandIssuer for SignalCounter {
    fn send_land(&self) -> Result<(), ServiceError> {
        self.lands.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl TakeOffIssuer for SignalCounter {
    fn send_takeoff(&self, _altitude_m: Option<f64>) -> Result<(), ServiceError> {
        self.takeoffs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ScriptedObserver {
    pub fn new(state: Option<FlyingState>) -> Self {
        Self {
            state: Mutex::new(Ok(state)),
        }
    }

    pub fn set(&self, state: Result<Option<FlyingState>, ServiceError>) {
        *self.state.lock().unwrap() = state;
    }
}

impl FlyingStateObserver for ScriptedObserver {
    fn current_flying_state(&self) -> Result<Option<FlyingState>, ServiceError> {
        self.state.lock().unwrap().clone()
    }
}

impl FixedEstimator {
    pub fn set(&self, state: Option<DroneState>) {
        *self.state.lock().unwrap() = state;
    }
}

impl StateEstimator for FixedEstimator {
    fn current_state(&self) -> Option<DroneState> {
        *self.state.lock().unwrap()
    }
}
