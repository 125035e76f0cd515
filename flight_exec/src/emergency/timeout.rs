//! Timeout emergency, triggered once a fixed time has passed

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, RecvTimeoutError, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

// Internal
use super::{trigger, EmergencyBroadcaster, EmergencyError, EmergencyNotifier};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Triggers once after a delay unless stopped first.
///
/// Useful as a geofence in time: a flight which overruns is brought down regardless of what it
/// was doing.
pub struct TimeoutEmergency {
    broadcaster: Arc<EmergencyBroadcaster>,

    fired: Arc<AtomicBool>,

    stop_sender: Mutex<Option<Sender<()>>>,

    timer_jh: Mutex<Option<JoinHandle<()>>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimeoutEmergency {
    /// Start the timer on a new thread.
    pub fn start(
        name: &str,
        broadcaster: EmergencyBroadcaster,
        delay: Duration,
    ) -> Result<Self, EmergencyError> {
        let broadcaster = Arc::new(broadcaster);
        let fired = Arc::new(AtomicBool::new(false));

        let (stop_sender, stop_reciever) = channel::<()>();

        let broadcaster_timer = broadcaster.clone();
        let fired_timer = fired.clone();
        let timer_name = format!("emergency::{}", name);

        let timer_jh = thread::Builder::new()
            .name(timer_name.clone())
            .spawn(move || match stop_reciever.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    fired_timer.store(true, Ordering::SeqCst);
                    trigger(&timer_name, &broadcaster_timer);
                }
                _ => debug!("{} stopped before the timeout", timer_name),
            })
            .map_err(EmergencyError::ThreadSpawnError)?;

        Ok(Self {
            broadcaster,
            fired,
            stop_sender: Mutex::new(Some(stop_sender)),
            timer_jh: Mutex::new(Some(timer_jh)),
        })
    }

    /// True once the timeout has triggered.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Stop the timer if it hasn't fired yet and wait for its thread to exit.
    pub fn stop(&self) -> Result<(), EmergencyError> {
        // Dropping the sender wakes the timer
        self.stop_sender.lock()?.take();

        match self.timer_jh.lock()?.take() {
            Some(jh) => jh.join().map_err(|_| EmergencyError::ThreadPanicked),
            None => Ok(()),
        }
    }
}

impl EmergencyNotifier for TimeoutEmergency {
    fn broadcaster(&self) -> &EmergencyBroadcaster {
        &self.broadcaster
    }
}

impl Drop for TimeoutEmergency {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Couldn't stop timeout emergency: {}", e);
        }
    }
}
