//! # Emergency notifiers
//!
//! A notifier watches for a trigger condition (a key, a button combination, a timer) and, when it
//! fires, submits a fixed emergency task to every executor registered with it. Executors are held
//! in an explicit list owned by each notifier's [`EmergencyBroadcaster`]. Several notifiers may be
//! registered against the same executor and any one of them firing is enough to preempt it.
//!
//! Input driven notifiers implement [`InputHandler`] and are fed from a channel of input events
//! by [`spawn_input_listener`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod joystick;
mod keyboard;
mod timeout;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use std::{
    sync::{mpsc::Receiver, Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

// Internal
pub use joystick::GameControllerEmergency;
pub use keyboard::KeyboardEmergency;
pub use timeout::TimeoutEmergency;

use crate::task_exec::{Task, TaskSubmitter};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A watcher which submits an emergency task when triggered.
pub trait EmergencyNotifier {
    fn broadcaster(&self) -> &EmergencyBroadcaster;

    fn register_task_executor(
        &self,
        submitter: Arc<dyn TaskSubmitter>,
    ) -> Result<(), EmergencyError> {
        self.broadcaster().register(submitter)
    }

    fn remove_task_executor(
        &self,
        submitter: &Arc<dyn TaskSubmitter>,
    ) -> Result<bool, EmergencyError> {
        self.broadcaster().remove(submitter)
    }
}

/// Consumes snapshots from an input device.
pub trait InputHandler<E>: Send + Sync {
    fn handle(&self, event: &E);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Submits one emergency task to a list of registered executors.
pub struct EmergencyBroadcaster {
    task: Task,
    submitters: Mutex<Vec<Arc<dyn TaskSubmitter>>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    #[error("Sync primitive is poisoned")]
    PoisonError,

    #[error("Couldn't start the notifier thread: {0}")]
    ThreadSpawnError(std::io::Error),

    #[error("The notifier thread panicked")]
    ThreadPanicked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EmergencyBroadcaster {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            submitters: Mutex::new(Vec::new()),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn register(&self, submitter: Arc<dyn TaskSubmitter>) -> Result<(), EmergencyError> {
        self.submitters.lock()?.push(submitter);
        Ok(())
    }

    /// Remove a registered submitter. Returns false if it wasn't registered.
    pub fn remove(&self, submitter: &Arc<dyn TaskSubmitter>) -> Result<bool, EmergencyError> {
        let mut submitters = self.submitters.lock()?;
        let len_before = submitters.len();
        submitters.retain(|s| !same_submitter(s, submitter));
        Ok(submitters.len() != len_before)
    }

    pub fn num_registered(&self) -> usize {
        match self.submitters.lock() {
            Ok(s) => s.len(),
            _ => 0,
        }
    }

    /// Submit the emergency task to every registered submitter, returning how many accepted it.
    pub fn notify(&self) -> Result<usize, EmergencyError> {
        // Submit outside the lock so a slow executor can't block registration
        let submitters = self.submitters.lock()?.clone();

        info!(
            "Submitting {:?} emergency task to {} executor(s)",
            self.task.task_type(),
            submitters.len()
        );

        let mut accepted = 0;
        for submitter in submitters {
            match submitter.submit(self.task.clone()) {
                Ok(()) => accepted += 1,
                Err(e) => debug!("Emergency task not accepted: {}", e),
            }
        }

        Ok(accepted)
    }
}

impl<G> From<PoisonError<G>> for EmergencyError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Forward every event received on `events` to `handler` on a new thread.
///
/// The thread exits once every sender of `events` has been dropped.
pub fn spawn_input_listener<E, H>(
    name: &str,
    handler: Arc<H>,
    events: Receiver<E>,
) -> Result<JoinHandle<()>, EmergencyError>
where
    E: Send + 'static,
    H: InputHandler<E> + 'static,
{
    let thread_name = format!("emergency::{}", name);

    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            while let Ok(event) = events.recv() {
                handler.handle(&event);
            }
            debug!("{} input closed", thread_name);
        })
        .map_err(EmergencyError::ThreadSpawnError)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Compare submitters by address only, vtable pointers are not unique.
fn same_submitter(a: &Arc<dyn TaskSubmitter>, b: &Arc<dyn TaskSubmitter>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Notify and log rather than propagate, for use in input and timer threads.
fn trigger(notifier: &str, broadcaster: &EmergencyBroadcaster) {
    warn!("{} emergency triggered", notifier);

    if let Err(e) = broadcaster.notify() {
        error!("{} couldn't notify executors: {}", notifier, e);
    }
}
