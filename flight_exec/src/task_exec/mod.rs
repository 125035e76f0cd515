//! # Task executor
//!
//! Each [`TaskExecutor`] owns a worker thread which runs one [`Task`] at a time, executing its
//! commands strictly in order. There is no queue: a submitted task either starts (preempting the
//! current one if it has a higher priority) or is rejected.
//!
//! Submission, preemption and the worker's own completion transition are all made under the
//! same lock. A task accepted before the running task's completion is observed always runs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod task;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::{
    sync::{
        mpsc::{channel, SendError, Sender},
        Arc, Condvar, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

// Internal
use crate::cmd::CancelToken;
pub use task::{Task, TaskOutcome, TaskType};
use worker::{worker_thread, WorkerSignal};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something tasks can be submitted to.
pub trait TaskSubmitter: Send + Sync {
    /// Submit a task, returning an error if it was not accepted.
    fn submit(&self, task: Task) -> Result<(), TaskExecError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs tasks on a dedicated thread with priority based preemption.
pub struct TaskExecutor {
    shared: Arc<Shared>,

    worker_jh: Mutex<Option<JoinHandle<Result<(), TaskExecError>>>>,

    worker_sender: Mutex<Sender<WorkerSignal>>,
}

struct Shared {
    name: String,

    state: Mutex<ExecState>,

    /// Notified whenever the executor becomes idle
    idle: Condvar,
}

#[derive(Default)]
struct ExecState {
    running: Option<RunningTask>,

    /// Accepted but not yet started by the worker
    pending: Option<Task>,

    shutdown: bool,

    last_outcome: Option<TaskOutcome>,

    next_id: u64,
}

struct RunningTask {
    id: u64,
    task_type: TaskType,
    cancel: CancelToken,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TaskExecError {
    #[error("A {submitted:?} task cannot preempt the current {current:?} task")]
    Rejected {
        submitted: TaskType,
        current: TaskType,
    },

    #[error("The executor has been shut down")]
    ShutDown,

    #[error("Sync primitive is poisoned")]
    PoisonError,

    #[error("Failed to send signal {0:?} to the worker thread")]
    SendError(WorkerSignal),

    #[error("Couldn't start the worker thread: {0}")]
    ThreadSpawnError(std::io::Error),

    #[error("The worker thread panicked")]
    WorkerPanicked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TaskExecutor {
    /// Create a new executor, starting its worker thread.
    pub fn new(name: &str) -> Result<Self, TaskExecError> {
        let shared = Arc::new(Shared {
            name: name.to_string(),
            state: Mutex::new(ExecState::default()),
            idle: Condvar::new(),
        });
        let shared_worker = shared.clone();

        let (worker_sender, rx) = channel();

        let worker_jh = thread::Builder::new()
            .name(format!("task_exec::{}", name))
            .spawn(move || worker_thread(shared_worker, rx))
            .map_err(TaskExecError::ThreadSpawnError)?;

        Ok(Self {
            shared,
            worker_jh: Mutex::new(Some(worker_jh)),
            worker_sender: Mutex::new(worker_sender),
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Submit a task.
    ///
    /// An idle executor accepts any task. A busy one only accepts a task with a higher priority
    /// than the one it is running (or about to run), cancelling the running task so the new one
    /// starts within one command tick. Anything else is rejected.
    pub fn submit(&self, task: Task) -> Result<(), TaskExecError> {
        let mut state = self.shared.state.lock()?;

        if state.shutdown {
            return Err(TaskExecError::ShutDown);
        }

        let current = match (&state.pending, &state.running) {
            (Some(p), _) => Some(p.task_type()),
            (None, Some(r)) => Some(r.task_type),
            (None, None) => None,
        };

        if let Some(current) = current {
            if !task.task_type().has_higher_priority(current) {
                info!(
                    "{} rejected {:?} task while busy with a {:?} task",
                    self.shared.name,
                    task.task_type(),
                    current
                );
                return Err(TaskExecError::Rejected {
                    submitted: task.task_type(),
                    current,
                });
            }
        }

        if let Some(running) = &state.running {
            info!(
                "{} preempting {:?} task with {:?} task",
                self.shared.name,
                running.task_type,
                task.task_type()
            );
            running.cancel.cancel();
        } else {
            info!("{} accepted {:?} task", self.shared.name, task.task_type());
        }

        state.pending = Some(task);

        // Signal while holding the state lock so a concurrent shutdown can't slip in between
        self.worker_sender.lock()?.send(WorkerSignal::TaskPending)?;

        Ok(())
    }

    /// True if there is no task running or waiting to start.
    pub fn is_idle(&self) -> bool {
        match self.shared.state.lock() {
            Ok(state) => state.running.is_none() && state.pending.is_none(),
            _ => false,
        }
    }

    /// Type of the task currently running, if any.
    pub fn running_task_type(&self) -> Option<TaskType> {
        match self.shared.state.lock() {
            Ok(state) => state.running.as_ref().map(|r| r.task_type),
            _ => None,
        }
    }

    /// How the most recent task finished.
    pub fn last_outcome(&self) -> Option<TaskOutcome> {
        match self.shared.state.lock() {
            Ok(state) => state.last_outcome.clone(),
            _ => None,
        }
    }

    /// Block until the executor is idle or the timeout passes. Returns true if it became idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = match self.shared.state.lock() {
            Ok(s) => s,
            Err(_) => return false,
        };

        match self.shared.idle.wait_timeout_while(state, timeout, |s| {
            s.running.is_some() || s.pending.is_some()
        }) {
            Ok((_, result)) => !result.timed_out(),
            Err(_) => false,
        }
    }

    /// Cancel any running task, stop the worker and wait for it to exit.
    ///
    /// Calling this more than once is harmless.
    pub fn shutdown(&self) -> Result<(), TaskExecError> {
        {
            let mut state = self.shared.state.lock()?;

            if !state.shutdown {
                info!("{} shutting down", self.shared.name);
                state.shutdown = true;

                // The worker may already be gone, in which case joining reports why
                if self.worker_sender.lock()?.send(WorkerSignal::Stop).is_err() {
                    warn!("{} worker already stopped", self.shared.name);
                }
            }

            state.pending = None;
            if let Some(running) = &state.running {
                running.cancel.cancel();
            }
        }

        let jh = self.worker_jh.lock()?.take();
        let result = match jh {
            Some(jh) => match jh.join() {
                Ok(r) => r,
                Err(_) => Err(TaskExecError::WorkerPanicked),
            },
            None => Ok(()),
        };

        self.shared.idle.notify_all();

        result
    }
}

impl TaskSubmitter for TaskExecutor {
    fn submit(&self, task: Task) -> Result<(), TaskExecError> {
        TaskExecutor::submit(self, task)
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Error shutting down {}: {}", self.shared.name, e);
        }
    }
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("name", &self.shared.name)
            .field("running", &self.running_task_type())
            .finish()
    }
}

impl<G> From<PoisonError<G>> for TaskExecError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

impl From<SendError<WorkerSignal>> for TaskExecError {
    fn from(e: SendError<WorkerSignal>) -> Self {
        Self::SendError(e.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd::{run_periodic, CmdError, CmdStatus, Command, TickAction};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Instant,
    };

    /// Ticks every 10 ms for a time, counting starts and finishes.
    struct Sleep {
        duration_s: f64,
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    struct Fault;

    impl Command for Sleep {
        fn name(&self) -> &'static str {
            "Sleep"
        }

        fn execute(&self, cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let status = run_periodic(0.01, Some(self.duration_s), cancel, |_| {
                Ok(TickAction::Continue)
            })?;
            if status == CmdStatus::Completed {
                self.finished.fetch_add(1, Ordering::SeqCst);
            }
            Ok(status)
        }
    }

    impl Command for Fault {
        fn name(&self) -> &'static str {
            "Fault"
        }

        fn execute(&self, _cancel: &CancelToken) -> Result<CmdStatus, CmdError> {
            Err(CmdError::FeedbackLost)
        }
    }

    fn sleep_task(
        task_type: TaskType,
        duration_s: f64,
        count: usize,
    ) -> (Task, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let cmds: Vec<Box<dyn Command>> = (0..count)
            .map(|_| {
                Box::new(Sleep {
                    duration_s,
                    started: started.clone(),
                    finished: finished.clone(),
                }) as Box<dyn Command>
            })
            .collect();
        (Task::new(task_type, cmds), started, finished)
    }

    #[test]
    fn test_runs_commands_in_order() {
        let exec = TaskExecutor::new("test_order").unwrap();
        assert!(exec.is_idle());
        assert_eq!(exec.last_outcome(), None);

        let (task, started, finished) = sleep_task(TaskType::Normal, 0.02, 3);
        exec.submit(task).unwrap();

        assert!(exec.wait_idle(Duration::from_secs(2)));
        assert_eq!(started.load(Ordering::SeqCst), 3);
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert_eq!(exec.last_outcome(), Some(TaskOutcome::Completed));

        // Idle again, so another normal task is accepted
        let (task, _, finished) = sleep_task(TaskType::Normal, 0.01, 1);
        exec.submit(task).unwrap();
        assert!(exec.wait_idle(Duration::from_secs(2)));
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fault_aborts_task() {
        let exec = TaskExecutor::new("test_fault").unwrap();

        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let task = Task::new(
            TaskType::Normal,
            vec![
                Box::new(Fault) as Box<dyn Command>,
                Box::new(Sleep {
                    duration_s: 0.01,
                    started: started.clone(),
                    finished,
                }),
            ],
        );
        exec.submit(task).unwrap();

        assert!(exec.wait_idle(Duration::from_secs(2)));
        assert_eq!(
            exec.last_outcome(),
            Some(TaskOutcome::Faulted(CmdError::FeedbackLost))
        );
        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wait_idle_timeout() {
        let exec = TaskExecutor::new("test_wait").unwrap();

        let (task, _, _) = sleep_task(TaskType::Normal, 5.0, 1);
        exec.submit(task).unwrap();

        let start = Instant::now();
        assert!(!exec.wait_idle(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(!exec.is_idle());
    }

    #[test]
    fn test_shutdown_cancels() {
        let exec = TaskExecutor::new("test_shutdown").unwrap();

        let (task, started, finished) = sleep_task(TaskType::Normal, 5.0, 2);
        exec.submit(task).unwrap();

        let start = Instant::now();
        while started.load(Ordering::SeqCst) == 0 && start.elapsed() < Duration::from_secs(1) {
            thread::sleep(Duration::from_millis(1));
        }

        exec.shutdown().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(exec.last_outcome(), Some(TaskOutcome::Cancelled));

        let (task, _, _) = sleep_task(TaskType::SecondOrderEmergency, 0.01, 1);
        assert!(matches!(exec.submit(task), Err(TaskExecError::ShutDown)));

        // Second shutdown does nothing
        exec.shutdown().unwrap();
    }
}
