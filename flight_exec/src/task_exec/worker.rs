//! Worker thread running the executor's tasks so submitters are never blocked.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{mpsc::Receiver, Arc};

use log::{debug, error, info};

use super::{RunningTask, Shared, Task, TaskExecError, TaskOutcome};
use crate::cmd::{CancelToken, CmdStatus};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum WorkerSignal {
    /// A task has been accepted and is waiting to start
    TaskPending,

    /// The worker should stop
    Stop,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub(super) fn worker_thread(
    shared: Arc<Shared>,
    main_reciever: Receiver<WorkerSignal>,
) -> Result<(), TaskExecError> {
    while let Ok(signal) = main_reciever.recv() {
        match signal {
            WorkerSignal::Stop => break,
            WorkerSignal::TaskPending => {
                // A preempting task may be accepted while one runs, so keep going until there is
                // nothing left to start
                while let Some((id, task, cancel)) = start_pending(&shared)? {
                    let outcome = run_task(&shared.name, &task, &cancel);
                    finish_task(&shared, id, outcome)?;
                }
            }
        }
    }

    debug!("{} worker stopped", shared.name);

    Ok(())
}

/// Move the pending task, if any, into the running slot.
fn start_pending(
    shared: &Shared,
) -> Result<Option<(u64, Task, CancelToken)>, TaskExecError> {
    let mut state = shared.state.lock()?;

    if state.shutdown {
        return Ok(None);
    }

    let task = match state.pending.take() {
        Some(t) => t,
        None => return Ok(None),
    };

    state.next_id += 1;
    let id = state.next_id;
    let cancel = CancelToken::new();

    state.running = Some(RunningTask {
        id,
        task_type: task.task_type(),
        cancel: cancel.clone(),
    });

    info!(
        "{} starting {:?} task with {} command(s)",
        shared.name,
        task.task_type(),
        task.len()
    );

    Ok(Some((id, task, cancel)))
}

/// Run each command of the task in order, stopping at the first cancellation or fault.
fn run_task(exec_name: &str, task: &Task, cancel: &CancelToken) -> TaskOutcome {
    for cmd in task.commands() {
        if cancel.is_cancelled() {
            return TaskOutcome::Cancelled;
        }

        debug!("{} starting {}", exec_name, cmd.name());

        match cmd.execute(cancel) {
            Ok(CmdStatus::Completed) => debug!("{} finished {}", exec_name, cmd.name()),
            Ok(CmdStatus::Cancelled) => {
                debug!("{} cancelled {}", exec_name, cmd.name());
                return TaskOutcome::Cancelled;
            }
            Err(e) => {
                error!(
                    "{} aborting task, {} faulted: {}",
                    exec_name,
                    cmd.name(),
                    e
                );
                return TaskOutcome::Faulted(e);
            }
        }
    }

    TaskOutcome::Completed
}

/// Clear the running slot and record the outcome, waking anyone waiting for the executor to be
/// idle.
fn finish_task(shared: &Shared, id: u64, outcome: TaskOutcome) -> Result<(), TaskExecError> {
    let mut state = shared.state.lock()?;

    if state.running.as_ref().map(|r| r.id) == Some(id) {
        state.running = None;
    }

    info!("{} task finished: {:?}", shared.name, outcome);
    state.last_outcome = Some(outcome);

    if state.pending.is_none() {
        shared.idle.notify_all();
    }

    Ok(())
}
