//! Tasks and their priorities

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fmt, sync::Arc};

use crate::cmd::{CmdError, Command};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered, immutable list of commands with a priority.
///
/// Cloning a task is cheap and shares the commands, so the same task can be submitted to several
/// executors.
#[derive(Clone)]
pub struct Task {
    commands: Arc<Vec<Box<dyn Command>>>,
    task_type: TaskType,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Priority of a task, in increasing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskType {
    Normal,
    FirstOrderEmergency,
    SecondOrderEmergency,
}

/// How a task finished.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Every command completed
    Completed,

    /// The task was preempted or the executor shut down
    Cancelled,

    /// A command faulted and the rest of the task was abandoned
    Faulted(CmdError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TaskType {
    /// True if a task of this type may preempt a task of type `other`.
    pub fn has_higher_priority(&self, other: TaskType) -> bool {
        *self > other
    }

    pub fn is_emergency(&self) -> bool {
        !matches!(self, TaskType::Normal)
    }
}

impl Task {
    pub fn new(task_type: TaskType, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            commands: Arc::new(commands),
            task_type,
        }
    }

    /// A task made of a single command.
    pub fn single<C>(task_type: TaskType, command: C) -> Self
    where
        C: Command + 'static,
    {
        let command: Box<dyn Command> = Box::new(command);
        Self::new(task_type, vec![command])
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("task_type", &self.task_type)
            .field(
                "commands",
                &self.commands.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
