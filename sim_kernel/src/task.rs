//! # Task Activation Gateway
//!
//! Turns activation requests, from the API or from an expiring alarm, into
//! task state transitions, and tells the external dispatcher when a task
//! becomes ready.
//!
//! ```text
//! SUSPENDED --activate--> READY --dispatch--> RUNNING --terminate (none pending)--> SUSPENDED
//!                           ^                    |
//!                           +-- terminate (pending activation) --+
//! ```
//!
//! The activation count is the number of activations that have not started
//! yet. A ready task always has at least one; dispatch consumes one. The
//! count can never exceed the task's configured ceiling.

use crate::config::TaskConfig;
use core_types::TaskId;
use kernel_api::{Dispatcher, KernelError, TaskState};
use log::debug;

/// Result of a successful activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The task was suspended and is now ready
    Readied,
    /// The task was already ready or running; one more activation is pending
    Queued { pending: u32 },
}

/// Per-task activation record
#[derive(Debug, Clone)]
pub struct TaskControlBlock {
    name: String,
    state: TaskState,
    activation_count: u32,
    max_activations: u32,
}

impl TaskControlBlock {
    fn from_config(config: &TaskConfig) -> Self {
        Self {
            name: config.name.clone(),
            state: TaskState::Suspended,
            activation_count: 0,
            max_activations: config.max_activations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Activations recorded but not yet dispatched
    pub fn activation_count(&self) -> u32 {
        self.activation_count
    }

    /// Activation ceiling
    pub fn max_activations(&self) -> u32 {
        self.max_activations
    }
}

/// Activation gateway
///
/// Owns the task records and the dispatcher that consumes ready tasks.
pub struct ActivationGateway<D> {
    tasks: Vec<TaskControlBlock>,
    dispatcher: D,
    current: Option<TaskId>,
}

impl<D: Dispatcher> ActivationGateway<D> {
    /// Creates the gateway with every task suspended
    pub fn new(configs: &[TaskConfig], dispatcher: D) -> Self {
        Self {
            tasks: configs.iter().map(TaskControlBlock::from_config).collect(),
            dispatcher,
            current: None,
        }
    }

    /// Looks up a task record
    pub fn get(&self, task: TaskId) -> Result<&TaskControlBlock, KernelError> {
        self.tasks.get(task.index()).ok_or(KernelError::InvalidId)
    }

    /// Number of configured tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Checks if no tasks are configured
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The running task, if any
    pub fn current(&self) -> Option<TaskId> {
        self.current
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Records one activation of `task`
    ///
    /// Fails with `InvalidState` when the task's activation ceiling is reached.
    pub fn activate(&mut self, task: TaskId) -> Result<Activation, KernelError> {
        self.can_activate(task)?;
        let tcb = self.get_mut(task)?;
        tcb.activation_count += 1;

        match tcb.state {
            TaskState::Suspended => {
                tcb.state = TaskState::Ready;
                debug!("{} suspended -> ready", task);
                self.dispatcher.activate(task);
                Ok(Activation::Readied)
            }
            TaskState::Ready | TaskState::Running => Ok(Activation::Queued {
                pending: tcb.activation_count,
            }),
        }
    }

    /// Checks that one more activation of `task` would be accepted
    pub fn can_activate(&self, task: TaskId) -> Result<(), KernelError> {
        let tcb = self.get(task)?;
        if tcb.activation_count >= tcb.max_activations {
            return Err(KernelError::InvalidState);
        }
        Ok(())
    }

    /// Activates the running task
    pub fn activate_current(&mut self) -> Result<Activation, KernelError> {
        let task = self.current.ok_or(KernelError::InvalidState)?;
        self.activate(task)
    }

    /// Marks a ready task as running, consuming one activation
    ///
    /// Called by the external scheduler. Only one task runs at a time.
    pub fn dispatch(&mut self, task: TaskId) -> Result<(), KernelError> {
        let current = self.current;
        let tcb = self.get_mut(task)?;
        if tcb.state != TaskState::Ready || current.is_some() {
            return Err(KernelError::InvalidState);
        }
        tcb.state = TaskState::Running;
        tcb.activation_count -= 1;
        self.current = Some(task);
        debug!("{} ready -> running", task);
        Ok(())
    }

    /// Ends the running activation of `task`
    ///
    /// Returns the resulting state: `Ready` when another activation is
    /// pending (the dispatcher is told again), `Suspended` otherwise.
    pub fn terminate(&mut self, task: TaskId) -> Result<TaskState, KernelError> {
        let tcb = self.get_mut(task)?;
        if tcb.state != TaskState::Running {
            return Err(KernelError::InvalidState);
        }

        let next = if tcb.activation_count > 0 {
            TaskState::Ready
        } else {
            TaskState::Suspended
        };
        tcb.state = next;
        self.current = None;
        debug!("{} running -> {:?}", task, next);

        if next == TaskState::Ready {
            self.dispatcher.activate(task);
        }
        Ok(next)
    }

    /// Ends the running activation of the current task
    pub fn terminate_current(&mut self) -> Result<(TaskId, TaskState), KernelError> {
        let task = self.current.ok_or(KernelError::InvalidState)?;
        Ok((task, self.terminate(task)?))
    }

    fn get_mut(&mut self, task: TaskId) -> Result<&mut TaskControlBlock, KernelError> {
        self.tasks.get_mut(task.index()).ok_or(KernelError::InvalidId)
    }
}
