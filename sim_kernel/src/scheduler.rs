//! Reference dispatcher for the simulated kernel
//!
//! ## Philosophy
//!
//! - **Mechanism, not policy**: The kernel core decides that a task is ready;
//!   this queue only remembers the order in which that happened.
//! - **Determinism first**: Same activations => same dispatch order.
//! - **No preemption, no priorities**: A full scheduler is an external
//!   collaborator. This one exists so the core can be driven end to end in
//!   tests.

use core_types::TaskId;
use kernel_api::Dispatcher;
use std::collections::VecDeque;

/// FIFO ready queue
///
/// Tasks are enqueued at the back when the kernel activates them and handed
/// out from the front. Per-task activation totals are always kept; the
/// ordered history only when asked for with [`ReadyQueue::with_history`].
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<TaskId>,
    /// Activations received, indexed by task
    totals: Vec<usize>,
    /// Every activation received, in order
    history: Option<Vec<TaskId>>,
}

impl ReadyQueue {
    /// Creates an empty ready queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty ready queue that also records the activation order
    ///
    /// The history grows with every activation; meant for bounded test runs.
    pub fn with_history() -> Self {
        Self {
            history: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Removes and returns the next task to dispatch
    pub fn next_ready(&mut self) -> Option<TaskId> {
        self.queue.pop_front()
    }

    /// Returns the next task to dispatch without removing it
    pub fn peek(&self) -> Option<TaskId> {
        self.queue.front().copied()
    }

    /// Every activation received so far, oldest first
    ///
    /// Empty unless built with [`ReadyQueue::with_history`].
    pub fn history(&self) -> &[TaskId] {
        self.history.as_deref().unwrap_or(&[])
    }

    /// Counts activations of `task` received so far
    pub fn activations_of(&self, task: TaskId) -> usize {
        self.totals.get(task.index()).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Dispatcher for ReadyQueue {
    fn activate(&mut self, task: TaskId) {
        self.queue.push_back(task);
        if self.totals.len() <= task.index() {
            self.totals.resize(task.index() + 1, 0);
        }
        self.totals[task.index()] += 1;
        if let Some(history) = self.history.as_mut() {
            history.push(task);
        }
    }
}
