//! Kernel API trait and the shared counter/task types

use crate::KernelError;
use core_types::{AlarmId, CounterId, TaskId, TickType};
use serde::{Deserialize, Serialize};

/// Static characteristics of the counter an alarm is bound to
///
/// Returned by [`OsekApi::get_alarm_base`]. The values never change after
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmBase {
    /// Largest counter value before it wraps back to zero
    pub max_allowed_value: TickType,
    /// Number of ticks that make up one counter-specific time unit
    pub ticks_per_base: TickType,
    /// Smallest nonzero cycle accepted for a cyclic alarm
    pub min_cycle: TickType,
}

impl AlarmBase {
    /// Number of distinct counter values, `max_allowed_value + 1`
    ///
    /// Computed in `u64` so a counter spanning the full `TickType` range
    /// does not overflow.
    pub const fn modulus(&self) -> u64 {
        self.max_allowed_value as u64 + 1
    }
}

/// Task state as tracked by the activation gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Not activated; no pending activations
    Suspended,
    /// Activated and waiting for the dispatcher
    Ready,
    /// Dispatched and executing its body
    Running,
}

/// The scheduler-side `Activate(task_id)` primitive
///
/// The kernel core decides *that* a task becomes ready; the dispatcher
/// decides *when* it runs. Implementations must not call back into the
/// kernel: `activate` runs inside the kernel's critical section.
pub trait Dispatcher {
    /// Makes `task` eligible for dispatch
    fn activate(&mut self, task: TaskId);
}

/// The kernel call surface
///
/// Every call validates all of its preconditions before touching state and
/// returns the first violated one. A returned error therefore means the
/// call had no effect.
///
/// # Example
///
/// ```
/// use kernel_api::{KernelError, OsekApi};
/// use core_types::{AlarmId, TaskId};
///
/// fn start_heartbeat<K: OsekApi>(kernel: &mut K) -> Result<(), KernelError> {
///     kernel.activate_task(TaskId::new(0))?;
///     // fire after 10 ticks, then every 100 ticks
///     kernel.set_rel_alarm(AlarmId::new(0), 10, 100)
/// }
/// ```
pub trait OsekApi {
    /// Activates a task
    ///
    /// A suspended task becomes ready. A ready or running task records one
    /// more pending activation, failing with `InvalidState` once the task's
    /// activation ceiling is reached.
    fn activate_task(&mut self, task: TaskId) -> Result<(), KernelError>;

    /// Activates the currently running task
    ///
    /// Fails with `InvalidState` when no task is running.
    fn activate_current(&mut self) -> Result<(), KernelError>;

    /// Terminates a running task
    ///
    /// On hardware this call never returns into the terminated task. Here it
    /// returns the task's resulting state: `Ready` when a pending activation
    /// remains, `Suspended` otherwise.
    fn terminate_task(&mut self, task: TaskId) -> Result<TaskState, KernelError>;

    /// Terminates the currently running task
    fn terminate_current(&mut self) -> Result<TaskState, KernelError>;

    /// Returns the state of a task
    fn get_task_state(&self, task: TaskId) -> Result<TaskState, KernelError>;

    /// Returns the characteristics of the counter `alarm` is bound to
    fn get_alarm_base(&self, alarm: AlarmId) -> Result<AlarmBase, KernelError>;

    /// Returns the number of ticks until `alarm` expires
    ///
    /// Fails with `InvalidState` if the alarm is not armed.
    fn get_alarm(&self, alarm: AlarmId) -> Result<TickType, KernelError>;

    /// Arms `alarm` to expire `increment` ticks from now
    ///
    /// # Arguments
    ///
    /// * `alarm` - The alarm to arm; it must not already be armed
    /// * `increment` - Relative distance, in `1..=max_allowed_value`
    /// * `cycle` - Re-arm period after each expiry, 0 for one-shot
    fn set_rel_alarm(
        &mut self,
        alarm: AlarmId,
        increment: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError>;

    /// Arms `alarm` to expire when its counter reaches `start`
    ///
    /// A `start` equal to the current counter value expires after one full
    /// wrap of the counter, never immediately.
    fn set_abs_alarm(
        &mut self,
        alarm: AlarmId,
        start: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError>;

    /// Disarms `alarm`
    ///
    /// Cancelling an alarm that is not armed succeeds and changes nothing.
    fn cancel_alarm(&mut self, alarm: AlarmId) -> Result<(), KernelError>;

    /// Advances a software counter by one tick
    fn increment_counter(&mut self, counter: CounterId) -> Result<(), KernelError>;

    /// Returns the current value of a counter
    fn get_counter_value(&self, counter: CounterId) -> Result<TickType, KernelError>;

    /// Returns the ticks elapsed since `previous` and stores the current value into it
    fn get_elapsed_value(
        &self,
        counter: CounterId,
        previous: &mut TickType,
    ) -> Result<TickType, KernelError>;
}
