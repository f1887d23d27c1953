//! # Simulated Kernel
//!
//! The counter/alarm kernel core, runnable in-process.
//!
//! ## Purpose
//!
//! The core owns every counter, alarm and task record of a statically
//! configured system and applies the kernel calls to them:
//! - Counters advance only when the tick source says so
//! - Alarms fire exactly once per crossed expiry tick, even when ticks are coalesced
//! - Task activations are handed to an external [`Dispatcher`]
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! Time is whatever the caller says it is: nothing advances on its own, so
//! every scenario is reproducible under `cargo test`. All state is
//! inspectable, and every transition lands in the [`audit::KernelAuditLog`].
//!
//! This is not a "toy" or "mock". The same core runs behind
//! [`shared::SharedKernel`] when the tick arrives from another context.
//!
//! ## Example
//!
//! ```
//! use sim_kernel::config::{AlarmConfig, CounterConfig, KernelConfig, TaskConfig};
//! use sim_kernel::SimulatedKernel;
//! use core_types::{AlarmId, CounterId, TaskId};
//! use kernel_api::{OsekApi, TaskState};
//!
//! let config = KernelConfig::new()
//!     .with_counter(CounterConfig::new("system", 99))
//!     .with_task(TaskConfig::new("blink"))
//!     .with_alarm(AlarmConfig::activating("blink_alarm", CounterId::new(0), TaskId::new(0)));
//! let mut kernel = SimulatedKernel::with_ready_queue(config).unwrap();
//!
//! kernel.set_rel_alarm(AlarmId::new(0), 10, 0).unwrap();
//! kernel.tick_n(CounterId::new(0), 10).unwrap();
//! assert_eq!(kernel.get_task_state(TaskId::new(0)), Ok(TaskState::Ready));
//! ```

pub mod alarm;
pub mod audit;
pub mod config;
pub mod counter;
pub mod expiry;
pub mod ffi;
pub mod interrupts;
pub mod scheduler;
pub mod shared;
pub mod task;
pub mod test_utils;
pub mod timer;

use alarm::{Alarm, AlarmRegistry};
use audit::{ActivationSource, KernelAuditLog, KernelEvent, DEFAULT_AUDIT_CAPACITY};
use config::{AlarmAutostart, ConfigError, CounterKind, KernelConfig};
use core_types::{AlarmId, CallbackId, CounterId, TaskId, TickType};
use counter::{Counter, CounterTable};
use expiry::Expiry;
use kernel_api::{AlarmBase, Dispatcher, KernelError, OsekApi, TaskState};
use log::{debug, info};
use scheduler::ReadyQueue;
use std::collections::VecDeque;
use task::{Activation, ActivationGateway, TaskControlBlock};

pub use shared::SharedKernel;

/// Expired callbacks kept for [`SimulatedKernel::take_due_callbacks`]
///
/// Older entries are discarded first and counted in
/// [`SimulatedKernel::dropped_callbacks`].
pub const DUE_CALLBACK_CAPACITY: usize = 256;

/// Simulated kernel state
///
/// Generic over the dispatcher that receives ready tasks. Use
/// [`SimulatedKernel::with_ready_queue`] for the built-in FIFO queue.
pub struct SimulatedKernel<D> {
    counters: CounterTable,
    alarms: AlarmRegistry,
    tasks: ActivationGateway<D>,
    audit: KernelAuditLog,
    started: bool,
    /// Tasks activated by `start_os`, ascending
    autostart_tasks: Vec<TaskId>,
    /// Alarms armed by `start_os`, ascending
    autostart_alarms: Vec<(AlarmId, AlarmAutostart)>,
    /// Expired callback alarms not yet taken by the caller
    due_callbacks: VecDeque<(AlarmId, CallbackId)>,
    dropped_callbacks: u64,
}

impl<D: Dispatcher> SimulatedKernel<D> {
    /// Builds a kernel from a validated configuration
    ///
    /// Every counter starts at 0, every alarm inactive and every task
    /// suspended. The audit trail keeps the last [`DEFAULT_AUDIT_CAPACITY`]
    /// events; see [`SimulatedKernel::with_audit_log`].
    pub fn new(config: KernelConfig, dispatcher: D) -> Result<Self, ConfigError> {
        config.validate()?;

        let autostart_tasks = config
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.autostart)
            .map(|(index, _)| TaskId::new(index as u32))
            .collect();
        let autostart_alarms = config
            .alarms
            .iter()
            .enumerate()
            .filter_map(|(index, alarm)| {
                alarm
                    .autostart
                    .map(|autostart| (AlarmId::new(index as u32), autostart))
            })
            .collect();

        Ok(Self {
            counters: CounterTable::from_configs(&config.counters),
            alarms: AlarmRegistry::from_configs(&config.alarms),
            tasks: ActivationGateway::new(&config.tasks, dispatcher),
            audit: KernelAuditLog::with_capacity_limit(DEFAULT_AUDIT_CAPACITY),
            started: false,
            autostart_tasks,
            autostart_alarms,
            due_callbacks: VecDeque::new(),
            dropped_callbacks: 0,
        })
    }

    /// Replaces the audit log, e.g. with an unbounded one for a scenario
    /// that replays the whole trail
    pub fn with_audit_log(mut self, audit: KernelAuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Starts the system: activates autostart tasks, then arms autostart alarms
    ///
    /// Both happen in ascending identity. Every autostart entry is checked
    /// first, so a failing call changes nothing and can be retried, e.g.
    /// after cancelling an autostart alarm that was armed early. Fails with
    /// `InvalidState` once the kernel has started.
    pub fn start_os(&mut self) -> Result<(), KernelError> {
        if self.started {
            return Err(KernelError::InvalidState);
        }
        for &task in &self.autostart_tasks {
            self.tasks.can_activate(task)?;
        }
        for &(alarm, autostart) in &self.autostart_alarms {
            self.check_autostart(alarm, autostart)?;
        }

        self.started = true;
        self.audit.record(KernelEvent::OsStarted);

        for task in self.autostart_tasks.clone() {
            self.activate_from(task, ActivationSource::Autostart)?;
        }
        for (alarm, autostart) in self.autostart_alarms.clone() {
            match autostart {
                AlarmAutostart::Relative { increment, cycle } => {
                    self.set_rel_alarm(alarm, increment, cycle)?
                }
                AlarmAutostart::Absolute { start, cycle } => {
                    self.set_abs_alarm(alarm, start, cycle)?
                }
            }
        }

        info!(
            "kernel started: {} task(s), {} alarm(s) autostarted",
            self.autostart_tasks.len(),
            self.autostart_alarms.len()
        );
        Ok(())
    }

    /// Whether `start_os` has run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Advances `counter` by one tick
    ///
    /// Interrupt-context entry point for the tick source.
    pub fn tick(&mut self, counter: CounterId) -> Result<Vec<Expiry>, KernelError> {
        self.advance_counter(counter, 1)
    }

    /// Advances `counter` by `ticks` coalesced ticks
    pub fn tick_n(&mut self, counter: CounterId, ticks: u64) -> Result<Vec<Expiry>, KernelError> {
        self.advance_counter(counter, ticks)
    }

    /// Marks a ready task as running
    ///
    /// Called by the external scheduler. Fails with `InvalidState` if the
    /// task is not ready or another task is running.
    pub fn dispatch(&mut self, task: TaskId) -> Result<(), KernelError> {
        self.tasks.dispatch(task)?;
        self.audit.record(KernelEvent::TaskDispatched { task });
        Ok(())
    }

    /// The running task, if any
    pub fn current_task(&self) -> Option<TaskId> {
        self.tasks.current()
    }

    pub fn counter(&self, id: CounterId) -> Result<&Counter, KernelError> {
        self.counters.get(id)
    }

    pub fn alarm(&self, id: AlarmId) -> Result<&Alarm, KernelError> {
        self.alarms.get(id)
    }

    pub fn task(&self, id: TaskId) -> Result<&TaskControlBlock, KernelError> {
        self.tasks.get(id)
    }

    pub fn dispatcher(&self) -> &D {
        self.tasks.dispatcher()
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        self.tasks.dispatcher_mut()
    }

    /// Returns the audit trail
    pub fn audit_log(&self) -> &KernelAuditLog {
        &self.audit
    }

    /// Clears the audit trail (useful for test reset)
    pub fn clear_audit_log(&mut self) {
        self.audit.clear();
    }

    /// Drains the callbacks of expired callback alarms, oldest first
    pub fn take_due_callbacks(&mut self) -> Vec<(AlarmId, CallbackId)> {
        self.due_callbacks.drain(..).collect()
    }

    /// Number of due callbacks discarded because nobody took them in time
    pub fn dropped_callbacks(&self) -> u64 {
        self.dropped_callbacks
    }

    fn queue_callback(&mut self, alarm: AlarmId, callback: CallbackId) {
        if self.due_callbacks.len() >= DUE_CALLBACK_CAPACITY {
            self.due_callbacks.pop_front();
            self.dropped_callbacks += 1;
        }
        self.due_callbacks.push_back((alarm, callback));
    }

    fn check_autostart(&self, alarm: AlarmId, autostart: AlarmAutostart) -> Result<(), KernelError> {
        match autostart {
            AlarmAutostart::Relative { increment, cycle } => {
                self.alarms.check_rel(alarm, &self.counters, increment, cycle)?;
            }
            AlarmAutostart::Absolute { start, cycle } => {
                self.alarms.check_abs(alarm, &self.counters, start, cycle)?;
            }
        }
        Ok(())
    }

    /// Activates `task` and records the outcome in the audit trail
    fn activate_from(
        &mut self,
        task: TaskId,
        source: ActivationSource,
    ) -> Result<Activation, KernelError> {
        match self.tasks.activate(task) {
            Ok(activation) => {
                self.audit.record(KernelEvent::TaskActivated { task, source });
                Ok(activation)
            }
            Err(reason) => {
                if reason != KernelError::InvalidId {
                    self.audit.record(KernelEvent::ActivationRejected {
                        task,
                        source,
                        reason,
                    });
                }
                Err(reason)
            }
        }
    }

    fn record_termination(&mut self, task: TaskId, next: TaskState) {
        self.audit.record(KernelEvent::TaskTerminated { task, next });
    }

    fn record_armed(&mut self, alarm: AlarmId, expiry: TickType, cycle: TickType) {
        let counter = self.alarms.get(alarm).map(Alarm::counter);
        if let Ok(counter) = counter {
            self.audit.record(KernelEvent::AlarmArmed {
                alarm,
                counter,
                expiry,
                cycle,
            });
        }
        debug!("{} armed: expiry {}, cycle {}", alarm, expiry, cycle);
    }
}

impl SimulatedKernel<ReadyQueue> {
    /// Builds a kernel that dispatches through a FIFO [`ReadyQueue`]
    pub fn with_ready_queue(config: KernelConfig) -> Result<Self, ConfigError> {
        Self::new(config, ReadyQueue::new())
    }

    /// Dispatches the task at the front of the ready queue
    ///
    /// Returns `None` when nothing is ready or a task is already running.
    pub fn dispatch_next(&mut self) -> Option<TaskId> {
        if self.current_task().is_some() {
            return None;
        }
        let task = self.dispatcher_mut().next_ready()?;
        self.dispatch(task).ok()?;
        Some(task)
    }
}

impl<D: Dispatcher> OsekApi for SimulatedKernel<D> {
    fn activate_task(&mut self, task: TaskId) -> Result<(), KernelError> {
        self.activate_from(task, ActivationSource::Api).map(|_| ())
    }

    fn activate_current(&mut self) -> Result<(), KernelError> {
        let task = self.tasks.current().ok_or(KernelError::InvalidState)?;
        self.activate_task(task)
    }

    fn terminate_task(&mut self, task: TaskId) -> Result<TaskState, KernelError> {
        let next = self.tasks.terminate(task)?;
        self.record_termination(task, next);
        Ok(next)
    }

    fn terminate_current(&mut self) -> Result<TaskState, KernelError> {
        let (task, next) = self.tasks.terminate_current()?;
        self.record_termination(task, next);
        Ok(next)
    }

    fn get_task_state(&self, task: TaskId) -> Result<TaskState, KernelError> {
        Ok(self.tasks.get(task)?.state())
    }

    fn get_alarm_base(&self, alarm: AlarmId) -> Result<AlarmBase, KernelError> {
        self.alarms.alarm_base(alarm, &self.counters)
    }

    fn get_alarm(&self, alarm: AlarmId) -> Result<TickType, KernelError> {
        self.alarms.remaining(alarm, &self.counters)
    }

    fn set_rel_alarm(
        &mut self,
        alarm: AlarmId,
        increment: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError> {
        let expiry = self.alarms.set_rel(alarm, &self.counters, increment, cycle)?;
        self.record_armed(alarm, expiry, cycle);
        Ok(())
    }

    fn set_abs_alarm(
        &mut self,
        alarm: AlarmId,
        start: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError> {
        let expiry = self.alarms.set_abs(alarm, &self.counters, start, cycle)?;
        self.record_armed(alarm, expiry, cycle);
        Ok(())
    }

    fn cancel_alarm(&mut self, alarm: AlarmId) -> Result<(), KernelError> {
        if self.alarms.cancel(alarm, &self.counters)? {
            self.audit.record(KernelEvent::AlarmCancelled { alarm });
            debug!("{} cancelled", alarm);
        }
        Ok(())
    }

    fn increment_counter(&mut self, counter: CounterId) -> Result<(), KernelError> {
        if self.counters.get(counter)?.kind() != CounterKind::Software {
            return Err(KernelError::UnsupportedOperation);
        }
        self.advance_counter(counter, 1).map(|_| ())
    }

    fn get_counter_value(&self, counter: CounterId) -> Result<TickType, KernelError> {
        Ok(self.counters.get(counter)?.current_value())
    }

    fn get_elapsed_value(
        &self,
        counter: CounterId,
        previous: &mut TickType,
    ) -> Result<TickType, KernelError> {
        self.counters.get(counter)?.elapsed_since(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmAction;
    use crate::config::{AlarmConfig, CounterConfig, TaskConfig};
    use crate::test_utils::{single_counter_kernel, ALARMS, SYSTEM_COUNTER, TASKS};

    #[test]
    fn test_new_kernel_is_idle() {
        let kernel = single_counter_kernel(99, 1);
        assert!(!kernel.is_started());
        assert_eq!(kernel.current_task(), None);
        assert_eq!(kernel.get_counter_value(SYSTEM_COUNTER), Ok(0));
        assert_eq!(kernel.get_task_state(TASKS[0]), Ok(TaskState::Suspended));
        assert!(!kernel.alarm(ALARMS[0]).unwrap().is_active());
        assert!(kernel.audit_log().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = KernelConfig::new().with_alarm(AlarmConfig::activating(
            "orphan",
            CounterId::new(0),
            TaskId::new(0),
        ));
        assert!(matches!(
            SimulatedKernel::with_ready_queue(config),
            Err(ConfigError::UnknownCounter { .. })
        ));
    }

    #[test]
    fn test_rel_alarm_reports_increment() {
        let mut kernel = single_counter_kernel(99, 1);
        kernel.tick_n(SYSTEM_COUNTER, 40).unwrap();
        kernel.set_rel_alarm(ALARMS[0], 25, 0).unwrap();
        assert_eq!(kernel.get_alarm(ALARMS[0]), Ok(25));
        kernel.tick_n(SYSTEM_COUNTER, 5).unwrap();
        assert_eq!(kernel.get_alarm(ALARMS[0]), Ok(20));
    }

    #[test]
    fn test_abs_alarm_round_trip() {
        let mut kernel = single_counter_kernel(99, 1);
        kernel.tick_n(SYSTEM_COUNTER, 90).unwrap();
        kernel.set_abs_alarm(ALARMS[0], 5, 0).unwrap();
        assert_eq!(kernel.get_alarm(ALARMS[0]), Ok(15));
    }

    #[test]
    fn test_alarm_errors() {
        let mut kernel = single_counter_kernel(99, 5);
        let unknown = AlarmId::new(42);

        assert_eq!(kernel.set_rel_alarm(unknown, 1, 0), Err(KernelError::InvalidId));
        assert_eq!(kernel.get_alarm(unknown), Err(KernelError::InvalidId));
        assert_eq!(kernel.get_alarm_base(unknown), Err(KernelError::InvalidId));
        assert_eq!(kernel.cancel_alarm(unknown), Err(KernelError::InvalidId));

        assert_eq!(kernel.set_rel_alarm(ALARMS[0], 0, 0), Err(KernelError::InvalidValue));
        assert_eq!(kernel.set_rel_alarm(ALARMS[0], 100, 0), Err(KernelError::InvalidValue));
        assert_eq!(kernel.set_rel_alarm(ALARMS[0], 1, 4), Err(KernelError::InvalidValue));
        assert_eq!(kernel.set_abs_alarm(ALARMS[0], 100, 0), Err(KernelError::InvalidValue));
        assert_eq!(kernel.get_alarm(ALARMS[0]), Err(KernelError::InvalidState));

        kernel.set_rel_alarm(ALARMS[0], 1, 0).unwrap();
        assert_eq!(kernel.set_rel_alarm(ALARMS[0], 1, 0), Err(KernelError::InvalidState));
        assert_eq!(kernel.set_abs_alarm(ALARMS[0], 1, 0), Err(KernelError::InvalidState));
    }

    #[test]
    fn test_failed_call_leaves_no_audit_entry() {
        let mut kernel = single_counter_kernel(99, 1);
        let _ = kernel.set_rel_alarm(ALARMS[0], 0, 0);
        let _ = kernel.terminate_task(TASKS[0]);
        assert!(kernel.audit_log().is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut kernel = single_counter_kernel(99, 1);
        kernel.set_rel_alarm(ALARMS[0], 10, 0).unwrap();
        assert_eq!(kernel.cancel_alarm(ALARMS[0]), Ok(()));
        assert_eq!(kernel.cancel_alarm(ALARMS[0]), Ok(()));
        assert_eq!(
            kernel
                .audit_log()
                .count_events(|e| matches!(e, KernelEvent::AlarmCancelled { .. })),
            1
        );
        assert!(kernel.tick_n(SYSTEM_COUNTER, 20).unwrap().is_empty());
    }

    #[test]
    fn test_start_os_runs_once() {
        let config = KernelConfig::new()
            .with_counter(CounterConfig::new("system", 99))
            .with_task(TaskConfig::new("init").autostart())
            .with_task(TaskConfig::new("idle"))
            .with_alarm(
                AlarmConfig::activating("tick", CounterId::new(0), TaskId::new(1))
                    .with_autostart(AlarmAutostart::Relative {
                        increment: 5,
                        cycle: 5,
                    }),
            );
        let mut kernel = SimulatedKernel::with_ready_queue(config).unwrap();

        kernel.start_os().unwrap();
        assert!(kernel.is_started());
        assert_eq!(kernel.get_task_state(TaskId::new(0)), Ok(TaskState::Ready));
        assert_eq!(kernel.get_alarm(AlarmId::new(0)), Ok(5));
        assert_eq!(kernel.start_os(), Err(KernelError::InvalidState));

        assert!(kernel.audit_log().has_event(|e| matches!(
            e,
            KernelEvent::TaskActivated {
                source: ActivationSource::Autostart,
                ..
            }
        )));
    }

    fn autostart_config() -> KernelConfig {
        KernelConfig::new()
            .with_counter(CounterConfig::new("system", 99))
            .with_task(TaskConfig::new("init").autostart())
            .with_task(TaskConfig::new("worker"))
            .with_alarm(
                AlarmConfig::activating("early", CounterId::new(0), TaskId::new(1))
                    .with_autostart(AlarmAutostart::Relative {
                        increment: 5,
                        cycle: 0,
                    }),
            )
            .with_alarm(
                AlarmConfig::activating("late", CounterId::new(0), TaskId::new(1))
                    .with_autostart(AlarmAutostart::Absolute { start: 20, cycle: 0 }),
            )
    }

    #[test]
    fn test_failed_start_os_changes_nothing() {
        let mut kernel = SimulatedKernel::with_ready_queue(autostart_config()).unwrap();
        kernel.set_rel_alarm(AlarmId::new(1), 3, 0).unwrap();
        kernel.clear_audit_log();

        assert_eq!(kernel.start_os(), Err(KernelError::InvalidState));
        assert!(!kernel.is_started());
        assert_eq!(kernel.get_task_state(TaskId::new(0)), Ok(TaskState::Suspended));
        assert_eq!(kernel.get_alarm(AlarmId::new(0)), Err(KernelError::InvalidState));
        assert_eq!(kernel.get_alarm(AlarmId::new(1)), Ok(3));
        assert!(kernel.dispatcher().is_empty());
        assert!(kernel.audit_log().is_empty());

        kernel.cancel_alarm(AlarmId::new(1)).unwrap();
        assert_eq!(kernel.start_os(), Ok(()));
        assert_eq!(kernel.get_task_state(TaskId::new(0)), Ok(TaskState::Ready));
        assert_eq!(kernel.get_alarm(AlarmId::new(0)), Ok(5));
        assert_eq!(kernel.get_alarm(AlarmId::new(1)), Ok(20));
    }

    #[test]
    fn test_start_os_refused_at_task_ceiling() {
        let mut kernel = SimulatedKernel::with_ready_queue(autostart_config()).unwrap();
        kernel.activate_task(TaskId::new(0)).unwrap();

        assert_eq!(kernel.start_os(), Err(KernelError::InvalidState));
        assert!(!kernel.is_started());
        assert!(!kernel.alarm(AlarmId::new(0)).unwrap().is_active());
    }

    #[test]
    fn test_long_run_keeps_records_bounded() {
        let config = KernelConfig::new()
            .with_counter(CounterConfig::new("system", 9))
            .with_task(TaskConfig::new("worker"))
            .with_alarm(AlarmConfig::activating("work", CounterId::new(0), TaskId::new(0)))
            .with_alarm(AlarmConfig::new(
                "hook",
                CounterId::new(0),
                AlarmAction::Callback(CallbackId::new(1)),
            ));
        let mut kernel = SimulatedKernel::with_ready_queue(config).unwrap();
        kernel.set_rel_alarm(AlarmId::new(0), 1, 1).unwrap();
        kernel.set_rel_alarm(AlarmId::new(1), 1, 1).unwrap();

        for _ in 0..10_000 {
            kernel.tick(CounterId::new(0)).unwrap();
            if kernel.dispatch_next().is_some() {
                kernel.terminate_current().unwrap();
            }
        }

        assert_eq!(kernel.audit_log().len(), DEFAULT_AUDIT_CAPACITY);
        assert!(kernel.audit_log().dropped() > 0);
        assert_eq!(kernel.dropped_callbacks(), 10_000 - DUE_CALLBACK_CAPACITY as u64);
        assert_eq!(kernel.take_due_callbacks().len(), DUE_CALLBACK_CAPACITY);
        assert!(kernel.dispatcher().history().is_empty());
        assert_eq!(kernel.dispatcher().activations_of(TaskId::new(0)), 10_000);
    }

    #[test]
    fn test_dispatch_next_and_terminate_current() {
        let mut kernel = single_counter_kernel(99, 1);
        kernel.activate_task(TASKS[2]).unwrap();
        kernel.activate_task(TASKS[0]).unwrap();

        assert_eq!(kernel.dispatch_next(), Some(TASKS[2]));
        assert_eq!(kernel.dispatch_next(), None);
        assert_eq!(kernel.current_task(), Some(TASKS[2]));
        assert_eq!(kernel.terminate_current(), Ok(TaskState::Suspended));
        assert_eq!(kernel.dispatch_next(), Some(TASKS[0]));
    }

    #[test]
    fn test_activate_current_requires_running_task() {
        let mut kernel = single_counter_kernel(99, 1);
        assert_eq!(kernel.activate_current(), Err(KernelError::InvalidState));
        assert_eq!(kernel.terminate_current(), Err(KernelError::InvalidState));
    }

    #[test]
    fn test_activation_ceiling_scenario() {
        let mut kernel = single_counter_kernel(99, 1);
        kernel.activate_task(TASKS[0]).unwrap();
        kernel.dispatch_next().unwrap();

        assert_eq!(kernel.activate_task(TASKS[0]), Ok(()));
        assert_eq!(kernel.activate_task(TASKS[0]), Err(KernelError::InvalidState));
        assert_eq!(kernel.terminate_task(TASKS[0]), Ok(TaskState::Ready));
        assert_eq!(kernel.get_task_state(TASKS[0]), Ok(TaskState::Ready));
    }

    #[test]
    fn test_increment_counter_software_only() {
        let config = KernelConfig::new()
            .with_counter(CounterConfig::new("hw", 9))
            .with_counter(CounterConfig::new("sw", 9).software());
        let mut kernel = SimulatedKernel::with_ready_queue(config).unwrap();

        assert_eq!(
            kernel.increment_counter(CounterId::new(0)),
            Err(KernelError::UnsupportedOperation)
        );
        assert_eq!(
            kernel.increment_counter(CounterId::new(5)),
            Err(KernelError::InvalidId)
        );
        kernel.increment_counter(CounterId::new(1)).unwrap();
        assert_eq!(kernel.get_counter_value(CounterId::new(1)), Ok(1));
    }

    #[test]
    fn test_get_elapsed_value() {
        let mut kernel = single_counter_kernel(99, 1);
        let mut previous = 95;
        kernel.tick_n(SYSTEM_COUNTER, 3).unwrap();

        assert_eq!(kernel.get_elapsed_value(SYSTEM_COUNTER, &mut previous), Ok(8));
        assert_eq!(previous, 3);

        let mut out_of_range = 100;
        assert_eq!(
            kernel.get_elapsed_value(SYSTEM_COUNTER, &mut out_of_range),
            Err(KernelError::InvalidValue)
        );
    }

    #[test]
    fn test_alarm_on_counter_without_alarm_support() {
        let config = KernelConfig::new()
            .with_counter(CounterConfig::new("raw", 9).without_alarms())
            .with_task(TaskConfig::new("t"))
            .with_alarm(AlarmConfig::activating("a", CounterId::new(0), TaskId::new(0)));
        let mut kernel = SimulatedKernel::with_ready_queue(config).unwrap();
        let alarm = AlarmId::new(0);

        assert!(kernel.get_alarm_base(alarm).is_ok());
        assert_eq!(kernel.set_rel_alarm(alarm, 1, 0), Err(KernelError::UnsupportedOperation));
        assert_eq!(kernel.set_abs_alarm(alarm, 1, 0), Err(KernelError::UnsupportedOperation));
        assert_eq!(kernel.cancel_alarm(alarm), Err(KernelError::UnsupportedOperation));
        assert_eq!(kernel.get_alarm(alarm), Err(KernelError::UnsupportedOperation));
    }
}
