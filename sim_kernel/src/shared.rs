//! # Shared Kernel Handle
//!
//! The kernel core is a plain `&mut` state machine. This module makes it
//! callable from two contexts at once: the tick source (interrupt context)
//! and tasks (task context).
//!
//! ## Critical sections
//!
//! - Every call is exactly one acquisition of the kernel lock, so a counter
//!   or alarm update is never observed half-applied.
//! - Task-context calls also mask interrupts through an [`InterruptHal`]
//!   for the length of that acquisition, so a tick cannot arrive on the same
//!   CPU while the lock is held.
//! - `tick` and `tick_n` only take the kernel lock. They already run with
//!   the tick interrupt masked.
//!
//! A cancel and the expiry scan of the same alarm are therefore totally
//! ordered: the cancel lands either before the scan (no firing) or after it.

use crate::expiry::Expiry;
use crate::interrupts::SimInterruptController;
use crate::SimulatedKernel;
use core_types::{AlarmId, CounterId, TaskId, TickType};
use hal::{without_interrupts, InterruptHal};
use kernel_api::{AlarmBase, Dispatcher, KernelError, OsekApi, TaskState};
use spin::Mutex;
use std::sync::Arc;

struct Inner<D> {
    kernel: Mutex<SimulatedKernel<D>>,
    irq: Mutex<Box<dyn InterruptHal + Send>>,
}

/// Cloneable, thread-safe handle to a [`SimulatedKernel`]
pub struct SharedKernel<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for SharedKernel<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Dispatcher> SharedKernel<D> {
    /// Wraps `kernel` with a simulated interrupt controller
    pub fn new(kernel: SimulatedKernel<D>) -> Self {
        Self::with_interrupt_controller(kernel, SimInterruptController::new())
    }

    /// Wraps `kernel` with the given interrupt controller
    pub fn with_interrupt_controller<H>(kernel: SimulatedKernel<D>, irq: H) -> Self
    where
        H: InterruptHal + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                kernel: Mutex::new(kernel),
                irq: Mutex::new(Box::new(irq)),
            }),
        }
    }

    /// Tick-source entry point: advances `counter` by one tick
    pub fn tick(&self, counter: CounterId) -> Result<Vec<Expiry>, KernelError> {
        self.inner.kernel.lock().tick(counter)
    }

    /// Tick-source entry point for coalesced ticks
    pub fn tick_n(&self, counter: CounterId, ticks: u64) -> Result<Vec<Expiry>, KernelError> {
        self.inner.kernel.lock().tick_n(counter, ticks)
    }

    /// Runs `f` on the kernel inside a task-context critical section
    pub fn critical<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SimulatedKernel<D>) -> R,
    {
        let mut irq = self.inner.irq.lock();
        without_interrupts(&mut **irq, || {
            let mut kernel = self.inner.kernel.lock();
            f(&mut kernel)
        })
    }

    /// Read-only access under the same critical section
    pub fn inspect<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SimulatedKernel<D>) -> R,
    {
        self.critical(|kernel| f(kernel))
    }

    /// See [`SimulatedKernel::start_os`]
    pub fn start_os(&self) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.start_os())
    }

    /// See [`SimulatedKernel::dispatch`]
    pub fn dispatch(&self, task: TaskId) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.dispatch(task))
    }

    /// Unwraps the kernel if this is the last handle
    pub fn try_into_inner(self) -> Result<SimulatedKernel<D>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Ok(inner.kernel.into_inner()),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<D: Dispatcher> OsekApi for SharedKernel<D> {
    fn activate_task(&mut self, task: TaskId) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.activate_task(task))
    }

    fn activate_current(&mut self) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.activate_current())
    }

    fn terminate_task(&mut self, task: TaskId) -> Result<TaskState, KernelError> {
        self.critical(|kernel| kernel.terminate_task(task))
    }

    fn terminate_current(&mut self) -> Result<TaskState, KernelError> {
        self.critical(|kernel| kernel.terminate_current())
    }

    fn get_task_state(&self, task: TaskId) -> Result<TaskState, KernelError> {
        self.inspect(|kernel| kernel.get_task_state(task))
    }

    fn get_alarm_base(&self, alarm: AlarmId) -> Result<AlarmBase, KernelError> {
        self.inspect(|kernel| kernel.get_alarm_base(alarm))
    }

    fn get_alarm(&self, alarm: AlarmId) -> Result<TickType, KernelError> {
        self.inspect(|kernel| kernel.get_alarm(alarm))
    }

    fn set_rel_alarm(
        &mut self,
        alarm: AlarmId,
        increment: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.set_rel_alarm(alarm, increment, cycle))
    }

    fn set_abs_alarm(
        &mut self,
        alarm: AlarmId,
        start: TickType,
        cycle: TickType,
    ) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.set_abs_alarm(alarm, start, cycle))
    }

    fn cancel_alarm(&mut self, alarm: AlarmId) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.cancel_alarm(alarm))
    }

    fn increment_counter(&mut self, counter: CounterId) -> Result<(), KernelError> {
        self.critical(|kernel| kernel.increment_counter(counter))
    }

    fn get_counter_value(&self, counter: CounterId) -> Result<TickType, KernelError> {
        self.inspect(|kernel| kernel.get_counter_value(counter))
    }

    fn get_elapsed_value(
        &self,
        counter: CounterId,
        previous: &mut TickType,
    ) -> Result<TickType, KernelError> {
        self.inspect(|kernel| kernel.get_elapsed_value(counter, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{single_counter_kernel, ALARMS, SYSTEM_COUNTER, TASKS};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_calls_through_handle() {
        let mut shared = SharedKernel::new(single_counter_kernel(99, 1));
        shared.set_rel_alarm(ALARMS[0], 3, 0).unwrap();

        assert!(shared.tick_n(SYSTEM_COUNTER, 2).unwrap().is_empty());
        assert_eq!(shared.get_alarm(ALARMS[0]), Ok(1));
        assert_eq!(shared.tick(SYSTEM_COUNTER).unwrap().len(), 1);
        assert_eq!(shared.get_task_state(TASKS[0]), Ok(TaskState::Ready));
    }

    #[test]
    fn test_clones_share_state() {
        let mut a = SharedKernel::new(single_counter_kernel(99, 1));
        let b = a.clone();
        a.activate_task(TASKS[1]).unwrap();
        assert_eq!(b.get_task_state(TASKS[1]), Ok(TaskState::Ready));
        b.dispatch(TASKS[1]).unwrap();
        assert_eq!(a.terminate_current(), Ok(TaskState::Suspended));
    }

    struct CountingController {
        enabled: bool,
        masked: Arc<AtomicUsize>,
    }

    impl InterruptHal for CountingController {
        fn enable_interrupts(&mut self) {
            self.enabled = true;
        }

        fn disable_interrupts(&mut self) {
            self.enabled = false;
            self.masked.fetch_add(1, Ordering::SeqCst);
        }

        fn interrupts_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[test]
    fn test_task_calls_mask_interrupts() {
        let masked = Arc::new(AtomicUsize::new(0));
        let controller = CountingController {
            enabled: true,
            masked: Arc::clone(&masked),
        };
        let mut shared =
            SharedKernel::with_interrupt_controller(single_counter_kernel(99, 1), controller);

        shared.set_rel_alarm(ALARMS[0], 1, 0).unwrap();
        shared.get_alarm(ALARMS[0]).unwrap();
        assert_eq!(masked.load(Ordering::SeqCst), 2);

        // interrupt context does not touch the controller
        shared.tick(SYSTEM_COUNTER).unwrap();
        assert_eq!(masked.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_try_into_inner_requires_last_handle() {
        let shared = SharedKernel::new(single_counter_kernel(99, 1));
        let other = shared.clone();
        let shared = match shared.try_into_inner() {
            Ok(_) => panic!("handle still shared"),
            Err(shared) => shared,
        };
        drop(other);
        assert!(shared.try_into_inner().is_ok());
    }

    #[test]
    fn test_handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedKernel<crate::scheduler::ReadyQueue>>();
    }
}
