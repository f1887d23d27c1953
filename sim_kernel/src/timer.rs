//! # Simulated Tick Source
//!
//! Deterministic timer hardware and the driver that feeds its ticks into a
//! kernel counter.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! The timer only advances when explicitly told to. Real timer interrupts
//! can be late or merged, so the driver never assumes one tick per
//! interrupt: it forwards however many ticks elapsed since the last poll,
//! and the kernel processes them as one coalesced advance.

use crate::expiry::Expiry;
use crate::SharedKernel;
use core_types::CounterId;
use hal::{TimerDevice, TimerInterrupt};
use kernel_api::{Dispatcher, KernelError};
use log::trace;

/// Simulated timer device with controllable time progression
///
/// # Examples
///
/// ```
/// use sim_kernel::timer::SimTimerDevice;
/// use hal::TimerDevice;
///
/// let mut timer = SimTimerDevice::new();
/// assert_eq!(timer.poll_ticks(), 0);
///
/// timer.advance_ticks(100);
/// assert_eq!(timer.poll_ticks(), 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimTimerDevice {
    /// Monotonic tick count
    ticks: u64,
    /// Programmed interrupt frequency, if any
    frequency_hz: Option<u32>,
    interrupts_enabled: bool,
}

impl SimTimerDevice {
    /// Creates a new simulated timer starting at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new simulated timer starting at a specific tick count
    pub fn with_initial_ticks(ticks: u64) -> Self {
        Self {
            ticks,
            ..Self::default()
        }
    }

    /// Advances the timer by `delta` ticks, saturating at `u64::MAX`
    pub fn advance_ticks(&mut self, delta: u64) {
        self.ticks = self.ticks.saturating_add(delta);
    }

    /// Returns the current tick count without advancing time
    pub fn current_ticks(&self) -> u64 {
        self.ticks
    }

    /// The frequency last passed to `configure_periodic`
    pub fn frequency_hz(&self) -> Option<u32> {
        self.frequency_hz
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }
}

impl TimerDevice for SimTimerDevice {
    fn poll_ticks(&mut self) -> u64 {
        self.ticks
    }
}

impl TimerInterrupt for SimTimerDevice {
    fn configure_periodic(&mut self, hz: u32) {
        self.frequency_hz = Some(hz);
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }
}

/// Interrupt handler body that drives one counter from a timer
///
/// Keeps the timer reading from the previous interrupt and advances the
/// counter by the difference, so missed interrupts are caught up in one
/// coalesced advance.
#[derive(Debug)]
pub struct TickDriver<T> {
    timer: T,
    counter: CounterId,
    last_ticks: u64,
}

impl<T: TimerDevice> TickDriver<T> {
    /// Creates a driver for `counter`, starting from the timer's current reading
    pub fn new(mut timer: T, counter: CounterId) -> Self {
        let last_ticks = timer.poll_ticks();
        Self {
            timer,
            counter,
            last_ticks,
        }
    }

    /// Handles one timer interrupt
    ///
    /// Returns the alarms that fired. Does nothing if the timer has not
    /// moved since the last call.
    pub fn on_interrupt<D: Dispatcher>(
        &mut self,
        kernel: &SharedKernel<D>,
    ) -> Result<Vec<Expiry>, KernelError> {
        let now = self.timer.poll_ticks();
        let delta = now.saturating_sub(self.last_ticks);
        if delta == 0 {
            return Ok(Vec::new());
        }

        let fired = kernel.tick_n(self.counter, delta)?;
        self.last_ticks = now;
        if delta > 1 {
            trace!("{} caught up {} coalesced ticks", self.counter, delta);
        }
        Ok(fired)
    }

    pub fn counter(&self) -> CounterId {
        self.counter
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the timer, e.g. to advance a simulated one
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{single_counter_kernel, ALARMS, SYSTEM_COUNTER};
    use kernel_api::OsekApi;

    #[test]
    fn test_timer_starts_at_zero() {
        let mut timer = SimTimerDevice::new();
        assert_eq!(timer.poll_ticks(), 0);
        assert_eq!(timer.current_ticks(), 0);
    }

    #[test]
    fn test_timer_with_initial_ticks() {
        let mut timer = SimTimerDevice::with_initial_ticks(1000);
        assert_eq!(timer.poll_ticks(), 1000);
        timer.advance_ticks(u64::MAX);
        assert_eq!(timer.current_ticks(), u64::MAX);
    }

    #[test]
    fn test_timer_interrupt_programming() {
        let mut timer = SimTimerDevice::new();
        timer.configure_periodic(1000);
        timer.enable_interrupts();
        assert_eq!(timer.frequency_hz(), Some(1000));
        assert!(timer.interrupts_enabled());
        timer.disable_interrupts();
        assert!(!timer.interrupts_enabled());
    }

    #[test]
    fn test_driver_forwards_elapsed_ticks() {
        let shared = SharedKernel::new(single_counter_kernel(99, 1));
        let mut driver = TickDriver::new(SimTimerDevice::with_initial_ticks(500), SYSTEM_COUNTER);

        assert!(driver.on_interrupt(&shared).unwrap().is_empty());
        assert_eq!(shared.get_counter_value(SYSTEM_COUNTER), Ok(0));

        driver.timer_mut().advance_ticks(7);
        driver.on_interrupt(&shared).unwrap();
        assert_eq!(shared.get_counter_value(SYSTEM_COUNTER), Ok(7));
    }

    #[test]
    fn test_driver_catches_up_missed_interrupts() {
        let mut shared = SharedKernel::new(single_counter_kernel(99, 1));
        shared.set_rel_alarm(ALARMS[0], 3, 3).unwrap();
        let mut driver = TickDriver::new(SimTimerDevice::new(), SYSTEM_COUNTER);

        // three interrupts lost, one handled
        driver.timer_mut().advance_ticks(10);
        let fired = driver.on_interrupt(&shared).unwrap();
        let ticks: Vec<_> = fired.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![3, 6, 9]);
    }
}
