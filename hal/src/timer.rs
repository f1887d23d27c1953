//! # Timer Device
//!
//! Hardware abstraction for the kernel's tick source.
//!
//! ## Philosophy
//!
//! **Ticks are pushed into the kernel, never pulled by it.**
//!
//! A timer device exposes a monotonic tick count. The interrupt glue polls
//! it, computes how many ticks passed since the last interrupt, and hands
//! that delta to the kernel's counter. A delta larger than one is how
//! missed or coalesced interrupts show up.
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Ticks never go backwards
//! 2. **Non-blocking**: Always returns immediately
//! 3. **Cumulative**: Returns total ticks since initialization
//! 4. **Frequency-agnostic**: Tick rate belongs to counter configuration

/// Hardware timer device trait
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
///
/// fn ticks_since<T: TimerDevice>(timer: &mut T, last: u64) -> u64 {
///     timer.poll_ticks().saturating_sub(last)
/// }
/// ```
pub trait TimerDevice {
    /// Returns the current cumulative tick count
    fn poll_ticks(&mut self) -> u64;
}

/// Periodic interrupt control for a tick source
pub trait TimerInterrupt {
    /// Programs the device to raise an interrupt `hz` times per second
    fn configure_periodic(&mut self, hz: u32);

    /// Enables the periodic interrupt
    fn enable_interrupts(&mut self);

    /// Disables the periodic interrupt
    fn disable_interrupts(&mut self);
}
