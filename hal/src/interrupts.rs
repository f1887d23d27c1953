//! Interrupt masking abstraction

/// Interrupt controller trait
///
/// Task-context kernel calls mask the tick interrupt for the length of
/// their critical section so a tick never observes a half-applied update.
pub trait InterruptHal {
    /// Enables interrupts
    fn enable_interrupts(&mut self);

    /// Disables interrupts
    fn disable_interrupts(&mut self);

    /// Returns whether interrupts are enabled
    fn interrupts_enabled(&self) -> bool;
}

/// Runs `f` with interrupts disabled
///
/// Interrupts are re-enabled afterwards only if they were enabled on entry,
/// so nested critical sections compose.
pub fn without_interrupts<H, F, R>(hal: &mut H, f: F) -> R
where
    H: InterruptHal + ?Sized,
    F: FnOnce() -> R,
{
    let was_enabled = hal.interrupts_enabled();
    if was_enabled {
        hal.disable_interrupts();
    }
    let result = f();
    if was_enabled {
        hal.enable_interrupts();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlagController {
        enabled: bool,
        disable_calls: u32,
    }

    impl InterruptHal for FlagController {
        fn enable_interrupts(&mut self) {
            self.enabled = true;
        }

        fn disable_interrupts(&mut self) {
            self.enabled = false;
            self.disable_calls += 1;
        }

        fn interrupts_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[test]
    fn test_without_interrupts_restores_enabled() {
        let mut hal = FlagController {
            enabled: true,
            disable_calls: 0,
        };
        let seen = without_interrupts(&mut hal, || 42);
        assert_eq!(seen, 42);
        assert!(hal.enabled);
        assert_eq!(hal.disable_calls, 1);
    }

    #[test]
    fn test_without_interrupts_keeps_disabled() {
        let mut hal = FlagController {
            enabled: false,
            disable_calls: 0,
        };
        without_interrupts(&mut hal, || ());
        assert!(!hal.enabled);
        assert_eq!(hal.disable_calls, 0);
    }
}
