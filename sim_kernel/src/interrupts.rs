//! Simulated interrupt controller
//!
//! Stands in for the CPU interrupt flag so the shared kernel can mask the
//! tick interrupt around task-context calls exactly as a hardware port
//! would.

use hal::InterruptHal;

/// Interrupt flag with a record of how often it was masked
#[derive(Debug, Clone)]
pub struct SimInterruptController {
    enabled: bool,
    masked_sections: u64,
}

impl SimInterruptController {
    /// Creates a controller with interrupts enabled
    pub fn new() -> Self {
        Self {
            enabled: true,
            masked_sections: 0,
        }
    }

    /// Number of times interrupts went from enabled to disabled
    pub fn masked_sections(&self) -> u64 {
        self.masked_sections
    }
}

impl Default for SimInterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptHal for SimInterruptController {
    fn enable_interrupts(&mut self) {
        self.enabled = true;
    }

    fn disable_interrupts(&mut self) {
        if self.enabled {
            self.masked_sections += 1;
        }
        self.enabled = false;
    }

    fn interrupts_enabled(&self) -> bool {
        self.enabled
    }
}
