//! Resilience Test Utilities
//!
//! Shared setup for the cross-crate kernel scenarios in `tests/`.
//!
//! ## Test Philosophy
//!
//! - **Exactly once**: Every crossed expiry fires one time, however the ticks arrive
//! - **Modular time**: Wraparound is a normal event, not an edge case
//! - **Atomic calls**: A failed call leaves nothing behind, a racing tick sees no half-update
//! - **Audit over logs**: Scenarios assert on the kernel audit trail

use core_types::{CounterId, TaskId};
use kernel_api::KernelError;
use sim_kernel::config::{AlarmConfig, ConfigError, CounterConfig, KernelConfig, TaskConfig};
use sim_kernel::scheduler::ReadyQueue;
use sim_kernel::{SharedKernel, SimulatedKernel};

/// Why a scenario kernel could not be brought up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// The configuration was refused
    Config(ConfigError),
    /// `start_os` failed
    Start(KernelError),
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<KernelError> for BootstrapError {
    fn from(err: KernelError) -> Self {
        BootstrapError::Start(err)
    }
}

/// Bootstrap helper for tests
///
/// Builds and starts a kernel from a validated configuration.
pub fn test_bootstrap(
    config: KernelConfig,
) -> Result<SimulatedKernel<ReadyQueue>, BootstrapError> {
    let mut kernel = SimulatedKernel::with_ready_queue(config)?;
    kernel.start_os()?;
    Ok(kernel)
}

/// Like [`test_bootstrap`], wrapped for use from several threads
pub fn shared_bootstrap(config: KernelConfig) -> Result<SharedKernel<ReadyQueue>, BootstrapError> {
    Ok(SharedKernel::new(test_bootstrap(config)?))
}

/// A configuration with one counter and `alarms` alarms, each activating
/// its own task with activation ceiling `ceiling`
pub fn alarm_bank(max_allowed_value: u32, alarms: u32, ceiling: u32) -> KernelConfig {
    let counter = CounterId::new(0);
    let mut config = KernelConfig::new().with_counter(CounterConfig::new("bank", max_allowed_value));
    for index in 0..alarms {
        config = config
            .with_task(TaskConfig::new(format!("worker{}", index)).with_max_activations(ceiling))
            .with_alarm(AlarmConfig::activating(
                format!("trigger{}", index),
                counter,
                TaskId::new(index),
            ));
    }
    config
}
