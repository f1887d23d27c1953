//! Test utilities for kernel scenarios
//!
//! Helpers shared by the unit tests here and by `tests_resilience`.

use crate::config::{AlarmConfig, CounterConfig, KernelConfig, TaskConfig};
use crate::expiry::Expiry;
use crate::scheduler::ReadyQueue;
use crate::SimulatedKernel;
use core_types::{AlarmId, CounterId, TaskId, TickType};
use kernel_api::{KernelError, OsekApi};

/// The only counter of [`single_counter_config`]
pub const SYSTEM_COUNTER: CounterId = CounterId::new(0);

/// Tasks of [`single_counter_config`], ceiling 1 each
pub const TASKS: [TaskId; 4] = [
    TaskId::new(0),
    TaskId::new(1),
    TaskId::new(2),
    TaskId::new(3),
];

/// Alarms of [`single_counter_config`]; `ALARMS[n]` activates `TASKS[n]`
pub const ALARMS: [AlarmId; 4] = [
    AlarmId::new(0),
    AlarmId::new(1),
    AlarmId::new(2),
    AlarmId::new(3),
];

/// One hardware counter, four tasks, four alarms
pub fn single_counter_config(max_allowed_value: TickType, min_cycle: TickType) -> KernelConfig {
    let mut config = KernelConfig::new().with_counter(
        CounterConfig::new("system", max_allowed_value).with_min_cycle(min_cycle),
    );
    for (index, task) in TASKS.iter().enumerate() {
        config = config
            .with_task(TaskConfig::new(format!("task{}", index)))
            .with_alarm(AlarmConfig::activating(
                format!("alarm{}", index),
                SYSTEM_COUNTER,
                *task,
            ));
    }
    config
}

/// Builds a kernel from [`single_counter_config`] with a FIFO ready queue
///
/// # Panics
///
/// Panics if `min_cycle > max_allowed_value`.
pub fn single_counter_kernel(
    max_allowed_value: TickType,
    min_cycle: TickType,
) -> SimulatedKernel<ReadyQueue> {
    match SimulatedKernel::with_ready_queue(single_counter_config(max_allowed_value, min_cycle)) {
        Ok(kernel) => kernel,
        Err(e) => panic!("invalid test configuration: {}", e),
    }
}

/// Delivers `count` single ticks to `counter`, collecting every firing
pub fn run_ticks<D: kernel_api::Dispatcher>(
    kernel: &mut SimulatedKernel<D>,
    counter: CounterId,
    count: u64,
) -> Result<Vec<Expiry>, KernelError> {
    let mut fired = Vec::new();
    for _ in 0..count {
        fired.extend(kernel.tick(counter)?);
    }
    Ok(fired)
}

/// Runs every ready task to completion, in FIFO order
///
/// Each run is a dispatch followed by a terminate. Returns the number of
/// runs, including re-runs for pending activations.
pub fn complete_ready_tasks(kernel: &mut SimulatedKernel<ReadyQueue>) -> usize {
    let mut runs = 0;
    while kernel.dispatch_next().is_some() {
        if kernel.terminate_current().is_err() {
            break;
        }
        runs += 1;
    }
    runs
}
