//! # Kernel Configuration
//!
//! The static description of a system: its counters, tasks and alarms.
//!
//! Nothing is created at runtime. A [`KernelConfig`] is built once, either
//! with the fluent builders or from JSON, validated, and turned into fixed
//! arenas. Handles are positions in these lists: the first counter is
//! `CounterId(0)`, the first task `TaskId(0)`, and so on.
//!
//! ## Example
//!
//! ```
//! use sim_kernel::config::{AlarmAutostart, AlarmConfig, CounterConfig, KernelConfig, TaskConfig};
//! use core_types::{CounterId, TaskId};
//!
//! let config = KernelConfig::new()
//!     .with_counter(CounterConfig::new("system_timer", 999).with_min_cycle(5))
//!     .with_task(TaskConfig::new("control_loop"))
//!     .with_alarm(
//!         AlarmConfig::activating("control_tick", CounterId::new(0), TaskId::new(0))
//!             .with_autostart(AlarmAutostart::Relative { increment: 10, cycle: 10 }),
//!     );
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::alarm::{validate_cycle, validate_increment, validate_start, AlarmAction};
use core_types::{AlarmId, CounterId, TaskId, TickType};
use kernel_api::{AlarmBase, Duration, KernelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default length of one counter base unit: one millisecond
pub const DEFAULT_BASE_NANOS: u64 = 1_000_000;

/// How a counter is advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CounterKind {
    /// Driven by a tick source through `tick`/`tick_n`
    #[default]
    Hardware,
    /// Driven by application calls to `increment_counter`
    Software,
}

/// Configuration of one counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    pub name: String,
    pub max_allowed_value: TickType,
    #[serde(default = "default_one")]
    pub ticks_per_base: TickType,
    #[serde(default = "default_one")]
    pub min_cycle: TickType,
    #[serde(default)]
    pub kind: CounterKind,
    #[serde(default = "default_true")]
    pub supports_alarms: bool,
    /// Length of one base unit in nanoseconds
    #[serde(default = "default_base_nanos")]
    pub base_nanos: u64,
}

impl CounterConfig {
    /// Creates a hardware counter with one tick per base unit and a minimum cycle of 1
    pub fn new(name: impl Into<String>, max_allowed_value: TickType) -> Self {
        Self {
            name: name.into(),
            max_allowed_value,
            ticks_per_base: 1,
            min_cycle: 1,
            kind: CounterKind::Hardware,
            supports_alarms: true,
            base_nanos: DEFAULT_BASE_NANOS,
        }
    }

    pub fn with_ticks_per_base(mut self, ticks_per_base: TickType) -> Self {
        self.ticks_per_base = ticks_per_base;
        self
    }

    pub fn with_min_cycle(mut self, min_cycle: TickType) -> Self {
        self.min_cycle = min_cycle;
        self
    }

    /// Sets the length of one base unit, saturating at `u64::MAX` nanoseconds
    pub fn with_base_unit(mut self, base: Duration) -> Self {
        self.base_nanos = u64::try_from(base.as_nanos()).unwrap_or(u64::MAX);
        self
    }

    /// Marks the counter as advanced by `increment_counter`
    pub fn software(mut self) -> Self {
        self.kind = CounterKind::Software;
        self
    }

    /// Disables alarm operations on this counter
    pub fn without_alarms(mut self) -> Self {
        self.supports_alarms = false;
        self
    }

    fn alarm_base(&self) -> AlarmBase {
        AlarmBase {
            max_allowed_value: self.max_allowed_value,
            ticks_per_base: self.ticks_per_base,
            min_cycle: self.min_cycle,
        }
    }
}

/// Configuration of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,
    /// Activation ceiling: the most activations that may be pending at once
    #[serde(default = "default_one")]
    pub max_activations: u32,
    /// Activate the task from `start_os`
    #[serde(default)]
    pub autostart: bool,
}

impl TaskConfig {
    /// Creates a task with an activation ceiling of 1
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_activations: 1,
            autostart: false,
        }
    }

    pub fn with_max_activations(mut self, max_activations: u32) -> Self {
        self.max_activations = max_activations;
        self
    }

    pub fn autostart(mut self) -> Self {
        self.autostart = true;
        self
    }
}

/// How an alarm is armed by `start_os`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmAutostart {
    /// As `set_rel_alarm(increment, cycle)`
    Relative { increment: TickType, cycle: TickType },
    /// As `set_abs_alarm(start, cycle)`
    Absolute { start: TickType, cycle: TickType },
}

/// Configuration of one alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    pub name: String,
    pub counter: CounterId,
    pub action: AlarmAction,
    #[serde(default)]
    pub autostart: Option<AlarmAutostart>,
}

impl AlarmConfig {
    pub fn new(name: impl Into<String>, counter: CounterId, action: AlarmAction) -> Self {
        Self {
            name: name.into(),
            counter,
            action,
            autostart: None,
        }
    }

    /// Creates an alarm that activates `task` on expiry
    pub fn activating(name: impl Into<String>, counter: CounterId, task: TaskId) -> Self {
        Self::new(name, counter, AlarmAction::ActivateTask(task))
    }

    pub fn with_autostart(mut self, autostart: AlarmAutostart) -> Self {
        self.autostart = Some(autostart);
        self
    }
}

/// Errors found while validating a configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("{counter} has zero ticks per base")]
    ZeroTicksPerBase { counter: CounterId },

    #[error("{counter} has min_cycle {min_cycle} above max_allowed_value {max_allowed_value}")]
    MinCycleOutOfRange {
        counter: CounterId,
        min_cycle: TickType,
        max_allowed_value: TickType,
    },

    #[error("{task} has an activation ceiling of zero")]
    ZeroActivationCeiling { task: TaskId },

    #[error("{alarm} is bound to unknown {counter}")]
    UnknownCounter { alarm: AlarmId, counter: CounterId },

    #[error("{alarm} activates unknown {task}")]
    UnknownTask { alarm: AlarmId, task: TaskId },

    #[error("{alarm} has invalid autostart parameters: {reason}")]
    InvalidAutostart { alarm: AlarmId, reason: KernelError },
}

/// Static description of the whole system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default)]
    pub counters: Vec<CounterConfig>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    #[serde(default)]
    pub alarms: Vec<AlarmConfig>,
}

impl KernelConfig {
    /// Creates an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a counter; its handle is its position
    pub fn with_counter(mut self, counter: CounterConfig) -> Self {
        self.counters.push(counter);
        self
    }

    /// Appends a task; its handle is its position
    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.tasks.push(task);
        self
    }

    /// Appends an alarm; its handle is its position
    pub fn with_alarm(mut self, alarm: AlarmConfig) -> Self {
        self.alarms.push(alarm);
        self
    }

    /// Parses a configuration from JSON and validates it
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every cross-reference and range in the configuration
    ///
    /// Returns the first problem found, in counter, task, alarm order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, counter) in self.counters.iter().enumerate() {
            let id = CounterId::new(index as u32);
            if counter.ticks_per_base == 0 {
                return Err(ConfigError::ZeroTicksPerBase { counter: id });
            }
            if counter.min_cycle > counter.max_allowed_value {
                return Err(ConfigError::MinCycleOutOfRange {
                    counter: id,
                    min_cycle: counter.min_cycle,
                    max_allowed_value: counter.max_allowed_value,
                });
            }
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if task.max_activations == 0 {
                return Err(ConfigError::ZeroActivationCeiling {
                    task: TaskId::new(index as u32),
                });
            }
        }

        for (index, alarm) in self.alarms.iter().enumerate() {
            let id = AlarmId::new(index as u32);
            let counter = self
                .counters
                .get(alarm.counter.index())
                .ok_or(ConfigError::UnknownCounter {
                    alarm: id,
                    counter: alarm.counter,
                })?;

            if let AlarmAction::ActivateTask(task) = alarm.action {
                if task.index() >= self.tasks.len() {
                    return Err(ConfigError::UnknownTask { alarm: id, task });
                }
            }

            if let Some(autostart) = alarm.autostart {
                validate_autostart(counter, autostart)
                    .map_err(|reason| ConfigError::InvalidAutostart { alarm: id, reason })?;
            }
        }

        Ok(())
    }
}

fn validate_autostart(counter: &CounterConfig, autostart: AlarmAutostart) -> Result<(), KernelError> {
    if !counter.supports_alarms {
        return Err(KernelError::UnsupportedOperation);
    }
    let base = counter.alarm_base();
    match autostart {
        AlarmAutostart::Relative { increment, cycle } => {
            validate_increment(&base, increment)?;
            validate_cycle(&base, cycle)
        }
        AlarmAutostart::Absolute { start, cycle } => {
            validate_start(&base, start)?;
            validate_cycle(&base, cycle)
        }
    }
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_base_nanos() -> u64 {
    DEFAULT_BASE_NANOS
}
