//! # Counter Core
//!
//! Monotonic tick counters that wrap at a configured maximum.
//!
//! A counter only moves forward, and only when its tick source says so.
//! Every value it takes is in `0..=max_allowed_value`; arithmetic is done
//! modulo `max_allowed_value + 1` in `u64` so a full-width counter is legal.

use crate::config::{CounterConfig, CounterKind};
use core_types::{CounterId, TickType};
use kernel_api::{AlarmBase, Duration, KernelError, TickRate};

/// One configured tick source
#[derive(Debug, Clone)]
pub struct Counter {
    name: String,
    base: AlarmBase,
    kind: CounterKind,
    supports_alarms: bool,
    base_unit: Duration,
    current: TickType,
}

impl Counter {
    /// Creates a counter at value zero from its configuration
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            name: config.name.clone(),
            base: AlarmBase {
                max_allowed_value: config.max_allowed_value,
                ticks_per_base: config.ticks_per_base,
                min_cycle: config.min_cycle,
            },
            kind: config.kind,
            supports_alarms: config.supports_alarms,
            base_unit: Duration::from_nanos(config.base_nanos),
            current: 0,
        }
    }

    /// Human-readable name from configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current counter value
    pub fn current_value(&self) -> TickType {
        self.current
    }

    /// Static characteristics of this counter
    pub fn base(&self) -> AlarmBase {
        self.base
    }

    /// Whether the counter is driven by hardware or by `IncrementCounter`
    pub fn kind(&self) -> CounterKind {
        self.kind
    }

    /// Whether alarms may be armed on this counter
    pub fn supports_alarms(&self) -> bool {
        self.supports_alarms
    }

    /// Tick-to-time conversion for this counter
    pub fn tick_rate(&self) -> TickRate {
        TickRate::new(self.base.ticks_per_base, self.base_unit)
    }

    /// Number of distinct values, `max_allowed_value + 1`
    pub fn modulus(&self) -> u64 {
        self.base.modulus()
    }

    /// Returns `from + delta` wrapped into the counter's range
    pub fn offset(&self, from: TickType, delta: u64) -> TickType {
        let modulus = self.modulus();
        ((from as u64 % modulus + delta % modulus) % modulus) as TickType
    }

    /// Returns `(to - from) mod (max_allowed_value + 1)`
    pub fn distance(&self, from: TickType, to: TickType) -> u64 {
        let modulus = self.modulus();
        (to as u64 + modulus - from as u64 % modulus) % modulus
    }

    /// Ticks until the counter next reaches `target`
    ///
    /// A target equal to the current value is a full wrap away, never zero.
    pub fn ticks_until(&self, target: TickType) -> u64 {
        match self.distance(self.current, target) {
            0 => self.modulus(),
            d => d,
        }
    }

    /// Returns the ticks elapsed since `previous` and stores the current value into it
    pub fn elapsed_since(&self, previous: &mut TickType) -> Result<TickType, KernelError> {
        if *previous > self.base.max_allowed_value {
            return Err(KernelError::InvalidValue);
        }
        // strictly below the modulus, so it fits
        let elapsed = self.distance(*previous, self.current) as TickType;
        *previous = self.current;
        Ok(elapsed)
    }

    /// Moves the counter forward by `delta` ticks
    pub(crate) fn step(&mut self, delta: u64) {
        self.current = self.offset(self.current, delta);
    }
}

/// Arena of all configured counters
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    counters: Vec<Counter>,
}

impl CounterTable {
    /// Builds the arena from configuration, in configuration order
    pub fn from_configs(configs: &[CounterConfig]) -> Self {
        Self {
            counters: configs.iter().map(Counter::from_config).collect(),
        }
    }

    /// Looks up a counter
    pub fn get(&self, id: CounterId) -> Result<&Counter, KernelError> {
        self.counters.get(id.index()).ok_or(KernelError::InvalidId)
    }

    pub(crate) fn get_mut(&mut self, id: CounterId) -> Result<&mut Counter, KernelError> {
        self.counters.get_mut(id.index()).ok_or(KernelError::InvalidId)
    }

    /// Number of configured counters
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Checks if no counters are configured
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
