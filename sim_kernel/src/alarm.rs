//! # Alarm Registry
//!
//! The fixed set of alarms, each bound to one counter.
//!
//! An alarm is either inactive or armed with an absolute expiry tick and an
//! optional re-arm cycle. The two are a single enum value, so an armed
//! state can never be observed without its expiry.
//!
//! All arming calls validate identity, capability, state and value, in that
//! order, before writing anything.

use crate::config::AlarmConfig;
use crate::counter::{Counter, CounterTable};
use core_types::{AlarmId, CallbackId, CounterId, TaskId, TickType};
use kernel_api::{AlarmBase, KernelError};
use serde::{Deserialize, Serialize};

/// What an alarm does when it expires
///
/// The action set is closed; the expiry processor matches on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target")]
pub enum AlarmAction {
    /// Activate a task through the activation gateway
    ActivateTask(TaskId),
    /// Report a callback as due; the interrupt glue runs it
    Callback(CallbackId),
}

/// Alarm state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    /// Not armed
    Inactive,
    /// Armed
    Active {
        /// Absolute counter value at which the alarm expires
        expiry: TickType,
        /// Re-arm period after expiry, 0 for one-shot
        cycle: TickType,
    },
}

/// One configured alarm
#[derive(Debug, Clone)]
pub struct Alarm {
    name: String,
    counter: CounterId,
    action: AlarmAction,
    state: AlarmState,
}

impl Alarm {
    /// Creates an inactive alarm from its configuration
    pub fn from_config(config: &AlarmConfig) -> Self {
        Self {
            name: config.name.clone(),
            counter: config.counter,
            action: config.action,
            state: AlarmState::Inactive,
        }
    }

    /// Human-readable name from configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counter this alarm is bound to
    pub fn counter(&self) -> CounterId {
        self.counter
    }

    /// Action run on expiry
    pub fn action(&self) -> AlarmAction {
        self.action
    }

    /// Current state
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Checks if the alarm is armed
    pub fn is_active(&self) -> bool {
        matches!(self.state, AlarmState::Active { .. })
    }

    fn expiry(&self) -> Option<TickType> {
        match self.state {
            AlarmState::Active { expiry, .. } => Some(expiry),
            AlarmState::Inactive => None,
        }
    }
}

/// Checks a relative increment against a counter's range
pub fn validate_increment(base: &AlarmBase, increment: TickType) -> Result<(), KernelError> {
    if increment == 0 || increment > base.max_allowed_value {
        return Err(KernelError::InvalidValue);
    }
    Ok(())
}

/// Checks an absolute start value against a counter's range
pub fn validate_start(base: &AlarmBase, start: TickType) -> Result<(), KernelError> {
    if start > base.max_allowed_value {
        return Err(KernelError::InvalidValue);
    }
    Ok(())
}

/// Checks a cycle against a counter's range and minimum cycle
///
/// A zero cycle (one-shot) is always legal.
pub fn validate_cycle(base: &AlarmBase, cycle: TickType) -> Result<(), KernelError> {
    if cycle != 0 && (cycle < base.min_cycle || cycle > base.max_allowed_value) {
        return Err(KernelError::InvalidValue);
    }
    Ok(())
}

/// Arena of all configured alarms
#[derive(Debug, Clone, Default)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
}

impl AlarmRegistry {
    /// Builds the arena from configuration, in configuration order
    pub fn from_configs(configs: &[AlarmConfig]) -> Self {
        Self {
            alarms: configs.iter().map(Alarm::from_config).collect(),
        }
    }

    /// Looks up an alarm
    pub fn get(&self, id: AlarmId) -> Result<&Alarm, KernelError> {
        self.alarms.get(id.index()).ok_or(KernelError::InvalidId)
    }

    /// Number of configured alarms
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    /// Checks if no alarms are configured
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Returns the characteristics of the counter `id` is bound to
    pub fn alarm_base(&self, id: AlarmId, counters: &CounterTable) -> Result<AlarmBase, KernelError> {
        let alarm = self.get(id)?;
        Ok(counters.get(alarm.counter)?.base())
    }

    /// Arms `id` to expire `increment` ticks after the counter's current value
    ///
    /// Returns the absolute expiry tick.
    pub fn set_rel(
        &mut self,
        id: AlarmId,
        counters: &CounterTable,
        increment: TickType,
        cycle: TickType,
    ) -> Result<TickType, KernelError> {
        let expiry = self.check_rel(id, counters, increment, cycle)?;
        self.arm(id, expiry, cycle);
        Ok(expiry)
    }

    /// Runs every check of [`AlarmRegistry::set_rel`] without arming
    ///
    /// Returns the expiry tick the alarm would get.
    pub fn check_rel(
        &self,
        id: AlarmId,
        counters: &CounterTable,
        increment: TickType,
        cycle: TickType,
    ) -> Result<TickType, KernelError> {
        let counter = self.armable(id, counters)?;
        let base = counter.base();
        validate_increment(&base, increment)?;
        validate_cycle(&base, cycle)?;
        Ok(counter.offset(counter.current_value(), increment as u64))
    }

    /// Arms `id` to expire when its counter reaches `start`
    ///
    /// Returns the absolute expiry tick, which is `start`.
    pub fn set_abs(
        &mut self,
        id: AlarmId,
        counters: &CounterTable,
        start: TickType,
        cycle: TickType,
    ) -> Result<TickType, KernelError> {
        self.check_abs(id, counters, start, cycle)?;
        self.arm(id, start, cycle);
        Ok(start)
    }

    /// Runs every check of [`AlarmRegistry::set_abs`] without arming
    pub fn check_abs(
        &self,
        id: AlarmId,
        counters: &CounterTable,
        start: TickType,
        cycle: TickType,
    ) -> Result<TickType, KernelError> {
        let counter = self.armable(id, counters)?;
        let base = counter.base();
        validate_start(&base, start)?;
        validate_cycle(&base, cycle)?;
        Ok(start)
    }

    /// Disarms `id`
    ///
    /// Returns whether the alarm was armed. Cancelling an inactive alarm is
    /// not an error.
    pub fn cancel(&mut self, id: AlarmId, counters: &CounterTable) -> Result<bool, KernelError> {
        self.supported(id, counters)?;
        let alarm = self.get_mut(id)?;
        let was_active = alarm.is_active();
        alarm.state = AlarmState::Inactive;
        Ok(was_active)
    }

    /// Ticks remaining until `id` expires
    ///
    /// An alarm armed at the current tick of its counter is a full wrap
    /// away. On a full-width counter that distance does not fit in a
    /// `TickType` and reads as 0, the only case in which 0 is reported.
    pub fn remaining(&self, id: AlarmId, counters: &CounterTable) -> Result<TickType, KernelError> {
        let counter = self.supported(id, counters)?;
        let expiry = self.get(id)?.expiry().ok_or(KernelError::InvalidState)?;
        let ticks = counter.ticks_until(expiry);
        Ok(TickType::try_from(ticks).unwrap_or(0))
    }

    /// Ticks until the earliest armed alarm on `counter_id` expires
    pub(crate) fn next_expiry_in(&self, counter_id: CounterId, counter: &Counter) -> Option<u64> {
        self.alarms
            .iter()
            .filter(|alarm| alarm.counter == counter_id)
            .filter_map(Alarm::expiry)
            .map(|expiry| counter.ticks_until(expiry))
            .min()
    }

    /// Armed alarms on `counter_id` whose expiry is `tick`, in ascending identity
    pub(crate) fn due_at(&self, counter_id: CounterId, tick: TickType) -> Vec<AlarmId> {
        self.alarms
            .iter()
            .enumerate()
            .filter(|(_, alarm)| alarm.counter == counter_id && alarm.expiry() == Some(tick))
            .map(|(index, _)| AlarmId::new(index as u32))
            .collect()
    }

    /// Applies an expiry at `tick`: one-shot alarms disarm, cyclic alarms re-arm
    ///
    /// Returns the new state.
    pub(crate) fn expire(
        &mut self,
        id: AlarmId,
        counter: &Counter,
        tick: TickType,
    ) -> Result<AlarmState, KernelError> {
        let alarm = self.get_mut(id)?;
        alarm.state = match alarm.state {
            AlarmState::Active { cycle: 0, .. } | AlarmState::Inactive => AlarmState::Inactive,
            AlarmState::Active { cycle, .. } => AlarmState::Active {
                expiry: counter.offset(tick, cycle as u64),
                cycle,
            },
        };
        Ok(alarm.state)
    }

    fn get_mut(&mut self, id: AlarmId) -> Result<&mut Alarm, KernelError> {
        self.alarms.get_mut(id.index()).ok_or(KernelError::InvalidId)
    }

    fn arm(&mut self, id: AlarmId, expiry: TickType, cycle: TickType) {
        if let Some(alarm) = self.alarms.get_mut(id.index()) {
            alarm.state = AlarmState::Active { expiry, cycle };
        }
    }

    /// Resolves the alarm's counter, failing if it has no alarm support
    fn supported<'a>(
        &self,
        id: AlarmId,
        counters: &'a CounterTable,
    ) -> Result<&'a Counter, KernelError> {
        let alarm = self.get(id)?;
        let counter = counters.get(alarm.counter)?;
        if !counter.supports_alarms() {
            return Err(KernelError::UnsupportedOperation);
        }
        Ok(counter)
    }

    /// Like `supported`, and additionally requires the alarm to be inactive
    fn armable<'a>(
        &self,
        id: AlarmId,
        counters: &'a CounterTable,
    ) -> Result<&'a Counter, KernelError> {
        let counter = self.supported(id, counters)?;
        if self.get(id)?.is_active() {
            return Err(KernelError::InvalidState);
        }
        Ok(counter)
    }
}
