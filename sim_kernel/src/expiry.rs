//! # Alarm Expiry Processor
//!
//! Runs on every counter advance. Instead of visiting each crossed tick, it
//! jumps straight to the nearest armed expiry on the counter, fires every
//! alarm due at that tick in ascending identity, and repeats until the
//! advance is used up. A cyclic alarm whose next expiry also falls inside
//! the advance fires again, once per crossed expiry tick.

use crate::alarm::{AlarmAction, AlarmState};
use crate::audit::{ActivationSource, KernelEvent};
use crate::SimulatedKernel;
use core_types::{AlarmId, CallbackId, CounterId, TickType};
use kernel_api::{Dispatcher, KernelError};
use log::{trace, warn};

/// What happened when an alarm's action ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The bound task was activated
    TaskActivated,
    /// The bound task refused the activation
    ActivationRejected(KernelError),
    /// The callback is due; the caller runs it
    CallbackDue(CallbackId),
}

/// One alarm firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub alarm: AlarmId,
    pub counter: CounterId,
    /// Counter value the alarm fired at
    pub tick: TickType,
    pub action: AlarmAction,
    pub outcome: ExpiryOutcome,
}

impl<D: Dispatcher> SimulatedKernel<D> {
    /// Advances `counter` by `delta` ticks and fires every alarm it crosses
    ///
    /// Returns the firings in order: by crossed tick, then by alarm identity.
    pub fn advance_counter(
        &mut self,
        counter: CounterId,
        delta: u64,
    ) -> Result<Vec<Expiry>, KernelError> {
        let mut remaining = delta;
        let mut fired = Vec::new();

        loop {
            let current = self.counters.get(counter)?;
            match self.alarms.next_expiry_in(counter, current) {
                Some(step) if step <= remaining => {
                    self.counters.get_mut(counter)?.step(step);
                    remaining -= step;

                    let tick = self.counters.get(counter)?.current_value();
                    for alarm in self.alarms.due_at(counter, tick) {
                        fired.push(self.fire(alarm, counter, tick)?);
                    }
                }
                _ => {
                    self.counters.get_mut(counter)?.step(remaining);
                    break;
                }
            }
        }

        trace!(
            "{} advanced by {} to {}, {} alarm(s) fired",
            counter,
            delta,
            self.counters.get(counter)?.current_value(),
            fired.len()
        );
        Ok(fired)
    }

    fn fire(
        &mut self,
        alarm: AlarmId,
        counter: CounterId,
        tick: TickType,
    ) -> Result<Expiry, KernelError> {
        let action = self.alarms.get(alarm)?.action();
        let state = self
            .alarms
            .expire(alarm, self.counters.get(counter)?, tick)?;
        let rearmed = matches!(state, AlarmState::Active { .. });

        self.audit.record(KernelEvent::AlarmExpired {
            alarm,
            counter,
            tick,
            rearmed,
        });
        trace!("{} expired at {} on {}", alarm, tick, counter);

        let outcome = match action {
            AlarmAction::ActivateTask(task) => {
                match self.activate_from(task, ActivationSource::Alarm(alarm)) {
                    Ok(_) => ExpiryOutcome::TaskActivated,
                    Err(reason) => {
                        warn!("{} could not activate {}: {}", alarm, task, reason);
                        ExpiryOutcome::ActivationRejected(reason)
                    }
                }
            }
            AlarmAction::Callback(callback) => {
                self.queue_callback(alarm, callback);
                ExpiryOutcome::CallbackDue(callback)
            }
        };

        Ok(Expiry {
            alarm,
            counter,
            tick,
            action,
            outcome,
        })
    }
}
