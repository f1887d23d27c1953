//! Kernel Audit Trail
//!
//! Chronological record of alarm and task transitions, for verification in
//! tests and for post-mortem inspection.
//!
//! ## Philosophy
//!
//! - Deterministic: Events are recorded in the order the kernel applied them
//! - Linearizable: Events are recorded inside the kernel's critical section
//! - Queryable: Tests assert on the trail instead of on log output
//!
//! ## Example
//!
//! ```
//! use sim_kernel::audit::{KernelAuditLog, KernelEvent};
//! use core_types::AlarmId;
//!
//! let mut audit_log = KernelAuditLog::new();
//! audit_log.record(KernelEvent::AlarmCancelled { alarm: AlarmId::new(0) });
//!
//! assert_eq!(audit_log.len(), 1);
//! assert!(audit_log.has_event(|e| matches!(e, KernelEvent::AlarmCancelled { .. })));
//! ```

use core_types::{AlarmId, CounterId, TaskId, TickType};
use kernel_api::{KernelError, TaskState};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where an activation request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationSource {
    /// An `activate_task` call
    Api,
    /// An expiring alarm
    Alarm(AlarmId),
    /// `start_os` autostart
    Autostart,
}

/// A kernel state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelEvent {
    /// The kernel was started
    OsStarted,
    AlarmArmed {
        alarm: AlarmId,
        counter: CounterId,
        expiry: TickType,
        cycle: TickType,
    },
    /// An armed alarm was cancelled
    AlarmCancelled { alarm: AlarmId },
    AlarmExpired {
        alarm: AlarmId,
        counter: CounterId,
        tick: TickType,
        /// Whether the alarm stays armed for another cycle
        rearmed: bool,
    },
    TaskActivated {
        task: TaskId,
        source: ActivationSource,
    },
    /// An activation was refused, typically at the activation ceiling
    ActivationRejected {
        task: TaskId,
        source: ActivationSource,
        reason: KernelError,
    },
    TaskDispatched { task: TaskId },
    TaskTerminated { task: TaskId, next: TaskState },
}

impl KernelEvent {
    /// The alarm this event concerns, if any
    pub fn alarm(&self) -> Option<AlarmId> {
        match self {
            KernelEvent::AlarmArmed { alarm, .. }
            | KernelEvent::AlarmCancelled { alarm }
            | KernelEvent::AlarmExpired { alarm, .. } => Some(*alarm),
            _ => None,
        }
    }

    /// The task this event concerns, if any
    pub fn task(&self) -> Option<TaskId> {
        match self {
            KernelEvent::TaskActivated { task, .. }
            | KernelEvent::ActivationRejected { task, .. }
            | KernelEvent::TaskDispatched { task }
            | KernelEvent::TaskTerminated { task, .. } => Some(*task),
            _ => None,
        }
    }
}

/// A recorded event with its position in the trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelAuditEvent {
    /// Monotonic sequence number, starting at 0
    pub sequence: u64,
    pub event: KernelEvent,
}

/// Events a kernel keeps unless given another log
pub const DEFAULT_AUDIT_CAPACITY: usize = 4096;

/// Audit log for kernel transitions
///
/// [`KernelAuditLog::new`] is unbounded. With a capacity limit the oldest
/// events are discarded first and counted in [`KernelAuditLog::dropped`].
#[derive(Debug, Default)]
pub struct KernelAuditLog {
    events: VecDeque<KernelAuditEvent>,
    next_sequence: u64,
    capacity: Option<usize>,
    dropped: u64,
}

impl KernelAuditLog {
    /// Creates a new empty, unbounded audit log
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an audit log that keeps at most `capacity` events
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Records an event
    pub fn record(&mut self, event: KernelEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                self.dropped += 1;
                return;
            }
            while self.events.len() >= capacity {
                self.events.pop_front();
                self.dropped += 1;
            }
        }
        self.events.push_back(KernelAuditEvent { sequence, event });
    }

    /// Iterates over retained events, oldest first
    pub fn events(&self) -> impl Iterator<Item = &KernelAuditEvent> {
        self.events.iter()
    }

    /// Returns retained events concerning `alarm`
    pub fn events_for_alarm(&self, alarm: AlarmId) -> Vec<&KernelEvent> {
        self.events
            .iter()
            .map(|e| &e.event)
            .filter(|e| e.alarm() == Some(alarm))
            .collect()
    }

    /// Returns retained events concerning `task`
    pub fn events_for_task(&self, task: TaskId) -> Vec<&KernelEvent> {
        self.events
            .iter()
            .map(|e| &e.event)
            .filter(|e| e.task() == Some(task))
            .collect()
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&KernelEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(&e.event)).count()
    }

    /// Checks if any event matches the predicate
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&KernelEvent) -> bool,
    {
        self.events.iter().any(|e| predicate(&e.event))
    }

    /// Number of events discarded by the capacity limit
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Clears all events (useful for test reset)
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks if the audit log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_creation() {
        let log = KernelAuditLog::new();
        assert_eq!(log.len(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let mut log = KernelAuditLog::new();
        log.record(KernelEvent::OsStarted);
        log.record(KernelEvent::TaskDispatched {
            task: TaskId::new(0),
        });
        let sequences: Vec<u64> = log.events().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
    }

    #[test]
    fn test_filter_by_object() {
        let mut log = KernelAuditLog::new();
        let alarm = AlarmId::new(1);
        let task = TaskId::new(2);

        log.record(KernelEvent::AlarmArmed {
            alarm,
            counter: CounterId::new(0),
            expiry: 5,
            cycle: 0,
        });
        log.record(KernelEvent::AlarmExpired {
            alarm,
            counter: CounterId::new(0),
            tick: 5,
            rearmed: false,
        });
        log.record(KernelEvent::TaskActivated {
            task,
            source: ActivationSource::Alarm(alarm),
        });
        log.record(KernelEvent::AlarmCancelled {
            alarm: AlarmId::new(3),
        });

        assert_eq!(log.events_for_alarm(alarm).len(), 2);
        assert_eq!(log.events_for_task(task).len(), 1);
        assert_eq!(
            log.count_events(|e| matches!(e, KernelEvent::AlarmCancelled { .. })),
            1
        );
    }

    #[test]
    fn test_capacity_limit_drops_oldest() {
        let mut log = KernelAuditLog::with_capacity_limit(2);
        for index in 0..5 {
            log.record(KernelEvent::TaskDispatched {
                task: TaskId::new(index),
            });
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped(), 3);
        let first = log.events().next().unwrap();
        assert_eq!(first.sequence, 3);
    }

    #[test]
    fn test_clear() {
        let mut log = KernelAuditLog::new();
        log.record(KernelEvent::OsStarted);
        log.clear();
        assert!(log.is_empty());
    }
}
