//! Handles for statically configured kernel objects

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Creates a handle from its arena index
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Returns the arena index behind this handle
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle of a configured task
    ///
    /// Tasks are opaque schedulable units. The kernel core tracks their
    /// activation state; the external dispatcher runs their bodies.
    TaskId,
    "Task"
);

define_handle!(
    /// Handle of a configured alarm
    AlarmId,
    "Alarm"
);

define_handle!(
    /// Handle of a configured counter
    CounterId,
    "Counter"
);

define_handle!(
    /// Handle of an alarm callback routine
    ///
    /// The kernel never calls callbacks itself; it reports which callback
    /// is due and the interrupt glue runs it outside the critical section.
    CallbackId,
    "Callback"
);
