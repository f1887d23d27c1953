//! # Kernel API
//!
//! This crate defines the interface between application code and the
//! counter/alarm kernel core.
//!
//! ## Philosophy
//!
//! The kernel core provides **bookkeeping**, not execution:
//! - Task activation decisions (not context switching)
//! - Counter advancement (not timer hardware)
//! - Alarm arming and expiry (not callbacks run in kernel context)
//!
//! ## Design Goals
//!
//! 1. **Testability**: The entire API can be driven from `cargo test`
//! 2. **All-or-nothing calls**: A failed call leaves no partial effect
//! 3. **Type safety**: Tasks, alarms and counters have distinct handle types
//! 4. **Bounded time**: No call blocks or waits on another task
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A scheduler or dispatcher (consumed through [`Dispatcher`])
//! - A timer driver (the tick source calls into the core)
//! - A memory-protection layer

pub mod error;
pub mod kernel;
pub mod time;

pub use error::{KernelError, StatusType};
pub use kernel::{AlarmBase, Dispatcher, OsekApi, TaskState};
pub use time::{Duration, TickRate};
