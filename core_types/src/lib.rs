//! # Core Types
//!
//! This crate defines the fundamental types shared by every kernel crate.
//!
//! ## Philosophy
//!
//! Kernel objects are configured once and never created at runtime, so they
//! are named by small integer handles into fixed arenas rather than by
//! pointers or heap identities:
//! - **Typed handles**: a task handle cannot be passed where an alarm is expected.
//! - **Plain data**: handles are `Copy` and serializable for configuration files.
//! - **Explicit width**: tick values are fixed-width unsigned integers.
//!
//! ## Key Types
//!
//! - [`TaskId`]: Handle of a configured task
//! - [`AlarmId`]: Handle of a configured alarm
//! - [`CounterId`]: Handle of a configured counter
//! - [`CallbackId`]: Handle of an alarm callback routine
//! - [`TickType`]: Counter tick value

pub mod ids;

pub use ids::{AlarmId, CallbackId, CounterId, TaskId};

/// Counter tick value
///
/// All tick arithmetic is modulo the owning counter's
/// `max_allowed_value + 1`, never the width of this type.
pub type TickType = u32;
