//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware seams the kernel core consumes.
//!
//! ## Philosophy
//!
//! **The kernel core never touches a timer peripheral.**
//!
//! A tick source produces ticks; an interrupt controller masks them. Both
//! are traits so the same core runs against simulated devices under
//! `cargo test` and against real peripherals on a board.
//!
//! ## Design Principles
//!
//! 1. **No peripheral assumptions**: Core logic works with any tick source
//! 2. **Trait-based**: All hardware access goes through traits
//! 3. **Testable**: Every trait has a deterministic simulated implementation

#![no_std]

pub mod interrupts;
pub mod timer;

pub use interrupts::{without_interrupts, InterruptHal};
pub use timer::{TimerDevice, TimerInterrupt};
