//! A statically-configured real-time microkernel for deeply embedded,
//! single-processor targets.
//!
//! Every kernel object (tasks, partition pools, mailboxes, queues, pipes,
//! semaphores, event groups, timers) lives in a fixed-size table sized at
//! compile time by a const generic parameter on [`kernel::Kernel`]. There is
//! no dynamic object creation, deletion, or heap allocation anywhere in this
//! crate.
//!
//! # Algorithm Naivety Principles
//!
//! This implementation uses straightforward algorithms in favor of clever
//! ones. The intent is:
//!
//! 1. To use safe Rust for as much as possible.
//! 2. To use easily understood and debugged algorithms.
//! 3. To revisit these decisions if they become performance problems.
//!
//! Assumptions enabling our naivete:
//!
//! - Every object table holds at most 16 entries.
//! - We are not attempting to achieve predictably low worst-case execution
//!   bounds beyond what the wake-by-scan policy already guarantees.
//!
//! # Host testing
//!
//! This crate is `no_std` only when built for a bare-metal target
//! (`cfg(target_os = "none")`). On the host it compiles against `std` and
//! selects the [`arch::simulator`] backend in place of [`arch::arm_m`], which
//! lets the scheduling and object logic in this crate be exercised by
//! ordinary `cargo test` without hardware.

#![cfg_attr(target_os = "none", no_std)]

#[macro_use]
pub mod err;

#[macro_use]
pub mod arch;

pub mod clock;
pub mod config;
pub mod event;
pub mod kernel;
pub mod mailbox;
pub mod partition;
pub mod pipe;
pub mod queue;
pub mod release;
pub mod sched;
pub mod semaphore;
pub mod signals;
pub mod task;
pub mod tick;
pub mod timer;

pub use abi::{Error, KernResult};
pub use config::KernelConfig;
pub use kernel::Kernel;
