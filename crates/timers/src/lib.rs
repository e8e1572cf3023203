//! Pooled hardware timers with interrupt-side callback dispatch and a
//! maintenance heartbeat.
//!
//! Application code borrows timers from a fixed [`TimerPool`], the timer
//! vectors route expiries through [`Timers::on_expiry`] (usually via
//! [`hal::dispatch_timer_irq`]), and each entry hands back a
//! [`WakeDecision`] for the idle loop.
//!
//! Shared state is only touched inside `critical_section::with`. Ownership
//! changes (`request`, `free`, `kill`, `init_pool`) belong to normal-priority
//! code and must never be made from a timer callback.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dispatch;
pub mod heartbeat;
pub mod log;
pub mod pool;
pub mod system;

pub use dispatch::{DispatchTable, DispatchTarget};
pub use hal::WakeDecision;
pub use heartbeat::Heartbeat;
pub use pool::{TimerCallback, TimerHandle, TimerPool};
pub use system::{ServiceReport, Timers};
