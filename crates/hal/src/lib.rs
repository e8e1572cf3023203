#![cfg_attr(not(test), no_std)]

pub mod interrupt;
pub mod time;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use interrupt::{TimerIrqHandler, WakeDecision, dispatch as dispatch_timer_irq, register_handler};
pub use time::{ClockDivider, ClockSource, TimerId, TimerPeripheral, UpModeConfig, UpModeFlags};
