//! Board layout and clock constants.

use hal::{ClockDivider, ClockSource, TimerId};

/// LF crystal feeding ACLK.
pub const ACLK_HZ: u32 = 32_768;

pub const TIMER_CLOCK: ClockSource = ClockSource::Aclk;
/// ACLK / 32 gives ~1024 counts per second.
pub const TIMER_DIVIDER: ClockDivider = ClockDivider::Div32;

/// Heartbeat reload value: one expiry per second.
pub const HEARTBEAT_TICK_COUNTS: u16 = 1024;

/// Maintenance period used until the application reconfigures it.
pub const DEFAULT_HEARTBEAT_PERIOD_SECS: u16 = 300;

/// Documented upper bound for the heartbeat period. Not enforced.
pub const MAX_RECOMMENDED_HEARTBEAT_SECS: u16 = 60;

pub const POOL_SIZE: usize = 5;

/// Which hardware timers back the pool, in allocation order, and which one
/// drives the heartbeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardLayout<const N: usize> {
    pub pool: [TimerId; N],
    pub heartbeat: TimerId,
}

/// Timer_A0..A4 pooled, Timer_B0 as heartbeat.
pub const MSP430FR5994: BoardLayout<POOL_SIZE> = BoardLayout {
    pool: [
        TimerId(0x0340),
        TimerId(0x0380),
        TimerId(0x0400),
        TimerId(0x0440),
        TimerId(0x07c0),
    ],
    heartbeat: TimerId(0x03c0),
};

pub const fn counts_per_second() -> u32 {
    ACLK_HZ / TIMER_DIVIDER.factor()
}

/// Convert milliseconds to timer counts, saturating at the 16-bit period.
pub const fn counts_from_ms(ms: u32) -> u16 {
    let counts = (ms as u64 * counts_per_second() as u64) / 1000;
    if counts > u16::MAX as u64 {
        u16::MAX
    } else {
        counts as u16
    }
}
