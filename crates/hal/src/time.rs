/// Opaque hardware timer identifier.
///
/// On MSP430 parts this is the peripheral base address; the core never
/// interprets it beyond equality.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// Auxiliary clock, fed from the 32768 Hz LF crystal.
    Aclk,
    /// Sub-main clock.
    Smclk,
    /// External clock pin.
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockDivider {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
}

impl ClockDivider {
    pub const fn factor(self) -> u32 {
        match self {
            ClockDivider::Div1 => 1,
            ClockDivider::Div2 => 2,
            ClockDivider::Div4 => 4,
            ClockDivider::Div8 => 8,
            ClockDivider::Div16 => 16,
            ClockDivider::Div32 => 32,
            ClockDivider::Div64 => 64,
        }
    }
}

bitflags::bitflags! {
    /// Up-mode programming options.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UpModeFlags: u8 {
        /// Interrupt when the counter wraps from `period` back to zero.
        const OVERFLOW_IRQ = 1 << 0;
        /// Capture/compare 0 interrupt. Unused by the pool.
        const COMPARE_IRQ = 1 << 1;
        /// Zero the counter and divider logic before starting.
        const CLEAR = 1 << 2;
        /// Start counting as part of the configuration.
        const START = 1 << 3;
    }
}

/// Repeating "count up to `period`, then reload" configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpModeConfig {
    pub clock: ClockSource,
    pub divider: ClockDivider,
    /// Counts per expiry, in divided clock ticks.
    pub period: u16,
    pub flags: UpModeFlags,
}

impl UpModeConfig {
    /// Overflow interrupt on, compare interrupt off, cleared and started.
    pub const fn repeating(clock: ClockSource, divider: ClockDivider, period: u16) -> Self {
        Self {
            clock,
            divider,
            period,
            flags: UpModeFlags::OVERFLOW_IRQ
                .union(UpModeFlags::CLEAR)
                .union(UpModeFlags::START),
        }
    }
}

/// Timer peripheral contract implemented by each chip port.
///
/// Register programming lives behind this trait; callers only name timers by
/// [`TimerId`].
pub trait TimerPeripheral {
    /// Program `id` in repeating up mode and, if requested, start it.
    fn configure_repeating(&self, id: TimerId, cfg: &UpModeConfig);

    /// Halt counting. Configuration and pending flags are left alone.
    fn stop(&self, id: TimerId);

    /// Acknowledge the latched overflow interrupt condition.
    fn clear_pending(&self, id: TimerId);
}

impl<T: TimerPeripheral + ?Sized> TimerPeripheral for &T {
    #[inline(always)]
    fn configure_repeating(&self, id: TimerId, cfg: &UpModeConfig) {
        (**self).configure_repeating(id, cfg);
    }

    #[inline(always)]
    fn stop(&self, id: TimerId) {
        (**self).stop(id);
    }

    #[inline(always)]
    fn clear_pending(&self, id: TimerId) {
        (**self).clear_pending(id);
    }
}
