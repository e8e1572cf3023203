//! Dedicated ~1 Hz maintenance timer.
//!
//! Counts base ticks and asks for a wake once every `period` ticks. Runs on
//! its own hardware timer, outside the pool.
//!
//! The tick runs in interrupt context and never logs; it only counts due
//! periods, which normal-priority code collects with [`Heartbeat::take_due`].

use core::cell::Cell;

use critical_section::Mutex;
use hal::{TimerId, TimerPeripheral, UpModeConfig, WakeDecision};

use crate::config::{DEFAULT_HEARTBEAT_PERIOD_SECS, HEARTBEAT_TICK_COUNTS, TIMER_CLOCK, TIMER_DIVIDER};
use crate::tlogln;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Counters {
    ticks_elapsed: u16,
    period_seconds: u16,
    due: u16,
}

pub struct Heartbeat<P> {
    hw: P,
    id: TimerId,
    counters: Mutex<Cell<Counters>>,
}

impl<P> Heartbeat<P> {
    pub const fn new(hw: P, id: TimerId) -> Self {
        Self {
            hw,
            id,
            counters: Mutex::new(Cell::new(Counters {
                ticks_elapsed: 0,
                period_seconds: DEFAULT_HEARTBEAT_PERIOD_SECS,
                due: 0,
            })),
        }
    }

    pub const fn timer_id(&self) -> TimerId {
        self.id
    }

    pub fn ticks_elapsed(&self) -> u16 {
        critical_section::with(|cs| self.counters.borrow(cs).get().ticks_elapsed)
    }

    pub fn period(&self) -> u16 {
        critical_section::with(|cs| self.counters.borrow(cs).get().period_seconds)
    }

    /// New threshold, compared from the next tick on. The running count is
    /// kept. Not range checked.
    pub fn set_period(&self, seconds: u16) {
        critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            cell.set(Counters {
                period_seconds: seconds,
                ..cell.get()
            });
        });
    }

    /// Drain the maintenance periods that elapsed since the last call.
    ///
    /// Normal-priority only: this is where a due period gets logged.
    pub fn take_due(&self) -> u16 {
        let due = critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            let c = cell.get();
            cell.set(Counters { due: 0, ..c });
            c.due
        });
        if due > 0 {
            tlogln!("[heartbeat] maintenance due (x{})", due);
        }
        due
    }
}

impl<P: TimerPeripheral> Heartbeat<P> {
    pub fn start(&self) {
        let cfg = UpModeConfig::repeating(TIMER_CLOCK, TIMER_DIVIDER, HEARTBEAT_TICK_COUNTS);
        self.hw.configure_repeating(self.id, &cfg);
        self.hw.clear_pending(self.id);
    }

    pub fn stop(&self) {
        self.hw.stop(self.id);
    }

    /// Base tick handler, called from the heartbeat timer's interrupt.
    pub fn tick(&self) -> WakeDecision {
        self.hw.clear_pending(self.id);

        let due = critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            let mut c = cell.get();
            c.ticks_elapsed = c.ticks_elapsed.saturating_add(1);
            let due = c.ticks_elapsed >= c.period_seconds;
            if due {
                c.ticks_elapsed = 0;
                c.due = c.due.saturating_add(1);
            }
            cell.set(c);
            due
        });
        WakeDecision::from_bool(due)
    }
}
