use core::cell::Cell;

use critical_section::Mutex;
use hal::{TimerId, TimerIrqHandler, TimerPeripheral, WakeDecision};

use crate::config::BoardLayout;
use crate::dispatch::{DispatchTable, DispatchTarget};
use crate::heartbeat::Heartbeat;
use crate::pool::{TimerCallback, TimerHandle, TimerPool};
use crate::tlogln;

/// Timer pool, heartbeat and their interrupt routing for one board.
///
/// Meant to live in a `static` and be handed to
/// [`hal::interrupt::register_handler`]:
///
/// ```ignore
/// static HW: Msp430Timers = Msp430Timers::new();
/// static TIMERS: Timers<&Msp430Timers, 5> = Timers::new(&HW, &config::MSP430FR5994);
///
/// TIMERS.init_pool();
/// hal::register_handler(&TIMERS);
///
/// loop {
///     TIMERS.service();
///     idle();
/// }
/// ```
///
/// Nothing on the expiry path logs. Events raised there are counted and
/// reported by [`Timers::service`] from normal-priority code.
pub struct Timers<P, const N: usize> {
    hw: P,
    table: DispatchTable<N>,
    pool: TimerPool<P, N>,
    heartbeat: Heartbeat<P>,
    spurious: Mutex<Cell<u32>>,
}

/// Events drained by [`Timers::service`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceReport {
    pub maintenance_due: u16,
    pub spurious: u32,
}

impl<P: Copy, const N: usize> Timers<P, N> {
    pub const fn new(hw: P, layout: &BoardLayout<N>) -> Self {
        Self {
            hw,
            table: DispatchTable::new(layout),
            pool: TimerPool::new(hw, layout.pool),
            heartbeat: Heartbeat::new(hw, layout.heartbeat),
            spurious: Mutex::new(Cell::new(0)),
        }
    }
}

impl<P: TimerPeripheral, const N: usize> Timers<P, N> {
    pub fn pool(&self) -> &TimerPool<P, N> {
        &self.pool
    }

    pub fn heartbeat(&self) -> &Heartbeat<P> {
        &self.heartbeat
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn in_use(&self) -> usize {
        self.pool.in_use()
    }

    pub fn heartbeat_ticks(&self) -> u16 {
        self.heartbeat.ticks_elapsed()
    }

    pub fn heartbeat_period(&self) -> u16 {
        self.heartbeat.period()
    }

    pub fn init_pool(&self) {
        self.pool.init();
    }

    pub fn request(&self, callback: &'static dyn TimerCallback) -> Option<TimerHandle> {
        self.pool.request(callback)
    }

    pub fn start(&self, handle: Option<&TimerHandle>, period: u16) {
        self.pool.start(handle, period);
    }

    pub fn stop(&self, handle: Option<&TimerHandle>) {
        self.pool.stop(handle);
    }

    pub fn clear_interrupt(&self, handle: Option<&TimerHandle>) {
        self.pool.clear_interrupt(handle);
    }

    pub fn free(&self, handle: Option<&TimerHandle>) {
        self.pool.free(handle);
    }

    pub fn kill(&self, handle: &mut Option<TimerHandle>) {
        self.pool.kill(handle);
    }

    pub fn start_heartbeat(&self) {
        self.heartbeat.start();
    }

    pub fn stop_heartbeat(&self) {
        self.heartbeat.stop();
    }

    pub fn set_heartbeat_period(&self, seconds: u16) {
        self.heartbeat.set_period(seconds);
    }

    /// Route a hardware expiry to its dispatch entry.
    pub fn on_expiry(&self, id: TimerId) -> WakeDecision {
        match self.table.lookup(id) {
            Some(DispatchTarget::Slot(slot)) => self.pool.on_expiry(slot),
            Some(DispatchTarget::Heartbeat) => self.heartbeat.tick(),
            None => {
                // Still acknowledge, or it refires forever.
                self.hw.clear_pending(id);
                critical_section::with(|cs| {
                    let n = self.spurious.borrow(cs);
                    n.set(n.get().saturating_add(1));
                });
                WakeDecision::Sleep
            }
        }
    }

    /// Drain and log what the expiry path recorded. Normal-priority only.
    pub fn service(&self) -> ServiceReport {
        let spurious = critical_section::with(|cs| self.spurious.borrow(cs).replace(0));
        if spurious > 0 {
            tlogln!("[timers] {} spurious expiries", spurious);
        }
        ServiceReport {
            maintenance_due: self.heartbeat.take_due(),
            spurious,
        }
    }
}

impl<P: TimerPeripheral + Sync, const N: usize> TimerIrqHandler for Timers<P, N> {
    fn on_timer_irq(&self, id: TimerId) -> WakeDecision {
        self.on_expiry(id)
    }
}
