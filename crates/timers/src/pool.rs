//! Fixed pool of hardware timers handed out to application code.
//!
//! Slots are owned exclusively through a [`TimerHandle`]. A slot is in use
//! exactly while it holds a callback, and every `free` or `init` moves the
//! slot to a new generation so handles from an earlier tenancy stop matching.
//!
//! All slot state sits behind a `critical_section::Mutex`. Ownership changes
//! (`request`, `free`, `kill`, `init`) must only be made from normal-priority
//! code; the expiry path only reads the callback.

use core::cell::RefCell;

use critical_section::Mutex;
use hal::{TimerId, TimerPeripheral, UpModeConfig, WakeDecision};

use crate::config::{TIMER_CLOCK, TIMER_DIVIDER};
use crate::tlogln;

/// Work run from interrupt context when a pooled timer expires.
///
/// Must be short and must not touch pool ownership. Return `true` to bring
/// the core out of low-power mode.
pub trait TimerCallback: Sync {
    fn fire(&self) -> bool;
}

impl<F> TimerCallback for F
where
    F: Fn() -> bool + Sync,
{
    #[inline(always)]
    fn fire(&self) -> bool {
        self()
    }
}

/// Exclusive claim on one pool slot, returned by [`TimerPool::request`].
///
/// Not `Clone`: there is exactly one owner. Give it back with
/// [`TimerPool::kill`].
#[must_use = "a dropped handle keeps its slot owned until the pool is re-initialized"]
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle {
    slot: usize,
    id: TimerId,
    generation: u32,
}

impl TimerHandle {
    pub const fn slot(&self) -> usize {
        self.slot
    }

    pub const fn id(&self) -> TimerId {
        self.id
    }
}

#[derive(Clone, Copy)]
struct Slot {
    id: TimerId,
    callback: Option<&'static dyn TimerCallback>,
    generation: u32,
}

impl Slot {
    const UNASSIGNED: Slot = Slot {
        id: TimerId(0),
        callback: None,
        generation: 0,
    };

    fn is_held_by(&self, h: &TimerHandle) -> bool {
        self.callback.is_some() && self.generation == h.generation && self.id == h.id
    }

    fn release(&mut self) {
        self.callback = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

struct PoolState<const N: usize> {
    slots: [Slot; N],
    initialized: bool,
}

pub struct TimerPool<P, const N: usize> {
    hw: P,
    ids: [TimerId; N],
    state: Mutex<RefCell<PoolState<N>>>,
}

impl<P, const N: usize> TimerPool<P, N> {
    /// `ids` lists the backing hardware timers in allocation order.
    pub const fn new(hw: P, ids: [TimerId; N]) -> Self {
        Self {
            hw,
            ids,
            state: Mutex::new(RefCell::new(PoolState {
                slots: [Slot::UNASSIGNED; N],
                initialized: false,
            })),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hardware timer bound to `slot`, fixed for the life of the pool.
    pub fn timer_id(&self, slot: usize) -> Option<TimerId> {
        self.ids.get(slot).copied()
    }
}

impl<P: TimerPeripheral, const N: usize> TimerPool<P, N> {
    /// Reset every slot to unowned and bind it to its hardware timer.
    ///
    /// Re-running is allowed; handles issued before it become stale.
    pub fn init(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            for (slot, &id) in state.slots.iter_mut().zip(self.ids.iter()) {
                slot.id = id;
                slot.release();
            }
            state.initialized = true;
        });
        tlogln!("[timers] pool init: {} slots", N);
    }

    /// Claim the lowest free slot. `None` when every slot is owned.
    pub fn request(&self, callback: &'static dyn TimerCallback) -> Option<TimerHandle> {
        let handle = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if !state.initialized {
                return None;
            }
            let (slot, entry) = state
                .slots
                .iter_mut()
                .enumerate()
                .find(|(_, s)| s.callback.is_none())?;
            entry.callback = Some(callback);
            Some(TimerHandle {
                slot,
                id: entry.id,
                generation: entry.generation,
            })
        });
        if handle.is_none() {
            tlogln!("[timers] request refused: no free slot");
        }
        handle
    }

    /// Run the handle's timer in repeating up mode, expiring every `period`
    /// counts (~1024 counts per second).
    pub fn start(&self, handle: Option<&TimerHandle>, period: u16) {
        let Some(id) = self.live_id(handle) else {
            return;
        };
        let cfg = UpModeConfig::repeating(TIMER_CLOCK, TIMER_DIVIDER, period);
        self.hw.configure_repeating(id, &cfg);
        self.hw.clear_pending(id);
    }

    /// Halt counting. The slot stays owned.
    pub fn stop(&self, handle: Option<&TimerHandle>) {
        if let Some(id) = self.live_id(handle) {
            self.hw.stop(id);
        }
    }

    /// Clear the latched expiry flag. The running count is not restarted.
    pub fn clear_interrupt(&self, handle: Option<&TimerHandle>) {
        if let Some(id) = self.live_id(handle) {
            self.hw.clear_pending(id);
        }
    }

    /// Return the slot to the pool without touching the hardware, which may
    /// still be counting.
    pub fn free(&self, handle: Option<&TimerHandle>) {
        let Some(h) = handle else {
            return;
        };
        let released = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            match state.slots.get_mut(h.slot) {
                Some(slot) if slot.is_held_by(h) => {
                    slot.release();
                    true
                }
                _ => false,
            }
        });
        if !released {
            tlogln!("[timers] ignoring stale handle for slot {}", h.slot);
        }
    }

    /// Stop, free, and null out the caller's handle.
    pub fn kill(&self, handle: &mut Option<TimerHandle>) {
        let Some(h) = handle.take() else {
            return;
        };
        self.stop(Some(&h));
        self.free(Some(&h));
        tlogln!("[timers] killed slot {}", h.slot);
    }

    /// Whether `handle` still owns its slot.
    pub fn is_live(&self, handle: &TimerHandle) -> bool {
        self.live_id(Some(handle)).is_some()
    }

    pub fn in_use(&self) -> usize {
        critical_section::with(|cs| {
            self.state
                .borrow_ref(cs)
                .slots
                .iter()
                .filter(|s| s.callback.is_some())
                .count()
        })
    }

    /// Expiry entry for `slot`, called from the timer interrupt.
    ///
    /// The hardware flag is acknowledged unconditionally, then the slot's
    /// callback (if any) decides whether to wake.
    pub fn on_expiry(&self, slot: usize) -> WakeDecision {
        let Some(id) = self.timer_id(slot) else {
            return WakeDecision::Sleep;
        };
        self.hw.clear_pending(id);

        let callback = critical_section::with(|cs| self.state.borrow_ref(cs).slots[slot].callback);
        match callback {
            Some(cb) => WakeDecision::from_bool(cb.fire()),
            None => WakeDecision::Sleep,
        }
    }

    fn live_id(&self, handle: Option<&TimerHandle>) -> Option<TimerId> {
        let h = handle?;
        let live = critical_section::with(|cs| {
            self.state
                .borrow_ref(cs)
                .slots
                .get(h.slot)
                .is_some_and(|s| s.is_held_by(h))
        });
        if live {
            Some(h.id)
        } else {
            tlogln!("[timers] ignoring stale handle for slot {}", h.slot);
            None
        }
    }
}
