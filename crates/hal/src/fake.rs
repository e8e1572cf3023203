use core::cell::RefCell;

use critical_section::Mutex;

use crate::time::{TimerId, TimerPeripheral, UpModeConfig, UpModeFlags};

/// Observable state of one fake timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FakeTimerState {
    pub configured: u32,
    pub stopped: u32,
    pub cleared: u32,
    pub running: bool,
    pub pending: bool,
    pub last_config: Option<UpModeConfig>,
}

impl FakeTimerState {
    const IDLE: FakeTimerState = FakeTimerState {
        configured: 0,
        stopped: 0,
        cleared: 0,
        running: false,
        pending: false,
        last_config: None,
    };
}

/// Counting peripheral used by host-side tests.
///
/// Operations on ids it was not built with are recorded in `unknown_ops`.
pub struct FakeTimers<const N: usize> {
    ids: [TimerId; N],
    state: Mutex<RefCell<([FakeTimerState; N], u32)>>,
}

impl<const N: usize> FakeTimers<N> {
    pub const fn new(ids: [TimerId; N]) -> Self {
        Self {
            ids,
            state: Mutex::new(RefCell::new(([FakeTimerState::IDLE; N], 0))),
        }
    }

    pub fn state(&self, id: TimerId) -> FakeTimerState {
        match self.index(id) {
            Some(i) => critical_section::with(|cs| self.state.borrow_ref(cs).0[i]),
            None => FakeTimerState::IDLE,
        }
    }

    pub fn unknown_ops(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).1)
    }

    /// Latch an overflow condition, as the hardware would on expiry.
    pub fn raise(&self, id: TimerId) {
        self.with_timer(id, |t| t.pending = true);
    }

    fn index(&self, id: TimerId) -> Option<usize> {
        self.ids.iter().position(|&known| known == id)
    }

    fn with_timer(&self, id: TimerId, f: impl FnOnce(&mut FakeTimerState)) {
        let idx = self.index(id);
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            match idx {
                Some(i) => f(&mut state.0[i]),
                None => state.1 += 1,
            }
        });
    }
}

impl<const N: usize> TimerPeripheral for FakeTimers<N> {
    fn configure_repeating(&self, id: TimerId, cfg: &UpModeConfig) {
        self.with_timer(id, |t| {
            t.configured += 1;
            t.last_config = Some(*cfg);
            if cfg.flags.contains(UpModeFlags::START) {
                t.running = true;
            }
        });
    }

    fn stop(&self, id: TimerId) {
        self.with_timer(id, |t| {
            t.stopped += 1;
            t.running = false;
        });
    }

    fn clear_pending(&self, id: TimerId) {
        self.with_timer(id, |t| {
            t.cleared += 1;
            t.pending = false;
        });
    }
}
