use core::cell::Cell;

use critical_section::Mutex;

use crate::time::TimerId;

/// What the idle-mode controller should do once the handler returns.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeDecision {
    /// Leave low-power mode on interrupt exit.
    Wake,
    /// Return to whatever mode was interrupted.
    Sleep,
}

impl WakeDecision {
    #[inline(always)]
    pub const fn from_bool(wake: bool) -> Self {
        if wake {
            WakeDecision::Wake
        } else {
            WakeDecision::Sleep
        }
    }

    #[inline(always)]
    pub const fn is_wake(self) -> bool {
        matches!(self, WakeDecision::Wake)
    }
}

pub trait TimerIrqHandler: Sync {
    fn on_timer_irq(&self, id: TimerId) -> WakeDecision;
}

static HANDLER: Mutex<Cell<Option<&'static dyn TimerIrqHandler>>> = Mutex::new(Cell::new(None));

pub fn register_handler(h: &'static dyn TimerIrqHandler) {
    critical_section::with(|cs| HANDLER.borrow(cs).set(Some(h)));
}

/// Entry point for the chip's timer vectors.
///
/// With no handler registered the interrupt is left unacknowledged and the
/// core stays asleep.
#[inline(always)]
pub fn dispatch(id: TimerId) -> WakeDecision {
    let handler = critical_section::with(|cs| HANDLER.borrow(cs).get());
    match handler {
        Some(h) => h.on_timer_irq(id),
        None => WakeDecision::Sleep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WakeOn(TimerId);

    impl TimerIrqHandler for WakeOn {
        fn on_timer_irq(&self, id: TimerId) -> WakeDecision {
            WakeDecision::from_bool(id == self.0)
        }
    }

    static WAKE_ON_7: WakeOn = WakeOn(TimerId(7));

    #[test]
    fn routes_to_registered_handler() {
        register_handler(&WAKE_ON_7);
        assert_eq!(dispatch(TimerId(7)), WakeDecision::Wake);
        assert_eq!(dispatch(TimerId(8)), WakeDecision::Sleep);
    }

    #[test]
    fn decision_from_bool() {
        assert!(WakeDecision::from_bool(true).is_wake());
        assert!(!WakeDecision::from_bool(false).is_wake());
    }
}
