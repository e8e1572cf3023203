use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

static LOGGER: Mutex<Cell<Option<&'static dyn LogSink>>> = Mutex::new(Cell::new(None));

/// Output for `tlog!`. Only called from normal-priority code; the timer
/// expiry path never logs.
pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

pub fn set_logger(l: &'static dyn LogSink) {
    critical_section::with(|cs| LOGGER.borrow(cs).set(Some(l)));
}

pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;

    struct Adapter(&'static dyn LogSink);
    impl Write for Adapter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.write_str(s);
            Ok(())
        }
    }

    // Sink is copied out so formatting runs with interrupts enabled.
    if let Some(l) = critical_section::with(|cs| LOGGER.borrow(cs).get()) {
        let _ = Adapter(l).write_fmt(args);
    }
}

#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {
        $crate::log::_print(core::format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! tlogln {
    () => {
        $crate::tlog!("\n")
    };
    ($($arg:tt)*) => {
        $crate::tlog!("{}\n", core::format_args!($($arg)*))
    };
}
