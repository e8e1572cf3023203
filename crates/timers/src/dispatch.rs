use hal::TimerId;

use crate::config::BoardLayout;

/// Where an expiry for a given hardware timer is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchTarget {
    Slot(usize),
    Heartbeat,
}

/// Fixed mapping from hardware timer to dispatch entry.
///
/// Built once from the board layout and never reassigned, so a vector can be
/// resolved without touching pool state.
#[derive(Clone, Copy, Debug)]
pub struct DispatchTable<const N: usize> {
    slots: [TimerId; N],
    heartbeat: TimerId,
}

impl<const N: usize> DispatchTable<N> {
    /// Panics if two entries share a hardware timer, since one of them could
    /// never be reached. In a `static` initializer this fails the build.
    pub const fn new(layout: &BoardLayout<N>) -> Self {
        let mut i = 0;
        while i < N {
            assert!(
                layout.pool[i].0 != layout.heartbeat.0,
                "heartbeat timer is also a pool timer"
            );
            let mut j = i + 1;
            while j < N {
                assert!(layout.pool[i].0 != layout.pool[j].0, "pool timer listed twice");
                j += 1;
            }
            i += 1;
        }
        Self {
            slots: layout.pool,
            heartbeat: layout.heartbeat,
        }
    }

    pub fn lookup(&self, id: TimerId) -> Option<DispatchTarget> {
        if id == self.heartbeat {
            return Some(DispatchTarget::Heartbeat);
        }
        self.slots
            .iter()
            .position(|&s| s == id)
            .map(DispatchTarget::Slot)
    }

    pub fn entries(&self) -> impl Iterator<Item = (TimerId, DispatchTarget)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, DispatchTarget::Slot(i)))
            .chain(core::iter::once((self.heartbeat, DispatchTarget::Heartbeat)))
    }
}
