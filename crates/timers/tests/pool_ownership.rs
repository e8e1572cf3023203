use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use hal::fake::FakeTimers;
use hal::{TimerId, WakeDecision};
use rand::prelude::*;
use timers::{TimerCallback, TimerHandle, TimerPool};

const IDS: [TimerId; 5] = [
    TimerId(0x0340),
    TimerId(0x0380),
    TimerId(0x0400),
    TimerId(0x0440),
    TimerId(0x07c0),
];

static IDLE: fn() -> bool = || false;

fn setup() -> (&'static FakeTimers<5>, TimerPool<&'static FakeTimers<5>, 5>) {
    let hw: &'static FakeTimers<5> = Box::leak(Box::new(FakeTimers::new(IDS)));
    let pool = TimerPool::new(hw, IDS);
    pool.init();
    (hw, pool)
}

#[test]
fn capacity_plus_one_request_is_refused() {
    let (_, pool) = setup();
    let mut held = Vec::new();
    for _ in 0..pool.capacity() {
        held.push(pool.request(&IDLE).expect("slot available"));
    }
    assert!(pool.request(&IDLE).is_none());

    let mut last = held.pop();
    pool.kill(&mut last);
    assert!(pool.request(&IDLE).is_some());
}

#[test]
fn live_handles_never_share_a_slot() {
    let (_, pool) = setup();
    let mut live: Vec<Option<TimerHandle>> = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x1234_5678);

    for _ in 0..500 {
        if rng.random_range(0..3) != 0 || live.is_empty() {
            if let Some(h) = pool.request(&IDLE) {
                live.push(Some(h));
            } else {
                assert_eq!(live.len(), pool.capacity());
            }
        } else {
            let idx = rng.random_range(0..live.len());
            let mut h = live.swap_remove(idx);
            if rng.random_bool(0.5) {
                pool.kill(&mut h);
                assert!(h.is_none());
            } else {
                pool.free(h.as_ref());
            }
        }

        let slots: HashSet<usize> = live.iter().flatten().map(TimerHandle::slot).collect();
        assert_eq!(slots.len(), live.len());
        assert_eq!(pool.in_use(), live.len());
        assert!(live.iter().flatten().all(|h| pool.is_live(h)));
    }
}

#[test]
fn kill_is_idempotent() {
    let (hw, pool) = setup();
    let mut h = pool.request(&IDLE);
    pool.start(h.as_ref(), 1024);
    pool.kill(&mut h);
    pool.kill(&mut h);
    pool.kill(&mut h);
    assert!(h.is_none());
    assert_eq!(pool.in_use(), 0);
    assert_eq!(hw.state(IDS[0]).stopped, 1);
}

#[test]
fn double_free_does_not_release_next_tenant() {
    let (_, pool) = setup();
    let first = pool.request(&IDLE).unwrap();
    pool.free(Some(&first));
    let second = pool.request(&IDLE).unwrap();
    pool.free(Some(&first));
    assert!(pool.is_live(&second));
    assert_eq!(pool.in_use(), 1);
}

struct Tenant {
    calls: AtomicU32,
}

impl TimerCallback for Tenant {
    fn fire(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        true
    }
}

fn tenant() -> &'static Tenant {
    Box::leak(Box::new(Tenant {
        calls: AtomicU32::new(0),
    }))
}

#[test]
fn freed_tenant_callback_is_not_invoked_after_reuse() {
    let (hw, pool) = setup();
    let first = tenant();
    let h = pool.request(first);
    pool.start(h.as_ref(), 100);
    pool.free(h.as_ref());

    // Freed but still counting: the expiry is acknowledged, nobody is called.
    hw.raise(IDS[0]);
    assert_eq!(pool.on_expiry(0), WakeDecision::Sleep);
    assert!(!hw.state(IDS[0]).pending);

    let second = tenant();
    let h2 = pool.request(second).expect("slot reused");
    assert_eq!(h2.slot(), 0);
    assert_eq!(pool.on_expiry(0), WakeDecision::Wake);
    assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    assert_eq!(second.calls.load(Ordering::SeqCst), 1);
}
