use hal::fake::FakeTimers;
use hal::{TimerId, WakeDecision};
use timers::Heartbeat;
use timers::config::{DEFAULT_HEARTBEAT_PERIOD_SECS, MSP430FR5994};

fn ticks_until_wake(hb: &Heartbeat<&FakeTimers<1>>, limit: u32) -> Option<u32> {
    (1..=limit).find(|_| hb.tick() == WakeDecision::Wake)
}

#[test]
fn period_three_counts_one_two_zero() {
    let hw = FakeTimers::new([MSP430FR5994.heartbeat]);
    let hb = Heartbeat::new(&hw, MSP430FR5994.heartbeat);
    hb.set_period(3);

    let mut counts = Vec::new();
    let mut wakes = Vec::new();
    for _ in 0..3 {
        wakes.push(hb.tick().is_wake());
        counts.push(hb.ticks_elapsed());
    }
    assert_eq!(counts, [1, 2, 0]);
    assert_eq!(wakes, [false, false, true]);
}

#[test]
fn default_period_wakes_after_five_minutes() {
    let hw = FakeTimers::new([MSP430FR5994.heartbeat]);
    let hb = Heartbeat::new(&hw, MSP430FR5994.heartbeat);
    assert_eq!(
        ticks_until_wake(&hb, 1000),
        Some(DEFAULT_HEARTBEAT_PERIOD_SECS as u32)
    );
    assert_eq!(hb.ticks_elapsed(), 0);
}

#[test]
fn repeats_every_period() {
    let hw = FakeTimers::new([TimerId(7)]);
    let hb = Heartbeat::new(&hw, TimerId(7));
    hb.set_period(4);
    assert_eq!(ticks_until_wake(&hb, 10), Some(4));
    assert_eq!(ticks_until_wake(&hb, 10), Some(4));
    assert_eq!(hw.state(TimerId(7)).cleared, 8);
}

#[test]
fn set_period_does_not_reset_count() {
    let hw = FakeTimers::new([TimerId(7)]);
    let hb = Heartbeat::new(&hw, TimerId(7));
    hb.set_period(60);
    for _ in 0..5 {
        let _ = hb.tick();
    }
    hb.set_period(8);
    assert_eq!(hb.ticks_elapsed(), 5);
    assert_eq!(ticks_until_wake(&hb, 10), Some(3));
}
