use super::*;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn counting_timer(initial: u32) -> (CountdownTimer, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let timer = CountdownTimer::spawn(initial, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (timer, fired)
}

#[tokio::test(start_paused = true)]
async fn counts_down_one_second_at_a_time() {
    let (timer, fired) = counting_timer(3);
    let mut ticks = timer.subscribe();
    assert_eq!(timer.seconds_left(), 3);

    ticks.changed().await.expect("first tick");
    assert_eq!(timer.seconds_left(), 2);

    ticks.changed().await.expect("second tick");
    assert_eq!(timer.seconds_left(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn completion_fires_once_then_restarts_from_initial() {
    let (timer, fired) = counting_timer(5);
    let mut ticks = timer.subscribe();

    for _ in 0..5 {
        ticks.changed().await.expect("tick");
    }

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(timer.seconds_left(), 5);
    assert_eq!(timer.formatted_time(), "0:05");
}

#[tokio::test(start_paused = true)]
async fn repeats_after_every_full_cycle() {
    let (timer, fired) = counting_timer(2);
    let mut ticks = timer.subscribe();

    for _ in 0..6 {
        ticks.changed().await.expect("tick");
    }

    assert_eq!(fired.load(Ordering::SeqCst), 3);
    assert_eq!(timer.seconds_left(), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_rearms_without_firing_completion() {
    let (timer, fired) = counting_timer(10);
    let mut ticks = timer.subscribe();

    for _ in 0..3 {
        ticks.changed().await.expect("tick");
    }
    assert_eq!(timer.seconds_left(), 7);

    timer.reset();
    ticks.changed().await.expect("reset publish");

    assert_eq!(timer.seconds_left(), 10);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_timer_stops_the_tick_task() {
    let (timer, _fired) = counting_timer(30);
    let mut ticks = timer.subscribe();
    ticks.changed().await.expect("tick before drop");

    drop(timer);

    assert!(ticks.changed().await.is_err(), "publisher should be gone");
}

#[tokio::test]
async fn starts_at_the_initial_value() {
    let (timer, fired) = counting_timer(90);
    assert_eq!(timer.seconds_left(), 90);
    assert_eq!(timer.formatted_time(), "1:30");
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn format_clock_pads_seconds_and_leaves_minutes_unbounded() {
    assert_eq!(format_clock(0), "0:00");
    assert_eq!(format_clock(5), "0:05");
    assert_eq!(format_clock(65), "1:05");
    assert_eq!(format_clock(600), "10:00");
    assert_eq!(format_clock(3600), "60:00");
    assert_eq!(format_clock(1800), "30:00");
}
