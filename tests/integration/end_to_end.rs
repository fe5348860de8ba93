//! End-to-end scheduler behavior against real wall-clock time.
//!
//! Uses a short tick interval so full idle -> running -> idle cycles fit in
//! a few seconds.

use chrono::{Duration as ChronoDuration, Utc};
use poolfilter::hardware::{PumpDriver, RecordingDriver};
use poolfilter::scheduler::Scheduler;
use poolfilter::storage::{InMemoryStore, NewProgram, ProgramStore};
use std::sync::Arc;
use std::time::Duration;

use crate::common::wait_for_speed;

fn fixture(tick: Duration) -> (Arc<Scheduler<InMemoryStore>>, Arc<RecordingDriver>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    let driver = Arc::new(RecordingDriver::new());
    let scheduler = Arc::new(
        Scheduler::new(
            Arc::clone(&store),
            Arc::clone(&driver) as Arc<dyn PumpDriver>,
        )
        .with_tick_interval(tick),
    );
    (scheduler, driver, store)
}

/// A program starting shortly fires, runs for its duration, and stops,
/// leaving the next day's occurrence pending.
#[tokio::test]
async fn program_cycle_runs_and_stops() {
    let (scheduler, driver, store) = fixture(Duration::from_millis(50));

    // Start one second out, run for two seconds. Durations equal on both
    // extremes so the interpolated value is exact.
    let start = (Utc::now() + ChronoDuration::seconds(1)).time();
    store
        .add_program(NewProgram {
            speed: 4,
            start,
            summer_duration: ChronoDuration::seconds(2),
            winter_duration: ChronoDuration::seconds(2),
        })
        .await
        .unwrap();

    // Boot sequence: rebuild the schedule, then start the loop.
    scheduler.update_next_event().await.unwrap();
    let handle = scheduler.spawn();

    assert_eq!(scheduler.current_status().await.speed, 0);

    wait_for_speed(&scheduler, 4, Duration::from_secs(3)).await;
    wait_for_speed(&scheduler, 0, Duration::from_secs(4)).await;
    handle.abort();

    assert_eq!(driver.commands(), vec![4, 0]);

    // The stop re-armed the next occurrence of the program.
    let status = scheduler.current_status().await;
    assert_eq!(status.speed, 0);
    assert!(!status.end.is_empty(), "next start not pending: {status:?}");
}

/// A manual start override is promoted by the loop, and its stop fires
/// after the requested duration.
#[tokio::test]
async fn override_runs_for_requested_duration() {
    let (scheduler, driver, _) = fixture(Duration::from_millis(50));
    let handle = scheduler.spawn();

    scheduler
        .override_event(poolfilter::ProgramEvent::start_now(
            ChronoDuration::seconds(1),
            6,
        ))
        .await
        .unwrap();

    wait_for_speed(&scheduler, 6, Duration::from_secs(2)).await;
    wait_for_speed(&scheduler, 0, Duration::from_secs(3)).await;
    handle.abort();

    assert_eq!(driver.commands(), vec![6, 0]);
}

/// Overriding a pending program discards it without running the pump.
#[tokio::test]
async fn override_preempts_pending_program() {
    let (scheduler, driver, store) = fixture(Duration::from_millis(50));

    let start = (Utc::now() + ChronoDuration::seconds(1)).time();
    store
        .add_program(NewProgram {
            speed: 4,
            start,
            summer_duration: ChronoDuration::seconds(5),
            winter_duration: ChronoDuration::seconds(5),
        })
        .await
        .unwrap();
    scheduler.update_next_event().await.unwrap();

    // Replace the pending start with a stop before the loop ever runs.
    scheduler
        .override_event(poolfilter::ProgramEvent::stop_now())
        .await
        .unwrap();

    let handle = scheduler.spawn();
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.abort();

    // Only the stop reached the hardware; the discarded start never fired.
    assert_eq!(driver.commands(), vec![0]);
    let status = scheduler.current_status().await;
    assert_eq!(status.speed, 0);
}
