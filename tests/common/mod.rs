//! Common test utilities shared across integration tests.

use poolfilter::scheduler::Scheduler;
use poolfilter::storage::ProgramStore;
use std::time::Duration;

/// Wait for the scheduler's reported speed to reach `expected`, polling the
/// status projection.
///
/// More reliable than fixed sleeps since tick timing can vary. Polls every
/// 10ms and panics after `timeout`.
pub async fn wait_for_speed<S: ProgramStore + 'static>(
    scheduler: &Scheduler<S>,
    expected: u32,
    timeout: Duration,
) {
    let start = tokio::time::Instant::now();
    loop {
        let status = scheduler.current_status().await;
        if status.speed == expected {
            return;
        }
        if start.elapsed() > timeout {
            panic!(
                "Timeout waiting for speed {}, current status: {:?}",
                expected, status
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
