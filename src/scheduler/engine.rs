//! Scheduler engine.
//!
//! The engine owns two slots: the most recently invoked event and at most
//! one pending event, both behind a single lock. A background loop polls
//! the wall clock every tick and fires the pending event once its time has
//! been reached; firing a start arms the matching stop, and firing a stop
//! asks the store for the next program. HTTP handlers call the public
//! operations concurrently; everything is serialized by the same lock, so
//! hardware commands are issued in the same total order as state
//! transitions.
//!
//! The polling design fires up to one tick interval late, never early.
//! Overrides replace the pending event without forcing an immediate
//! invoke, so an already-due override also waits for the next tick.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::event::ProgramEvent;
use crate::core::program::TIME_FORMAT;
use crate::hardware::{DriverError, PumpDriver};
use crate::storage::{ProgramStore, StoreError};

/// Default wall-clock polling interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// An event was armed while another was still pending. This is a logic
    /// bug in the caller, not a recoverable runtime condition: the pending
    /// slot must be cleared first.
    #[error("cannot schedule an event while one is already pending")]
    SchedulingConflict,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Hardware driver error.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
}

/// The two event slots. Only ever touched while the scheduler lock is held.
#[derive(Debug, Default)]
struct Slots {
    /// Most recently invoked event, if any event has fired yet.
    current: Option<ProgramEvent>,
    /// At most one scheduled-but-not-yet-fired event.
    pending: Option<ProgramEvent>,
}

/// Read-only projection of the scheduler state for the status API.
///
/// `start`/`end` are HH:MM:SS strings, empty when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PumpStatus {
    pub speed: u32,
    pub start: String,
    pub end: String,
}

/// The scheduler core.
///
/// Constructed once at startup and shared behind an [`Arc`]; the API layer
/// and the background loop both go through the same instance.
pub struct Scheduler<S: ProgramStore> {
    slots: Mutex<Slots>,
    store: Arc<S>,
    driver: Arc<dyn PumpDriver>,
    tick_interval: Duration,
}

impl<S: ProgramStore + 'static> Scheduler<S> {
    /// Create a scheduler over the given store and pump driver.
    pub fn new(store: Arc<S>, driver: Arc<dyn PumpDriver>) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            store,
            driver,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Set the polling interval. Tick granularity bounds scheduling
    /// precision: events fire up to one interval late.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Arm `event` as the pending event. The lock must already be held.
    ///
    /// Fails fast if something is already pending; callers that mean to
    /// replace the pending event must clear it explicitly (`override`).
    fn arm(slots: &mut Slots, event: ProgramEvent) -> Result<(), SchedulerError> {
        if slots.pending.is_some() {
            return Err(SchedulerError::SchedulingConflict);
        }
        tracing::info!(%event, "scheduled event");
        slots.pending = Some(event);
        Ok(())
    }

    /// Invoke a fired event. The lock must already be held; `invoke` only
    /// uses lock-free helpers, re-acquiring the lock here would deadlock.
    ///
    /// The hardware command result is folded in last so that a failing
    /// driver cannot leave the schedule un-armed: the follow-up event is
    /// armed regardless, and the error is reported to the caller.
    async fn invoke(&self, slots: &mut Slots, event: ProgramEvent) -> Result<(), SchedulerError> {
        tracing::info!(%event, "invoking event");
        match event {
            ProgramEvent::Start {
                event_time,
                duration,
                speed,
            } => {
                slots.current = Some(ProgramEvent::Start {
                    event_time,
                    duration,
                    speed,
                });
                let hw = self.driver.set_speed(speed);
                Self::arm(
                    slots,
                    ProgramEvent::Stop {
                        event_time: Utc::now() + duration,
                    },
                )?;
                hw?;
                Ok(())
            }
            ProgramEvent::Stop { event_time } => {
                slots.current = Some(ProgramEvent::Stop { event_time });
                let hw = self.driver.set_speed(0);
                if let Some(next) = self.store.next_start_event(Utc::now()).await? {
                    Self::arm(slots, next)?;
                }
                hw?;
                Ok(())
            }
        }
    }

    /// Schedule `event` as the pending event.
    ///
    /// Fails with [`SchedulerError::SchedulingConflict`] if an event is
    /// already pending.
    pub async fn schedule(&self, event: ProgramEvent) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock().await;
        Self::arm(&mut slots, event)
    }

    /// Replace whatever is pending with `event`.
    ///
    /// The discarded pending event is never invoked, even if its time had
    /// already elapsed. The override itself is promoted by the next tick;
    /// `current_event` is not touched here.
    pub async fn override_event(&self, event: ProgramEvent) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock().await;
        if let Some(discarded) = slots.pending.take() {
            tracing::info!(%discarded, "override discarded pending event");
        }
        Self::arm(&mut slots, event)
    }

    /// Fill the pending slot from the store if it is empty.
    ///
    /// Called at boot and after program mutations so an idle scheduler
    /// picks up store changes immediately instead of waiting for the next
    /// natural fire. An already-armed pending event is left untouched.
    pub async fn update_next_event(&self) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock().await;
        if slots.pending.is_some() {
            return Ok(());
        }
        if let Some(next) = self.store.next_start_event(Utc::now()).await? {
            Self::arm(&mut slots, next)?;
        }
        Ok(())
    }

    /// Current running/idle state, for the status API.
    pub async fn current_status(&self) -> PumpStatus {
        let slots = self.slots.lock().await;

        let pending_start = slots
            .pending
            .as_ref()
            .map(|e| e.event_time().format(TIME_FORMAT).to_string());

        match &slots.current {
            Some(ProgramEvent::Start {
                event_time,
                duration,
                speed,
            }) => PumpStatus {
                speed: *speed,
                start: event_time.format(TIME_FORMAT).to_string(),
                end: (*event_time + *duration).format(TIME_FORMAT).to_string(),
            },
            Some(ProgramEvent::Stop { event_time }) => PumpStatus {
                speed: 0,
                start: event_time.format(TIME_FORMAT).to_string(),
                end: pending_start.unwrap_or_default(),
            },
            // Idle-but-upcoming: nothing has fired yet, but the next start
            // may already be armed.
            None => PumpStatus {
                speed: 0,
                start: String::new(),
                end: pending_start.unwrap_or_default(),
            },
        }
    }

    /// One iteration of the polling loop: fire the pending event if its
    /// time has been reached.
    ///
    /// Invocation failures are logged and swallowed; the loop must keep
    /// ticking, losing at most the one event that failed.
    pub async fn tick(&self) {
        let mut slots = self.slots.lock().await;
        let now = Utc::now();
        if !slots.pending.as_ref().is_some_and(|e| e.is_due(now)) {
            return;
        }
        if let Some(event) = slots.pending.take() {
            if let Err(e) = self.invoke(&mut slots, event).await {
                tracing::error!(error = %e, "event invocation failed");
            }
        }
    }

    /// Spawn the background polling loop. Runs until process shutdown.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.tick_interval);
            loop {
                interval.tick().await;
                scheduler.tick().await;
            }
        })
    }
}
