//! Scheduled event model.
//!
//! Exactly two event kinds exist: a start (run the pump at a speed for a
//! duration) and a stop. Dispatch is a plain match in the scheduler engine;
//! there is no open extensibility here.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::core::types::Speed;

/// A scheduled pump event, fired when its `event_time` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramEvent {
    /// Turn the pump on at `speed`; a matching stop is armed `duration`
    /// after the moment this fires.
    Start {
        event_time: DateTime<Utc>,
        duration: Duration,
        speed: Speed,
    },
    /// Turn the pump off and ask the store for the next program.
    Stop { event_time: DateTime<Utc> },
}

impl ProgramEvent {
    /// A start event firing immediately, used for manual overrides.
    pub fn start_now(duration: Duration, speed: Speed) -> Self {
        Self::Start {
            event_time: Utc::now(),
            duration,
            speed,
        }
    }

    /// A stop event firing immediately, used for manual overrides.
    pub fn stop_now() -> Self {
        Self::Stop {
            event_time: Utc::now(),
        }
    }

    /// The instant at which this event fires.
    pub fn event_time(&self) -> DateTime<Utc> {
        match self {
            Self::Start { event_time, .. } | Self::Stop { event_time } => *event_time,
        }
    }

    /// Whether this event's fire time has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.event_time() <= now
    }
}

impl fmt::Display for ProgramEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start {
                event_time,
                duration,
                speed,
            } => write!(
                f,
                "start at {event_time} (speed {speed}, {}s)",
                duration.num_seconds()
            ),
            Self::Stop { event_time } => write!(f, "stop at {event_time}"),
        }
    }
}
