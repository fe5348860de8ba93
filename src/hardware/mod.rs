//! Pump hardware drivers.
//!
//! The scheduler issues speed commands through the [`PumpDriver`] trait.
//! Calls are synchronous and assumed fast; they happen while the scheduler
//! lock is held so that hardware commands stay in the same total order as
//! state transitions.

use std::sync::Mutex;
use thiserror::Error;

use crate::core::types::Speed;

/// Errors raised by a pump driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The underlying GPIO device could not be opened or driven.
    #[error("gpio error: {0}")]
    Gpio(String),
}

/// Sets the physical pump speed. Fire-and-forget: implementations must not
/// block for longer than a trivial syscall.
pub trait PumpDriver: Send + Sync {
    /// Command the pump to run at `speed`. Zero turns the pump off.
    fn set_speed(&self, speed: Speed) -> Result<(), DriverError>;
}

/// Driver that only logs commands. Default when no GPIO hardware is present.
#[derive(Debug, Default)]
pub struct TracingDriver;

impl PumpDriver for TracingDriver {
    fn set_speed(&self, speed: Speed) -> Result<(), DriverError> {
        tracing::info!(speed, "pump speed command");
        Ok(())
    }
}

/// Test driver that records every commanded speed in order.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    commands: Mutex<Vec<Speed>>,
}

impl RecordingDriver {
    /// Create an empty recording driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Speeds commanded so far, in command order.
    pub fn commands(&self) -> Vec<Speed> {
        self.commands.lock().expect("driver lock poisoned").clone()
    }
}

impl PumpDriver for RecordingDriver {
    fn set_speed(&self, speed: Speed) -> Result<(), DriverError> {
        self.commands
            .lock()
            .expect("driver lock poisoned")
            .push(speed);
        Ok(())
    }
}

#[cfg(feature = "gpio")]
pub use gpio::GpioDriver;

#[cfg(feature = "gpio")]
mod gpio {
    use std::sync::Mutex;

    use rppal::gpio::{Gpio, OutputPin};

    use super::{DriverError, PumpDriver};
    use crate::core::types::Speed;

    /// Relay driver for a Raspberry Pi output pin. The relay only knows
    /// on/off, so any positive speed drives the pin high.
    pub struct GpioDriver {
        pin: Mutex<OutputPin>,
    }

    impl GpioDriver {
        /// Open the given BCM pin as an output, initially low.
        pub fn new(bcm_pin: u8) -> Result<Self, DriverError> {
            let gpio = Gpio::new().map_err(|e| DriverError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(bcm_pin)
                .map_err(|e| DriverError::Gpio(e.to_string()))?
                .into_output();
            pin.set_low();
            Ok(Self {
                pin: Mutex::new(pin),
            })
        }
    }

    impl PumpDriver for GpioDriver {
        fn set_speed(&self, speed: Speed) -> Result<(), DriverError> {
            let mut pin = self
                .pin
                .lock()
                .map_err(|_| DriverError::Gpio("pin lock poisoned".to_string()))?;
            if speed > 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
            tracing::info!(speed, "pump speed command");
            Ok(())
        }
    }
}
