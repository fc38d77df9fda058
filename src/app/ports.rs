//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ IncubatorService (domain)
//! ```
//!
//! Driven adapters (buttons, sensor, actuators, clock, display, storage,
//! event sinks) implement these traits.  The
//! [`IncubatorService`](super::service::IncubatorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use chrono::NaiveDateTime;

use crate::error::{ClockError, DisplayError, StorageError};
use crate::sensors::ClimateSample;

use super::commands::Button;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: button lines → domain)
// ───────────────────────────────────────────────────────────────

/// Raw, undebounced access to the four button lines.
pub trait InputPort {
    /// Current electrical level of `button`'s line: `true` = high.
    /// Buttons are pulled up, so a pressed button reads `false`.
    fn read_level(&mut self, button: Button) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Climate sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the temperature/humidity sensor.
pub trait ClimateSensorPort {
    /// Take one reading.  Failures are reported as undefined axes.
    fn read_climate(&mut self) -> ClimateSample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the four binary outputs.  Active-high, no PWM.
pub trait ActuatorPort {
    fn set_heater(&mut self, on: bool);
    fn set_fan(&mut self, on: bool);
    fn set_humidifier(&mut self, on: bool);
    fn set_motor(&mut self, on: bool);

    /// Drive every output low.
    fn all_off(&mut self) {
        self.set_heater(false);
        self.set_fan(false);
        self.set_humidifier(false);
        self.set_motor(false);
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Time sources: a wrapping millisecond counter and the wall clock.
pub trait ClockPort {
    /// Milliseconds since boot, wrapping at `u32::MAX`.
    fn uptime_ms(&self) -> u32;

    /// Current wall-clock time from the battery-backed RTC.
    fn now(&mut self) -> Result<NaiveDateTime, ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Positional character output.  Write-only.
pub trait DisplayPort {
    /// Blank the whole screen.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write `text` starting at (`col`, `row`).  Characters past the right
    /// edge are dropped.
    fn write_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Byte store port (driven adapter: domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable persistent storage, durable across power cycles.
///
/// No atomicity is provided: a power loss between two `write_byte` calls
/// leaves a partially updated record.
pub trait ByteStorePort {
    /// Capacity in bytes.
    fn capacity(&self) -> usize;

    fn read_byte(&self, addr: usize) -> Result<u8, StorageError>;

    /// Physically write one byte.
    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), StorageError>;

    /// Make buffered writes durable.  Backends that write through do nothing.
    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
