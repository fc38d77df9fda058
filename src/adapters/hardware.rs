//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the DHT22, the relay drivers, the RTC, the display and the
//! monotonic clock, exposing them through [`InputPort`],
//! [`ClimateSensorPort`], [`ActuatorPort`], [`ClockPort`] and
//! [`DisplayPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets the GPIO and sensor drivers
//! use cfg-gated simulation stubs; the I²C peripherals are generic.

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

use crate::app::commands::Button;
use crate::app::ports::{
    ActuatorPort, ClimateSensorPort, ClockPort, DisplayPort, InputPort,
};
use crate::drivers::hw_init;
use crate::drivers::relay::RelayDriver;
use crate::drivers::rtc::Ds3231;
use crate::error::{ClockError, DisplayError};
use crate::pins;
use crate::sensors::ClimateSample;
use crate::sensors::dht22::Dht22;

use super::time::MonotonicClock;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D, C> {
    display: D,
    rtc: Ds3231<C>,
    dht: Dht22,
    heater: RelayDriver,
    fan: RelayDriver,
    humidifier: RelayDriver,
    motor: RelayDriver,
    clock: MonotonicClock,
}

impl<D: DisplayPort, C: I2c> HardwareAdapter<D, C> {
    pub fn new(display: D, rtc: Ds3231<C>, clock: MonotonicClock) -> Self {
        Self {
            display,
            rtc,
            dht: Dht22::new(pins::DHT22_GPIO),
            heater: RelayDriver::new("heater", pins::HEATER_GPIO),
            fan: RelayDriver::new("fan", pins::FAN_GPIO),
            humidifier: RelayDriver::new("humidifier", pins::HUMIDIFIER_GPIO),
            motor: RelayDriver::new("motor", pins::MOTOR_GPIO),
            clock,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Current relay states: heater, fan, humidifier, motor.
    pub fn relay_states(&self) -> [bool; 4] {
        [
            self.heater.is_on(),
            self.fan.is_on(),
            self.humidifier.is_on(),
            self.motor.is_on(),
        ]
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<D, C> InputPort for HardwareAdapter<D, C> {
    fn read_level(&mut self, button: Button) -> bool {
        hw_init::gpio_read(pins::BUTTON_GPIOS[button as usize])
    }
}

// ── ClimateSensorPort implementation ──────────────────────────

impl<D, C> ClimateSensorPort for HardwareAdapter<D, C> {
    fn read_climate(&mut self) -> ClimateSample {
        let now = self.clock.uptime_ms();
        ClimateSample::from_reading(self.dht.read(now))
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D, C> ActuatorPort for HardwareAdapter<D, C> {
    fn set_heater(&mut self, on: bool) {
        self.heater.set(on);
    }

    fn set_fan(&mut self, on: bool) {
        self.fan.set(on);
    }

    fn set_humidifier(&mut self, on: bool) {
        self.humidifier.set(on);
    }

    fn set_motor(&mut self, on: bool) {
        self.motor.set(on);
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<D, C: I2c> ClockPort for HardwareAdapter<D, C> {
    fn uptime_ms(&self) -> u32 {
        self.clock.uptime_ms()
    }

    fn now(&mut self) -> Result<NaiveDateTime, ClockError> {
        self.rtc.now()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort, C> DisplayPort for HardwareAdapter<D, C> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.display.clear()
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.display.write_at(col, row, text)
    }
}
