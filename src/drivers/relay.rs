//! Relay output driver for the heater, fan, humidifier and turning motor.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives a real GPIO through `hw_init::gpio_write`.
//! On host/test: tracks state in-memory only.
//!
//! The GPIO is only touched when the commanded level changes.

use log::debug;

use crate::drivers::hw_init;

pub struct RelayDriver {
    name: &'static str,
    gpio: i32,
    on: bool,
}

impl RelayDriver {
    /// New relay, assumed off (`hw_init` drives every output low at boot).
    pub fn new(name: &'static str, gpio: i32) -> Self {
        Self {
            name,
            gpio,
            on: false,
        }
    }

    /// Command the relay.  Returns `true` if the output changed.
    pub fn set(&mut self, on: bool) -> bool {
        if on == self.on {
            return false;
        }
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
        debug!("{} relay {}", self.name, if on { "ON" } else { "OFF" });
        true
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}
