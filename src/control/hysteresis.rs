//! Bang-bang climate regulation with hysteresis.
//!
//! ```text
//!              temp_min − 0.8        temp_min … temp_max        temp_max + 0.8
//!  ─────────────────┼──────────────────────────────────────────────────┼──────────▶ °C
//!    heater ON      │                   hold (latch)                   │   fan ON
//!    fan OFF        │                                                  │   heater OFF
//! ```
//!
//! Humidity works the same way with a 3 %RH margin and a single output.
//! An undefined reading leaves that axis's outputs untouched.

use crate::config::IncubatorConfig;
use crate::config::limits::{HUM_HYSTERESIS_PCT, TEMP_HYSTERESIS_C};
use crate::sensors::ClimateSample;

/// Commanded state of the three climate outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClimateOutputs {
    pub heater: bool,
    pub fan: bool,
    pub humidifier: bool,
}

/// Compute the next output state from one sample.
///
/// Pure function: inside the dead band every output keeps its `previous`
/// value, so an output only changes when a threshold is crossed.
pub fn regulate(
    sample: &ClimateSample,
    config: &IncubatorConfig,
    previous: ClimateOutputs,
) -> ClimateOutputs {
    let mut out = previous;

    if let Some(t) = sample.temperature.filter(|t| t.is_finite()) {
        if t < config.temp_min - TEMP_HYSTERESIS_C {
            out.heater = true;
            out.fan = false;
        } else if t > config.temp_max + TEMP_HYSTERESIS_C {
            out.heater = false;
            out.fan = true;
        }
    }

    if let Some(h) = sample.humidity.filter(|h| h.is_finite()) {
        if h < config.hum_min - HUM_HYSTERESIS_PCT {
            out.humidifier = true;
        } else if h > config.hum_max + HUM_HYSTERESIS_PCT {
            out.humidifier = false;
        }
    }

    out
}

/// Stateful wrapper that remembers the last commanded outputs.
#[derive(Debug, Default)]
pub struct ClimateRegulator {
    outputs: ClimateOutputs,
}

impl ClimateRegulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; returns the new outputs.
    pub fn update(&mut self, sample: &ClimateSample, config: &IncubatorConfig) -> ClimateOutputs {
        self.outputs = regulate(sample, config, self.outputs);
        self.outputs
    }

    pub fn outputs(&self) -> ClimateOutputs {
        self.outputs
    }
}
