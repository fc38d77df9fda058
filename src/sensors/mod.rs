//! Sensor subsystem: the climate sensor driver and the per-cycle sample.
//!
//! The regulator never sees a driver error: a failed read becomes a
//! [`ClimateSample`] with both axes undefined, which the regulator treats
//! as "no new information" for that cycle.

pub mod dht22;

use crate::error::SensorError;

/// Temperature and humidity as read during one control cycle.
///
/// `None` marks an undefined reading.  It must never be treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateSample {
    /// Chamber temperature (°C).
    pub temperature: Option<f32>,
    /// Chamber relative humidity (%RH).
    pub humidity: Option<f32>,
}

impl ClimateSample {
    /// Both axes undefined.
    pub const UNDEFINED: Self = Self {
        temperature: None,
        humidity: None,
    };

    /// Build a sample from raw readings, mapping NaN / infinity to `None`.
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature: temperature.is_finite().then_some(temperature),
            humidity: humidity.is_finite().then_some(humidity),
        }
    }

    /// Build a sample from a driver result; any error yields [`Self::UNDEFINED`].
    pub fn from_reading(reading: Result<(f32, f32), SensorError>) -> Self {
        match reading {
            Ok((t, h)) => Self::new(t, h),
            Err(e) => {
                log::debug!("climate read failed: {}", e);
                Self::UNDEFINED
            }
        }
    }
}
