//! Incubation configuration and fixed control constants.
//!
//! [`IncubatorConfig`] is the record the operator edits from the menu and
//! the settings store persists.  Everything that is *not* operator-tunable
//! (loop timing, hysteresis margins, menu step sizes) lives in the
//! [`timing`] and [`limits`] modules as compile-time constants.

use serde::{Deserialize, Serialize};

/// Operator-tunable incubation parameters.
///
/// `temp_min <= temp_max` and `hum_min <= hum_max` are the intended
/// relationships, but nothing enforces them: the menu lets either bound be
/// pushed past the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncubatorConfig {
    // --- Temperature band ---
    /// Lower temperature setpoint (°C).
    pub temp_min: f32,
    /// Upper temperature setpoint (°C).
    pub temp_max: f32,

    // --- Humidity band ---
    /// Lower relative-humidity setpoint (%RH).
    pub hum_min: f32,
    /// Upper relative-humidity setpoint (%RH).
    pub hum_max: f32,

    // --- Egg turning ---
    /// Hours between two turning pulses (>= 1).
    pub rotation_interval_hours: u8,
    /// Length of the turning program in days (12–30).
    pub rotation_program_days: u8,

    // --- Run ---
    /// Whether an incubation run is in progress.
    pub incubation_running: bool,
}

impl Default for IncubatorConfig {
    fn default() -> Self {
        Self {
            // Chicken eggs: 37.5 °C ± 0.5
            temp_min: 36.5,
            temp_max: 37.5,

            hum_min: 45.0,
            hum_max: 55.0,

            rotation_interval_hours: 2,
            rotation_program_days: 18, // turning stops three days before hatch

            incubation_running: false,
        }
    }
}

/// Control-loop timing.
pub mod timing {
    /// Pause at the end of every control cycle (ms).
    pub const CYCLE_DELAY_MS: u32 = 100;
    /// A raw button level must hold this long before it is accepted (ms).
    pub const DEBOUNCE_MS: u32 = 50;
    /// How long the turning motor is driven per rotation (ms).
    pub const MOTOR_PULSE_MS: u32 = 2000;
    /// A telemetry event is emitted every this many cycles (≈ 5 s).
    pub const TELEMETRY_EVERY_CYCLES: u32 = 50;
}

/// Regulation margins and menu bounds.
pub mod limits {
    /// Temperature dead band around `[temp_min, temp_max]` (°C).
    pub const TEMP_HYSTERESIS_C: f32 = 0.8;
    /// Humidity dead band around `[hum_min, hum_max]` (%RH).
    pub const HUM_HYSTERESIS_PCT: f32 = 3.0;

    /// Menu step for temperature setpoints (°C).
    pub const TEMP_STEP_C: f32 = 0.1;
    /// Menu step for humidity setpoints (%RH).
    pub const HUM_STEP_PCT: f32 = 1.0;

    /// Smallest accepted turning interval (h).
    pub const MIN_ROTATION_HOURS: u8 = 1;
    /// Turning program bounds (days).
    pub const MIN_PROGRAM_DAYS: u8 = 12;
    pub const MAX_PROGRAM_DAYS: u8 = 30;
}
