//! Outbound application events.
//!
//! The [`IncubatorService`](super::service::IncubatorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use chrono::NaiveDateTime;

use crate::control::hysteresis::ClimateOutputs;
use crate::fsm::MenuState;
use crate::sensors::ClimateSample;

/// The four binary outputs, for change reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Heater,
    Fan,
    Humidifier,
    Motor,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.  `from_store` tells whether the settings
    /// came from persistent storage or are defaults.
    Started { from_store: bool },

    /// The menu moved between states.
    MenuChanged { from: MenuState, to: MenuState },

    /// An incubation run was started from the menu.
    RunStarted { at: NaiveDateTime },

    /// The active run was stopped from the menu.
    RunStopped,

    /// A run persisted as active was resumed at boot.
    RunResumed { at: NaiveDateTime },

    /// The configuration was written; `bytes` physically changed.
    ConfigSaved { bytes: usize },

    /// The configuration could not be written.
    SaveFailed,

    /// One output changed state.
    ActuatorChanged { actuator: Actuator, on: bool },

    /// An egg-turning pulse started.
    RotationStarted { day: i64 },

    /// The turning pulse ended.
    RotationFinished,

    /// The turning program has run its course.  Emitted once per run.
    ProgramComplete,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub state: MenuState,
    pub sample: ClimateSample,
    pub outputs: ClimateOutputs,
    pub motor_on: bool,
    pub running: bool,
    /// Whole days since the run started; `None` when stopped.
    pub run_day: Option<i64>,
    pub cycle: u32,
}
