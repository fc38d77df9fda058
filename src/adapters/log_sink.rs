//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let temp = t.sample.temperature.unwrap_or(f32::NAN);
                let hum = t.sample.humidity.unwrap_or(f32::NAN);
                info!(
                    "TELEM | menu={:?} | T={:.1}\u{00b0}C H={:.0}% | \
                     heat={} fan={} hum={} motor={} | run={} day={:?} | cycle={}",
                    t.state,
                    temp,
                    hum,
                    u8::from(t.outputs.heater),
                    u8::from(t.outputs.fan),
                    u8::from(t.outputs.humidifier),
                    u8::from(t.motor_on),
                    t.running,
                    t.run_day,
                    t.cycle,
                );
            }
            AppEvent::MenuChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Started { from_store } => {
                info!(
                    "START | settings={}",
                    if *from_store { "stored" } else { "defaults" }
                );
            }
            AppEvent::RunStarted { at } => info!("RUN | started at {}", at),
            AppEvent::RunStopped => info!("RUN | stopped"),
            AppEvent::RunResumed { at } => info!("RUN | resumed after power loss at {}", at),
            AppEvent::ConfigSaved { bytes } => info!("STORE | saved ({} bytes written)", bytes),
            AppEvent::SaveFailed => warn!("STORE | save failed"),
            AppEvent::ActuatorChanged { actuator, on } => {
                info!("OUT | {:?} {}", actuator, if *on { "ON" } else { "OFF" });
            }
            AppEvent::RotationStarted { day } => info!("TURN | pulse start, day {}", day),
            AppEvent::RotationFinished => info!("TURN | pulse end"),
            AppEvent::ProgramComplete => info!("TURN | program complete"),
        }
    }
}
