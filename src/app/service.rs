//! Application service, the hexagonal core.
//!
//! [`IncubatorService`] owns the menu state machine, the climate regulator,
//! the rotation scheduler, the button debouncers and the settings store.
//! All I/O flows through port traits injected at call sites, so the whole
//! service runs against mock adapters in tests.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────────┐ ──▶ ActuatorPort
//!  SensorPort ──▶ │       IncubatorService       │ ──▶ DisplayPort
//!   ClockPort ──▶ │ Menu · Regulator · Rotation  │ ──▶ EventSink
//!                 └──────────────┬───────────────┘
//!                                ▼
//!                         SettingsStore ─▶ ByteStorePort
//! ```

use chrono::NaiveDateTime;
use log::{debug, error, info, warn};

use crate::config::IncubatorConfig;
use crate::config::timing::TELEMETRY_EVERY_CYCLES;
use crate::control::hysteresis::{ClimateOutputs, ClimateRegulator};
use crate::display::{self, Screen};
use crate::drivers::button::ButtonPad;
use crate::error::DisplayError;
use crate::fsm::context::{MenuContext, MenuEffect, RunState};
use crate::fsm::{Menu, MenuState};
use crate::scheduler::{RotationEvent, RotationScheduler};
use crate::sensors::ClimateSample;
use crate::store::SettingsStore;

use super::events::{Actuator, AppEvent, TelemetryData};
use super::ports::{
    ActuatorPort, ByteStorePort, ClimateSensorPort, ClockPort, DisplayPort, EventSink, InputPort,
};

// ───────────────────────────────────────────────────────────────
// IncubatorService
// ───────────────────────────────────────────────────────────────

/// A run whose start time waits for the first good clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStart {
    /// Restored from the store at boot.
    Resume,
    /// Started from the menu.
    Menu,
}

// ───────────────────────────────────────────────────────────────
// Service
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct IncubatorService<S: ByteStorePort> {
    menu: Menu,
    ctx: MenuContext,
    buttons: ButtonPad,
    regulator: ClimateRegulator,
    rotation: RotationScheduler,
    store: SettingsStore<S>,
    /// Whether the boot configuration came from the store.
    from_store: bool,
    sample: ClimateSample,
    /// Climate outputs as last written to the hardware.
    applied: ClimateOutputs,
    motor_on: bool,
    /// Last frame drawn; `None` forces a full redraw.
    screen: Option<Screen>,
    /// Last successful wall-clock reading.
    last_time: Option<NaiveDateTime>,
    pending_start: Option<PendingStart>,
    cycle_count: u32,
}

impl<S: ByteStorePort> IncubatorService<S> {
    /// Construct the service, loading settings from `backend`.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(backend: S) -> Self {
        let store = SettingsStore::new(backend);
        let (config, from_store) = store.load_or_default();
        Self::with_config(store, config, from_store)
    }

    fn with_config(store: SettingsStore<S>, config: IncubatorConfig, from_store: bool) -> Self {
        Self {
            menu: Menu::standard(),
            ctx: MenuContext::new(config),
            buttons: ButtonPad::new(),
            regulator: ClimateRegulator::new(),
            rotation: RotationScheduler::new(NaiveDateTime::default()),
            store,
            from_store,
            sample: ClimateSample::UNDEFINED,
            applied: ClimateOutputs::default(),
            motor_on: false,
            screen: None,
            last_time: None,
            pending_start: None,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output low, read the clock once and resume a run that
    /// was active before power loss.
    pub fn start(&mut self, hw: &mut (impl ActuatorPort + ClockPort), sink: &mut impl EventSink) {
        hw.all_off();
        self.applied = ClimateOutputs::default();
        self.motor_on = false;

        let now = self.read_clock(hw);
        self.ctx.now = now;
        self.rotation.rebase(now);

        sink.emit(&AppEvent::Started {
            from_store: self.from_store,
        });

        if self.ctx.run.running {
            if self.last_time.is_some() {
                self.begin_run(PendingStart::Resume, now, sink);
            } else {
                warn!("RTC unreadable, run resume waits for a valid time");
                self.pending_start = Some(PendingStart::Resume);
            }
        }

        info!("IncubatorService started in {}", self.menu.current_name());
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle:
    /// buttons → sensor → regulate → rotation → menu → render.
    ///
    /// The caller sleeps for `CYCLE_DELAY_MS` between cycles.
    pub fn cycle<H>(&mut self, hw: &mut H, sink: &mut impl EventSink)
    where
        H: InputPort + ClimateSensorPort + ActuatorPort + ClockPort + DisplayPort,
    {
        self.cycle_count = self.cycle_count.wrapping_add(1);

        // 1. Time
        let uptime = hw.uptime_ms();
        self.ctx.now = self.read_clock(hw);
        if let (Some(kind), Some(now)) = (self.pending_start, self.last_time) {
            self.begin_run(kind, now, sink);
        }

        // 2. Inputs
        let edges = self.buttons.poll(hw, uptime);

        // 3. Sensor
        self.sample = hw.read_climate();

        // 4. Climate regulation
        let outputs = self.regulator.update(&self.sample, &self.ctx.config);
        self.apply_climate(hw, outputs, sink);

        // 5. Egg turning (a run without a start time does not turn yet)
        let run = if self.pending_start.is_some() {
            RunState::stopped()
        } else {
            self.ctx.run
        };
        if let Some(ev) = self
            .rotation
            .tick(self.ctx.now, uptime, &run, &self.ctx.config)
        {
            self.handle_rotation(ev, hw, sink);
        }

        // 6. Menu
        let prev_state = self.menu.current_state();
        if edges.any() {
            self.menu.handle_edges(edges, &mut self.ctx);
            self.apply_effects(sink);
        }
        let new_state = self.menu.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::MenuChanged {
                from: prev_state,
                to: new_state,
            });
        }

        // 7. Display
        self.refresh_display(hw);

        // 8. Telemetry
        if self.cycle_count % TELEMETRY_EVERY_CYCLES == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.menu.current_state(),
            sample: self.sample,
            outputs: self.applied,
            motor_on: self.motor_on,
            running: self.ctx.run.running,
            run_day: self
                .ctx
                .run
                .running
                .then(|| self.ctx.run.elapsed_days(self.ctx.now)),
            cycle: self.cycle_count,
        }
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.current_state()
    }

    pub fn config(&self) -> &IncubatorConfig {
        &self.ctx.config
    }

    pub fn run_state(&self) -> RunState {
        self.ctx.run
    }

    pub fn outputs(&self) -> ClimateOutputs {
        self.applied
    }

    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    pub fn sample(&self) -> ClimateSample {
        self.sample
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    pub fn loaded_from_store(&self) -> bool {
        self.from_store
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Wall-clock time, falling back to the last good reading.
    fn read_clock(&mut self, clock: &mut impl ClockPort) -> NaiveDateTime {
        match clock.now() {
            Ok(t) => {
                self.last_time = Some(t);
                t
            }
            Err(e) => {
                debug!("RTC read failed: {}", e);
                self.last_time.unwrap_or(self.ctx.now)
            }
        }
    }

    /// Anchor the run start and the turning window at `at`.
    fn begin_run(&mut self, kind: PendingStart, at: NaiveDateTime, sink: &mut impl EventSink) {
        self.pending_start = None;
        self.ctx.resume_run(at);
        self.rotation.rebase(at);
        match kind {
            PendingStart::Resume => {
                info!("Resuming incubation run, start re-based to {}", at);
                sink.emit(&AppEvent::RunResumed { at });
            }
            PendingStart::Menu => sink.emit(&AppEvent::RunStarted { at }),
        }
    }

    /// Write only the outputs that changed.
    fn apply_climate(
        &mut self,
        hw: &mut impl ActuatorPort,
        outputs: ClimateOutputs,
        sink: &mut impl EventSink,
    ) {
        if outputs.heater != self.applied.heater {
            hw.set_heater(outputs.heater);
            sink.emit(&AppEvent::ActuatorChanged {
                actuator: Actuator::Heater,
                on: outputs.heater,
            });
        }
        if outputs.fan != self.applied.fan {
            hw.set_fan(outputs.fan);
            sink.emit(&AppEvent::ActuatorChanged {
                actuator: Actuator::Fan,
                on: outputs.fan,
            });
        }
        if outputs.humidifier != self.applied.humidifier {
            hw.set_humidifier(outputs.humidifier);
            sink.emit(&AppEvent::ActuatorChanged {
                actuator: Actuator::Humidifier,
                on: outputs.humidifier,
            });
        }
        self.applied = outputs;
    }

    fn handle_rotation(
        &mut self,
        ev: RotationEvent,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match ev {
            RotationEvent::PulseStarted { day } => {
                self.set_motor(hw, true, sink);
                sink.emit(&AppEvent::RotationStarted { day });
            }
            RotationEvent::PulseFinished => {
                self.set_motor(hw, false, sink);
                sink.emit(&AppEvent::RotationFinished);
            }
            RotationEvent::ProgramComplete => sink.emit(&AppEvent::ProgramComplete),
        }
    }

    fn set_motor(&mut self, hw: &mut impl ActuatorPort, on: bool, sink: &mut impl EventSink) {
        if on == self.motor_on {
            return;
        }
        hw.set_motor(on);
        self.motor_on = on;
        sink.emit(&AppEvent::ActuatorChanged {
            actuator: Actuator::Motor,
            on,
        });
    }

    /// Carry out the side effects the menu requested.
    fn apply_effects(&mut self, sink: &mut impl EventSink) {
        for effect in self.ctx.take_effects() {
            match effect {
                MenuEffect::SaveConfig => match self.store.save(&self.ctx.config) {
                    Ok(bytes) => sink.emit(&AppEvent::ConfigSaved { bytes }),
                    Err(e) => {
                        error!("Settings save failed: {}", e);
                        sink.emit(&AppEvent::SaveFailed);
                    }
                },
                MenuEffect::RunStarted(at) => {
                    if self.last_time.is_some() {
                        self.begin_run(PendingStart::Menu, at, sink);
                    } else {
                        warn!("RTC unreadable, run start time deferred");
                        self.pending_start = Some(PendingStart::Menu);
                    }
                }
                MenuEffect::RunStopped => {
                    self.pending_start = None;
                    sink.emit(&AppEvent::RunStopped);
                }
            }
        }
    }

    /// Redraw after a state change, otherwise rewrite only changed rows.
    fn refresh_display(&mut self, hw: &mut impl DisplayPort) {
        let frame = display::render(
            self.menu.current_state(),
            &self.ctx,
            &self.sample,
            self.last_time,
        );

        let mut full = self.screen.is_none();
        if self.ctx.clear_requested {
            self.ctx.clear_requested = false;
            full = true;
            if let Err(e) = hw.clear() {
                warn!("Display clear failed: {}", e);
                self.screen = None;
                return;
            }
        }

        let previous = if full { None } else { self.screen.as_ref() };
        match draw(hw, &frame, previous) {
            Ok(()) => self.screen = Some(frame),
            Err(e) => {
                warn!("Display write failed: {}", e);
                self.screen = None;
            }
        }
    }
}

fn draw(
    hw: &mut impl DisplayPort,
    frame: &Screen,
    previous: Option<&Screen>,
) -> Result<(), DisplayError> {
    let rows: heapless::Vec<usize, { display::HEIGHT }> = match previous {
        Some(p) => frame.changed_rows(p).collect(),
        None => (0..display::HEIGHT).collect(),
    };
    for row in rows {
        hw.write_at(0, row as u8, frame.row(row))?;
    }
    Ok(())
}
