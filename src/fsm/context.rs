//! Shared mutable context threaded through every menu handler.
//!
//! `MenuContext` is the single struct that menu handlers read from and
//! write to: the live configuration, the run state, the current wall-clock
//! time and the side effects a handler requests (persist, run started,
//! run stopped).  The service drains the effects after each dispatch.

use chrono::NaiveDateTime;
use log::warn;

use crate::config::IncubatorConfig;

/// At most one effect per button edge, four edges per cycle.
pub const MAX_EFFECTS: usize = 4;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Whether an incubation run is active and when it started.
///
/// `start_time` is only meaningful while `running` is set; it is captured
/// on every false → true transition and left untouched on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub running: bool,
    pub start_time: NaiveDateTime,
}

impl RunState {
    pub fn stopped() -> Self {
        Self {
            running: false,
            start_time: NaiveDateTime::default(),
        }
    }

    /// Whole days since the run started.  Negative if the clock was set back.
    pub fn elapsed_days(&self, now: NaiveDateTime) -> i64 {
        (now - self.start_time).num_days()
    }
}

// ---------------------------------------------------------------------------
// Side effects
// ---------------------------------------------------------------------------

/// Work a handler asks the service to perform after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEffect {
    /// Persist the current configuration.
    SaveConfig,
    /// A run was started at the given time.
    RunStarted(NaiveDateTime),
    /// The active run was stopped.
    RunStopped,
}

// ---------------------------------------------------------------------------
// MenuContext
// ---------------------------------------------------------------------------

/// The shared context passed to every menu handler.
pub struct MenuContext {
    /// Configuration being edited.  Persisted only on explicit save.
    pub config: IncubatorConfig,
    /// Run flag and start time.
    pub run: RunState,
    /// Wall-clock time of the current control cycle.
    pub now: NaiveDateTime,
    /// Effects requested during the current dispatch.
    pub effects: heapless::Vec<MenuEffect, MAX_EFFECTS>,
    /// Set whenever a state is entered; the renderer blanks the screen.
    pub clear_requested: bool,
}

impl MenuContext {
    /// Create a context from a loaded configuration.  A persisted running
    /// flag is carried over; its start time is unknown until
    /// [`resume_run`](Self::resume_run) re-bases it.
    pub fn new(config: IncubatorConfig) -> Self {
        Self {
            config,
            run: RunState {
                running: config.incubation_running,
                start_time: NaiveDateTime::default(),
            },
            now: NaiveDateTime::default(),
            effects: heapless::Vec::new(),
            clear_requested: true,
        }
    }

    /// Flip the run flag, recording the start time on false → true.
    pub fn set_running(&mut self, running: bool) {
        let was = self.run.running;
        self.run.running = running;
        self.config.incubation_running = running;

        if running && !was {
            self.run.start_time = self.now;
            self.push_effect(MenuEffect::RunStarted(self.now));
        } else if was && !running {
            self.push_effect(MenuEffect::RunStopped);
        }
    }

    /// Anchor the run's start time at `now`.  Used for runs restored from
    /// storage and for runs started before the clock was readable.
    pub fn resume_run(&mut self, now: NaiveDateTime) {
        self.now = now;
        self.run.start_time = now;
    }

    pub fn push_effect(&mut self, effect: MenuEffect) {
        if self.effects.push(effect).is_err() {
            warn!("menu effect queue full, dropping {:?}", effect);
        }
    }

    /// Drain the effects requested since the last call.
    pub fn take_effects(&mut self) -> heapless::Vec<MenuEffect, MAX_EFFECTS> {
        core::mem::take(&mut self.effects)
    }
}
