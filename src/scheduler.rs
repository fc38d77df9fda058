//! Egg-turning scheduler.
//!
//! Fires one motor pulse every `rotation_interval_hours` while a run is
//! active, until `rotation_program_days` whole days have elapsed since the
//! run started.  Missed windows are not caught up: after a long gap exactly
//! one pulse fires and the window restarts from that moment.
//!
//! ```text
//!  run start            +h               +2h                    +N days
//!  ────┼─────────────────┼─────────────────┼─────── ··· ──────────┼──────────▶
//!      last               pulse             pulse                  turning stops
//!                         ├─ 2000 ms ─┤                            (run stays on)
//! ```
//!
//! The pulse itself is a deferred action: [`RotationScheduler::tick`]
//! switches the motor on and records the millisecond timestamp, then turns
//! it off on the first tick at or after [`MOTOR_PULSE_MS`].  The control
//! loop never blocks for the pulse.

use chrono::{Duration, NaiveDateTime, Timelike};
use log::info;

use crate::config::IncubatorConfig;
use crate::config::timing::MOTOR_PULSE_MS;
use crate::fsm::context::RunState;

// ═══════════════════════════════════════════════════════════════
//  Pure scheduling rule
// ═══════════════════════════════════════════════════════════════

/// Decide whether a rotation is due.
///
/// Returns `(fire, last_actuation)`.  `last_actuation` is advanced to `now`
/// only when `fire` is true.
pub fn maybe_rotate(
    now: NaiveDateTime,
    run: &RunState,
    config: &IncubatorConfig,
    last_actuation: NaiveDateTime,
) -> (bool, NaiveDateTime) {
    if !run.running {
        return (false, last_actuation);
    }
    if program_complete(now, run, config) {
        return (false, last_actuation);
    }

    let interval = Duration::hours(i64::from(config.rotation_interval_hours));
    if now - last_actuation >= interval {
        (true, now)
    } else {
        (false, last_actuation)
    }
}

/// Whether the turning program of an active run has run its course.
pub fn program_complete(now: NaiveDateTime, run: &RunState, config: &IncubatorConfig) -> bool {
    run.elapsed_days(now) >= i64::from(config.rotation_program_days)
}

// ═══════════════════════════════════════════════════════════════
//  Stateful scheduler
// ═══════════════════════════════════════════════════════════════

/// What a scheduler tick asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    /// Switch the motor on.  `day` is the run day the pulse belongs to.
    PulseStarted { day: i64 },
    /// The pulse has lasted its full length; switch the motor off.
    PulseFinished,
    /// The turning program ended.  Reported once per run.
    ProgramComplete,
}

/// Rotation timer plus the in-flight pulse.
#[derive(Debug)]
pub struct RotationScheduler {
    last_actuation: NaiveDateTime,
    /// `uptime_ms` at which the current pulse began.
    pulse_started_ms: Option<u32>,
    program_complete_reported: bool,
}

impl RotationScheduler {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            last_actuation: now,
            pulse_started_ms: None,
            program_complete_reported: false,
        }
    }

    /// Restart the interval window at `now`.  Called when a run starts or
    /// resumes, so the first pulse comes one full interval later.
    pub fn rebase(&mut self, now: NaiveDateTime) {
        self.last_actuation = now;
        self.program_complete_reported = false;
    }

    /// Advance the scheduler by one control cycle.
    ///
    /// A pending pulse is always completed, even if the run was stopped
    /// in the meantime.  No new pulse starts while one is in flight.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        uptime_ms: u32,
        run: &RunState,
        config: &IncubatorConfig,
    ) -> Option<RotationEvent> {
        if let Some(started) = self.pulse_started_ms {
            if uptime_ms.wrapping_sub(started) >= MOTOR_PULSE_MS {
                self.pulse_started_ms = None;
                return Some(RotationEvent::PulseFinished);
            }
            return None;
        }

        if !run.running {
            return None;
        }

        if program_complete(now, run, config) {
            if self.program_complete_reported {
                return None;
            }
            self.program_complete_reported = true;
            info!(
                "Turning program complete after {} days",
                config.rotation_program_days
            );
            return Some(RotationEvent::ProgramComplete);
        }

        let (fire, last) = maybe_rotate(now, run, config, self.last_actuation);
        self.last_actuation = last;
        if !fire {
            return None;
        }

        let day = run.elapsed_days(now);
        self.pulse_started_ms = Some(uptime_ms);
        info!(
            "Egg turn on day {} at {:02}:{:02}",
            day,
            now.hour(),
            now.minute()
        );
        Some(RotationEvent::PulseStarted { day })
    }

    /// Whether a pulse is in flight.
    pub fn motor_active(&self) -> bool {
        self.pulse_started_ms.is_some()
    }

    pub fn last_actuation(&self) -> NaiveDateTime {
        self.last_actuation
    }
}
