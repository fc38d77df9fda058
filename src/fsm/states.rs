//! Concrete adjust handlers and the menu table builder.
//!
//! Each state row carries plain `fn` pointers for Up and Down and two
//! [`Transition`] values for Left and Right.  No closures, no heap.
//!
//! ```text
//!  HOME ─▶ T MIN ─▶ T MAX ─▶ H MIN ─▶ H MAX ─▶ ROT HOURS ─▶ ROT DAYS ─▶ START/STOP
//!   ▲        │ ◀──────┘ ◀──────┘ ◀───────┘ ◀────────┘ ◀──────────┘         │
//!   │     [Left: save]                                                  [Left: save]
//!   └────────┴─────────────────────────────────────────────────────────────┘
//! ```

use super::context::MenuContext;
use super::{MenuState, StateDescriptor, Transition};
use crate::config::limits::{
    HUM_STEP_PCT, MAX_PROGRAM_DAYS, MIN_PROGRAM_DAYS, MIN_ROTATION_HOURS, TEMP_STEP_C,
};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static menu table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; MenuState::COUNT] {
    use MenuState::*;
    use Transition::{Goto, SaveAndGoto, Stay};

    [
        // Index 0: Home (read-only dashboard)
        StateDescriptor {
            id: Home,
            name: "Home",
            on_up: None,
            on_down: None,
            on_left: Stay,
            on_right: Goto(SetTempMin),
        },
        // Index 1: first settings page, Left leaves the menu
        StateDescriptor {
            id: SetTempMin,
            name: "SetTempMin",
            on_up: Some(temp_min_up),
            on_down: Some(temp_min_down),
            on_left: SaveAndGoto(Home),
            on_right: Goto(SetTempMax),
        },
        // Index 2
        StateDescriptor {
            id: SetTempMax,
            name: "SetTempMax",
            on_up: Some(temp_max_up),
            on_down: Some(temp_max_down),
            on_left: Goto(SetTempMin),
            on_right: Goto(SetHumMin),
        },
        // Index 3
        StateDescriptor {
            id: SetHumMin,
            name: "SetHumMin",
            on_up: Some(hum_min_up),
            on_down: Some(hum_min_down),
            on_left: Goto(SetTempMax),
            on_right: Goto(SetHumMax),
        },
        // Index 4
        StateDescriptor {
            id: SetHumMax,
            name: "SetHumMax",
            on_up: Some(hum_max_up),
            on_down: Some(hum_max_down),
            on_left: Goto(SetHumMin),
            on_right: Goto(SetRotationHours),
        },
        // Index 5
        StateDescriptor {
            id: SetRotationHours,
            name: "SetRotationHours",
            on_up: Some(rotation_hours_up),
            on_down: Some(rotation_hours_down),
            on_left: Goto(SetHumMax),
            on_right: Goto(SetRotationDays),
        },
        // Index 6
        StateDescriptor {
            id: SetRotationDays,
            name: "SetRotationDays",
            on_up: Some(rotation_days_up),
            on_down: Some(rotation_days_down),
            on_left: Goto(SetRotationHours),
            on_right: Goto(StartStop),
        },
        // Index 7: last page, Right is a dead end
        StateDescriptor {
            id: StartStop,
            name: "StartStop",
            on_up: Some(toggle_run),
            on_down: Some(toggle_run),
            on_left: SaveAndGoto(Home),
            on_right: Stay,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Temperature band
// ═══════════════════════════════════════════════════════════════════════════

// No bounds: min may be pushed past max and vice versa.

fn temp_min_up(ctx: &mut MenuContext) {
    ctx.config.temp_min += TEMP_STEP_C;
    debug!("temp_min = {:.1}", ctx.config.temp_min);
}

fn temp_min_down(ctx: &mut MenuContext) {
    ctx.config.temp_min -= TEMP_STEP_C;
    debug!("temp_min = {:.1}", ctx.config.temp_min);
}

fn temp_max_up(ctx: &mut MenuContext) {
    ctx.config.temp_max += TEMP_STEP_C;
    debug!("temp_max = {:.1}", ctx.config.temp_max);
}

fn temp_max_down(ctx: &mut MenuContext) {
    ctx.config.temp_max -= TEMP_STEP_C;
    debug!("temp_max = {:.1}", ctx.config.temp_max);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Humidity band
// ═══════════════════════════════════════════════════════════════════════════

fn hum_min_up(ctx: &mut MenuContext) {
    ctx.config.hum_min += HUM_STEP_PCT;
    debug!("hum_min = {:.0}", ctx.config.hum_min);
}

fn hum_min_down(ctx: &mut MenuContext) {
    ctx.config.hum_min -= HUM_STEP_PCT;
    debug!("hum_min = {:.0}", ctx.config.hum_min);
}

fn hum_max_up(ctx: &mut MenuContext) {
    ctx.config.hum_max += HUM_STEP_PCT;
    debug!("hum_max = {:.0}", ctx.config.hum_max);
}

fn hum_max_down(ctx: &mut MenuContext) {
    ctx.config.hum_max -= HUM_STEP_PCT;
    debug!("hum_max = {:.0}", ctx.config.hum_max);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Turning program
// ═══════════════════════════════════════════════════════════════════════════

fn rotation_hours_up(ctx: &mut MenuContext) {
    let c = &mut ctx.config;
    c.rotation_interval_hours = c.rotation_interval_hours.saturating_add(1);
    debug!("rotation_interval_hours = {}", c.rotation_interval_hours);
}

fn rotation_hours_down(ctx: &mut MenuContext) {
    let c = &mut ctx.config;
    if c.rotation_interval_hours > MIN_ROTATION_HOURS {
        c.rotation_interval_hours -= 1;
    }
    debug!("rotation_interval_hours = {}", c.rotation_interval_hours);
}

fn rotation_days_up(ctx: &mut MenuContext) {
    let c = &mut ctx.config;
    if c.rotation_program_days < MAX_PROGRAM_DAYS {
        c.rotation_program_days += 1;
    }
    c.rotation_program_days = c.rotation_program_days.clamp(MIN_PROGRAM_DAYS, MAX_PROGRAM_DAYS);
    debug!("rotation_program_days = {}", c.rotation_program_days);
}

fn rotation_days_down(ctx: &mut MenuContext) {
    let c = &mut ctx.config;
    if c.rotation_program_days > MIN_PROGRAM_DAYS {
        c.rotation_program_days -= 1;
    }
    c.rotation_program_days = c.rotation_program_days.clamp(MIN_PROGRAM_DAYS, MAX_PROGRAM_DAYS);
    debug!("rotation_program_days = {}", c.rotation_program_days);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Start / stop
// ═══════════════════════════════════════════════════════════════════════════

fn toggle_run(ctx: &mut MenuContext) {
    let running = !ctx.run.running;
    ctx.set_running(running);
    info!("Incubation {}", if running { "started" } else { "stopped" });
}
