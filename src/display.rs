//! Screen rendering for the 20×4 character display.
//!
//! [`render`] turns the menu position and live data into four fixed-width
//! rows.  Every row is padded to the full width so a shorter value always
//! overwrites the stale characters of a longer one.
//!
//! ```text
//!  Home                       SetTempMin (and the other settings pages)
//!  ┌────────────────────┐     ┌────────────────────┐
//!  │T:37.2C   H: 52%    │     │Set Temp Min        │
//!  │Min 36.5C  Max 37.5C│     │> 36.5 C            │
//!  │Turn 2h  for 18d    │     │                    │
//!  │RUN day 3      14:05│     │UP/DN adj  L/R move │
//!  └────────────────────┘     └────────────────────┘
//! ```

use core::fmt::Write;

use chrono::{NaiveDateTime, Timelike};
use heapless::String;

use crate::fsm::MenuState;
use crate::fsm::context::MenuContext;
use crate::sensors::ClimateSample;

pub const WIDTH: usize = 20;
pub const HEIGHT: usize = 4;

/// One rendered row, always exactly [`WIDTH`] ASCII characters.
pub type Row = String<WIDTH>;

/// A full frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    rows: [Row; HEIGHT],
}

impl Screen {
    /// All rows blank.
    pub fn blank() -> Self {
        Self {
            rows: core::array::from_fn(|_| fit("")),
        }
    }

    pub fn row(&self, idx: usize) -> &str {
        self.rows[idx].as_str()
    }

    pub fn rows(&self) -> &[Row; HEIGHT] {
        &self.rows
    }

    /// Indices of rows that differ from `previous`.
    pub fn changed_rows<'a>(&'a self, previous: &'a Screen) -> impl Iterator<Item = usize> + 'a {
        (0..HEIGHT).filter(move |&i| self.rows[i] != previous.rows[i])
    }
}

/// Render the screen for `state`.
///
/// `now` is the last good wall-clock reading; `None` shows `--:--`.
pub fn render(
    state: MenuState,
    ctx: &MenuContext,
    sample: &ClimateSample,
    now: Option<NaiveDateTime>,
) -> Screen {
    let c = &ctx.config;
    let rows = match state {
        MenuState::Home => [
            line(format_args!(
                "T:{}C   H:{}%",
                Reading(sample.temperature, 1),
                Reading(sample.humidity, 0)
            )),
            line(format_args!("Min {:.1}C  Max {:.1}C", c.temp_min, c.temp_max)),
            line(format_args!(
                "Turn {}h  for {}d",
                c.rotation_interval_hours, c.rotation_program_days
            )),
            status_line(ctx, now),
        ],
        MenuState::SetTempMin => setting("Set Temp Min", format_args!("> {:.1} C", c.temp_min)),
        MenuState::SetTempMax => setting("Set Temp Max", format_args!("> {:.1} C", c.temp_max)),
        MenuState::SetHumMin => setting("Set Humidity Min", format_args!("> {:.0} %", c.hum_min)),
        MenuState::SetHumMax => setting("Set Humidity Max", format_args!("> {:.0} %", c.hum_max)),
        MenuState::SetRotationHours => setting(
            "Turn Every",
            format_args!("> {} hours", c.rotation_interval_hours),
        ),
        MenuState::SetRotationDays => setting(
            "Turning Program",
            format_args!("> {} days", c.rotation_program_days),
        ),
        MenuState::StartStop => [
            fit("Incubation"),
            line(format_args!(
                "> {}",
                if ctx.run.running { "RUNNING" } else { "STOPPED" }
            )),
            fit(""),
            fit("UP/DN toggle  L:save"),
        ],
    };
    Screen { rows }
}

fn setting(label: &str, value: core::fmt::Arguments<'_>) -> [Row; HEIGHT] {
    [fit(label), line(value), fit(""), fit("UP/DN adj  L/R move")]
}

fn status_line(ctx: &MenuContext, now: Option<NaiveDateTime>) -> Row {
    let mut status: String<16> = String::new();
    if ctx.run.running {
        let day = now.map_or(0, |n| ctx.run.elapsed_days(n).max(0));
        let _ = write!(status, "RUN day {}", day);
    } else {
        let _ = status.push_str("STOPPED");
    }
    match now {
        Some(t) => line(format_args!("{:<15}{:02}:{:02}", status.as_str(), t.hour(), t.minute())),
        None => line(format_args!("{:<15}--:--", status.as_str())),
    }
}

/// A sensor value with fixed decimals, or dashes when undefined.
struct Reading(Option<f32>, usize);

impl core::fmt::Display for Reading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.0, self.1) {
            (Some(v), 0) => write!(f, "{:>3.0}", v),
            (Some(v), p) => write!(f, "{:>4.*}", p, v),
            (None, 0) => f.write_str(" --"),
            (None, _) => f.write_str("--.-"),
        }
    }
}

/// Format into a row, truncating or space-padding to [`WIDTH`].
fn line(args: core::fmt::Arguments<'_>) -> Row {
    let mut buf: String<32> = String::new();
    // Overflow only loses characters past the row end.
    let _ = buf.write_fmt(args);
    fit(buf.as_str())
}

fn fit(text: &str) -> Row {
    let mut row = Row::new();
    for ch in text.chars().filter(char::is_ascii).take(WIDTH) {
        let _ = row.push(ch);
    }
    while row.len() < WIDTH {
        let _ = row.push(' ');
    }
    row
}
