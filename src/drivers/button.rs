//! Polled button debouncing for the four front-panel keys.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  No interrupts: the main
//! loop samples every line once per control cycle and feeds the raw level
//! into one [`Debouncer`] per button.
//!
//! ## Rule
//!
//! | Condition                                         | Action                        |
//! |---------------------------------------------------|-------------------------------|
//! | raw ≠ last raw sample                             | restart the settle timer      |
//! | settled > `DEBOUNCE_MS` and raw ≠ stable level    | commit raw as the stable level|
//! | commit into the active level                      | report one press              |
//!
//! Timestamps are wrapping `u32` milliseconds.

use crate::app::commands::{Button, ButtonEdges};
use crate::app::ports::InputPort;
use crate::config::timing::DEBOUNCE_MS;

/// Debounce record for one input line.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    /// Last committed level.
    stable_level: bool,
    /// Level seen on the previous poll.
    last_raw: bool,
    /// When `last_raw` last changed.
    last_change_ms: u32,
    /// Level that means "pressed".
    active_level: bool,
}

impl Debouncer {
    /// Debouncer for a pulled-up, active-low line, starting released.
    pub const fn active_low() -> Self {
        Self {
            stable_level: true,
            last_raw: true,
            last_change_ms: 0,
            active_level: false,
        }
    }

    /// Feed one raw sample.  Returns `true` exactly once per press, on the
    /// cycle the press is committed.
    pub fn poll(&mut self, raw_level: bool, now_ms: u32) -> bool {
        if raw_level != self.last_raw {
            self.last_change_ms = now_ms;
            self.last_raw = raw_level;
        }

        if now_ms.wrapping_sub(self.last_change_ms) > DEBOUNCE_MS && raw_level != self.stable_level
        {
            self.stable_level = raw_level;
            return raw_level == self.active_level;
        }

        false
    }

    /// Whether the committed level is the active one.
    pub fn is_held(&self) -> bool {
        self.stable_level == self.active_level
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::active_low()
    }
}

/// The four debouncers, polled in [`Button::ALL`] order.
#[derive(Debug, Default)]
pub struct ButtonPad {
    keys: [Debouncer; Button::COUNT],
}

impl ButtonPad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every line once and return this cycle's press edges.
    pub fn poll(&mut self, input: &mut impl InputPort, now_ms: u32) -> ButtonEdges {
        let mut edges = ButtonEdges::default();
        for button in Button::ALL {
            let raw = input.read_level(button);
            if self.keys[button as usize].poll(raw, now_ms) {
                edges.set(button, true);
            }
        }
        edges
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.keys[button as usize].is_held()
    }
}
