//! Table-driven settings menu.
//!
//! Classic embedded FSM pattern: one descriptor row per state, holding the
//! Up/Down adjust handlers and the Left/Right transitions as data.
//!
//! ```text
//! ┌──────────────────┬──────────────┬──────────────┬───────────────────┬──────────────────┐
//! │ MenuState        │ on_up        │ on_down      │ on_left           │ on_right         │
//! ├──────────────────┼──────────────┼──────────────┼───────────────────┼──────────────────┤
//! │ Home             │ -            │ -            │ Stay              │ Goto(SetTempMin) │
//! │ SetTempMin       │ fn(ctx)      │ fn(ctx)      │ SaveAndGoto(Home) │ Goto(SetTempMax) │
//! │ SetTempMax       │ fn(ctx)      │ fn(ctx)      │ Goto(SetTempMin)  │ Goto(SetHumMin)  │
//! │ ...              │              │              │                   │                  │
//! │ StartStop        │ toggle       │ toggle       │ SaveAndGoto(Home) │ Stay             │
//! └──────────────────┴──────────────┴──────────────┴───────────────────┴──────────────────┘
//! ```
//!
//! The engine looks up the row for the current state and either runs the
//! adjust handler or follows the transition.  Entering any state raises
//! `ctx.clear_requested` so the renderer blanks the screen.

pub mod context;
pub mod states;

use context::{MenuContext, MenuEffect};
use log::info;

use crate::app::commands::{Button, ButtonEdges};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every menu position.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MenuState {
    Home = 0,
    SetTempMin = 1,
    SetTempMax = 2,
    SetHumMin = 3,
    SetHumMax = 4,
    SetRotationHours = 5,
    SetRotationDays = 6,
    StartStop = 7,
}

impl MenuState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 8;

    /// Convert an index back to `MenuState`.  Out-of-range indices map to
    /// `Home` (debug builds assert).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Home,
            1 => Self::SetTempMin,
            2 => Self::SetTempMax,
            3 => Self::SetHumMin,
            4 => Self::SetHumMax,
            5 => Self::SetRotationHours,
            6 => Self::SetRotationDays,
            7 => Self::StartStop,
            _ => {
                debug_assert!(false, "invalid menu index: {idx}");
                Self::Home
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Table row types
// ---------------------------------------------------------------------------

/// Adjust handler run on an Up or Down edge.
pub type AdjustFn = fn(&mut MenuContext);

/// What a Left or Right edge does in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Ignore the edge.
    Stay,
    /// Move to another state.
    Goto(MenuState),
    /// Persist the configuration, then move.
    SaveAndGoto(MenuState),
}

/// Static descriptor for one menu state.
pub struct StateDescriptor {
    pub id: MenuState,
    pub name: &'static str,
    pub on_up: Option<AdjustFn>,
    pub on_down: Option<AdjustFn>,
    pub on_left: Transition,
    pub on_right: Transition,
}

// ---------------------------------------------------------------------------
// Menu engine
// ---------------------------------------------------------------------------

/// The menu state machine.
pub struct Menu {
    /// Fixed-size table indexed by `MenuState as usize`.
    table: [StateDescriptor; MenuState::COUNT],
    current: usize,
}

impl Menu {
    pub fn new(table: [StateDescriptor; MenuState::COUNT]) -> Self {
        Self {
            table,
            current: MenuState::Home as usize,
        }
    }

    /// Menu with the standard incubator table, positioned on `Home`.
    pub fn standard() -> Self {
        Self::new(states::build_state_table())
    }

    pub fn current_state(&self) -> MenuState {
        MenuState::from_index(self.current)
    }

    /// Name of the current state, for logs.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// Dispatch one cycle's worth of edges.
    ///
    /// Edges are handled in the order Up, Down, Left, Right against the
    /// state that was current at the start of the cycle.  The first edge
    /// that changes state ends the dispatch; later edges of the same cycle
    /// are dropped.
    pub fn handle_edges(&mut self, edges: ButtonEdges, ctx: &mut MenuContext) {
        let start = self.current;
        for button in edges.pressed() {
            self.handle(button, ctx);
            if self.current != start {
                break;
            }
        }
    }

    /// Dispatch a single button edge.
    pub fn handle(&mut self, button: Button, ctx: &mut MenuContext) {
        let row = &self.table[self.current];
        match button {
            Button::Up => {
                if let Some(adjust) = row.on_up {
                    adjust(ctx);
                }
            }
            Button::Down => {
                if let Some(adjust) = row.on_down {
                    adjust(ctx);
                }
            }
            Button::Left => {
                let t = row.on_left;
                self.follow(t, ctx);
            }
            Button::Right => {
                let t = row.on_right;
                self.follow(t, ctx);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn follow(&mut self, transition: Transition, ctx: &mut MenuContext) {
        match transition {
            Transition::Stay => {}
            Transition::Goto(next) => self.transition(next, ctx),
            Transition::SaveAndGoto(next) => {
                ctx.push_effect(MenuEffect::SaveConfig);
                self.transition(next, ctx);
            }
        }
    }

    fn transition(&mut self, next: MenuState, ctx: &mut MenuContext) {
        let next_idx = next as usize;
        info!(
            "Menu: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        self.current = next_idx;
        ctx.clear_requested = true;
    }
}
