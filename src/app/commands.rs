//! Inbound operator commands.
//!
//! The four front-panel buttons are the only command source.  The debounced
//! input layer turns raw line levels into one [`ButtonEdges`] per control
//! cycle, which the menu state machine consumes.

/// The four logical front-panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Button {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Button {
    /// Number of buttons; sizes the debouncer array.
    pub const COUNT: usize = 4;

    /// Fixed polling and dispatch order.
    pub const ALL: [Button; Button::COUNT] = [Button::Up, Button::Down, Button::Left, Button::Right];
}

/// One-shot press events detected during a single control cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEdges {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ButtonEdges {
    /// Edges with only `button` pressed.
    pub fn single(button: Button) -> Self {
        let mut edges = Self::default();
        edges.set(button, true);
        edges
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        match button {
            Button::Up => self.up = pressed,
            Button::Down => self.down = pressed,
            Button::Left => self.left = pressed,
            Button::Right => self.right = pressed,
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Left => self.left,
            Button::Right => self.right,
        }
    }

    /// Pressed buttons in dispatch order.
    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.is_pressed(*b))
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}
