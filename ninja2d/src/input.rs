use std::collections::HashSet;

/// Game actions a player can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Jump,
    Dash,
}

/// Tracks which controls are held and which went down this frame.
///
/// The windowing layer maps its key events onto [`Control`]s and calls
/// [`press`](Self::press) / [`release`](Self::release); the game calls
/// [`begin_frame`](Self::begin_frame) once per tick after reading input.
#[derive(Clone, Debug, Default)]
pub struct Controls {
    held: HashSet<Control>,
    pressed: HashSet<Control>,
}

impl Controls {
    /// Create a state with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed flags.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
    }

    /// Record a key going down. Repeats while held are ignored.
    pub fn press(&mut self, control: Control) {
        if self.held.insert(control) {
            self.pressed.insert(control);
        }
    }

    /// Record a key going up.
    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    /// Currently held down.
    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    /// Went down since the last [`begin_frame`](Self::begin_frame).
    pub fn was_pressed(&self, control: Control) -> bool {
        self.pressed.contains(&control)
    }

    /// Horizontal movement intent: -1, 0 or 1. Holding both directions cancels out.
    pub fn horizontal(&self) -> f32 {
        let right = self.is_held(Control::Right) as i32 as f32;
        let left = self.is_held(Control::Left) as i32 as f32;
        right - left
    }
}
