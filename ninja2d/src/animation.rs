//! Frame-counted animation clips and per-entity playback state.
//!
//! The core never touches images: a clip only knows how many frames it has
//! and how many ticks each frame is shown for. The renderer turns
//! [`Animation::frame_index`] into an actual image.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Animation actions an entity can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Idle,
    Run,
    Jump,
    Slide,
    WallSlide,
}

impl Action {
    /// Name used in clip keys such as `"player/run"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Run => "run",
            Action::Jump => "jump",
            Action::Slide => "slide",
            Action::WallSlide => "wall_slide",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sequence of `frames` images, each shown for `frame_duration` ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub frames: u32,
    pub frame_duration: u32,
    pub looping: bool,
}

impl Animation {
    /// Create a looping clip.
    pub fn new(frames: u32, frame_duration: u32) -> Self {
        Self {
            frames,
            frame_duration,
            looping: true,
        }
    }

    #[must_use]
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Total ticks for one pass through the clip.
    pub fn length(&self) -> u32 {
        self.frames.saturating_mul(self.frame_duration.max(1))
    }

    /// Image index shown at `tick`. Looping clips wrap, others hold the last frame.
    pub fn frame_index(&self, tick: u32) -> usize {
        let length = self.length();
        if length == 0 {
            return 0;
        }
        let tick = if self.looping {
            tick % length
        } else {
            tick.min(length - 1)
        };
        (tick / self.frame_duration.max(1)) as usize
    }

    /// True once a non-looping clip has reached its last frame.
    pub fn is_done(&self, tick: u32) -> bool {
        !self.looping && tick >= self.length().saturating_sub(1)
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

/// Current action of an entity and how long it has been playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    action: Action,
    tick: u32,
}

impl AnimationState {
    /// Start playing `action` from its first frame.
    pub fn new(action: Action) -> Self {
        Self { action, tick: 0 }
    }

    /// Action currently playing.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Ticks since the current action started.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Switch to `action`, restarting playback only if it actually changed.
    pub fn set_action(&mut self, action: Action) {
        if action != self.action {
            self.action = action;
            self.tick = 0;
        }
    }

    /// Advance playback by one tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(Action::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looping_clip_wraps() {
        let clip = Animation::new(4, 6);
        assert_eq!(clip.frame_index(0), 0);
        assert_eq!(clip.frame_index(5), 0);
        assert_eq!(clip.frame_index(6), 1);
        assert_eq!(clip.frame_index(23), 3);
        assert_eq!(clip.frame_index(24), 0);
        assert!(!clip.is_done(1000));
    }

    #[test]
    fn one_shot_clip_holds_last_frame() {
        let clip = Animation::new(3, 2).once();
        assert_eq!(clip.frame_index(100), 2);
        assert!(!clip.is_done(4));
        assert!(clip.is_done(5));
    }

    #[test]
    fn set_action_restarts_only_on_change() {
        let mut state = AnimationState::new(Action::Idle);
        state.advance();
        state.advance();
        state.set_action(Action::Idle);
        assert_eq!(state.tick(), 2);
        state.set_action(Action::Run);
        assert_eq!(state.tick(), 0);
        assert_eq!(state.action(), Action::Run);
    }
}
