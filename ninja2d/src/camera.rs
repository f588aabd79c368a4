//! Smoothed scrolling camera.

use crate::math::{IVec2, Vec2};

/// World-space scroll of the top-left corner of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub scroll: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    /// Create a camera at the origin looking at `viewport` pixels.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport,
        }
    }

    /// Move a `1 / smoothing` share of the way toward centring `target`.
    pub fn follow(&mut self, target: Vec2, smoothing: f32) {
        let desired = target - self.viewport / 2.0;
        self.scroll += (desired - self.scroll) / smoothing;
    }

    /// Scroll rounded toward zero, used for drawing so sprites stay on whole pixels.
    pub fn render_offset(&self) -> IVec2 {
        self.scroll.as_ivec2()
    }

    /// Convert a world position to viewport pixels.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.scroll
    }

    /// Convert viewport pixels to a world position.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.scroll
    }
}
