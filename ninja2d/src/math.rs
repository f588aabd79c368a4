pub use glam::{IVec2, Vec2};

/// Axis-aligned rectangle in world pixels (top-left origin, y grows down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Create a rect from its top-left corner and size.
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rect from a top-left position and a size vector.
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// X coordinate of the left edge.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Y coordinate of the top edge.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Top-left corner.
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Width times height.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Move the rect so its right edge sits at `right`.
    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    /// Move the rect so its left edge sits at `left`.
    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    /// Move the rect so its bottom edge sits at `bottom`.
    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    /// Move the rect so its top edge sits at `top`.
    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    /// Strict overlap test: rects that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}
