//! Tile-based kinematic body shared by the player and enemies.
//!
//! Movement is resolved one axis at a time: the full horizontal displacement
//! is applied and pushed out of any solid tile, then the full vertical one.
//! This can catch on corners but never tunnels diagonally. Contact on an
//! axis zeroes the velocity along it.

use crate::animation::AnimationState;
use crate::config::PhysicsConfig;
use crate::math::{Rect, Vec2};
use crate::tilemap::TileMap;

/// Sides that touched solid tiles during the last step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    /// Touched a wall on either side.
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    /// Touched a floor or a ceiling.
    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KinematicBody {
    /// Top-left corner in world pixels.
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub collisions: Collisions,
    /// Ticks since the last vertical contact.
    pub air_time: u32,
    /// Facing left.
    pub flip: bool,
    /// Movement intent passed to the last step.
    pub last_movement: Vec2,
    pub animation: AnimationState,
}

impl KinematicBody {
    /// Create a body at rest with no contacts.
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            velocity: Vec2::ZERO,
            collisions: Collisions::default(),
            air_time: 0,
            flip: false,
            last_movement: Vec2::ZERO,
            animation: AnimationState::default(),
        }
    }

    /// Current bounding rect in world pixels.
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Center of the bounding rect.
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Advance one tick: apply gravity, move by `movement + velocity`,
    /// resolve collisions against `tilemap` and update air time.
    ///
    /// Gravity is applied before moving so a body resting on the floor presses
    /// into it every tick and keeps reporting `down`.
    pub fn step(&mut self, tilemap: &TileMap, movement: Vec2, physics: &PhysicsConfig) {
        self.collisions = Collisions::default();
        self.velocity.y = (self.velocity.y + physics.gravity).min(physics.max_fall_speed);
        let frame_movement = movement + self.velocity;

        self.pos.x += frame_movement.x;
        let mut rect = self.rect();
        for tile in tilemap.physics_rects_around(self.pos) {
            if rect.overlaps(&tile) {
                if frame_movement.x > 0.0 {
                    rect.set_right(tile.left());
                    self.collisions.right = true;
                }
                if frame_movement.x < 0.0 {
                    rect.set_left(tile.right());
                    self.collisions.left = true;
                }
                self.pos.x = rect.x;
                self.velocity.x = 0.0;
            }
        }

        self.pos.y += frame_movement.y;
        let mut rect = self.rect();
        for tile in tilemap.physics_rects_around(self.pos) {
            if rect.overlaps(&tile) {
                if frame_movement.y > 0.0 {
                    rect.set_bottom(tile.top());
                    self.collisions.down = true;
                }
                if frame_movement.y < 0.0 {
                    rect.set_top(tile.bottom());
                    self.collisions.up = true;
                }
                self.pos.y = rect.y;
            }
        }

        if movement.x > 0.0 {
            self.flip = false;
        }
        if movement.x < 0.0 {
            self.flip = true;
        }
        self.last_movement = movement;

        if self.collisions.vertical() {
            self.velocity.y = 0.0;
        }

        self.air_time = self.air_time.saturating_add(1);
        if self.collisions.vertical() {
            self.air_time = 0;
        }

        self.animation.advance();
    }

    /// Decay horizontal velocity toward zero without overshooting.
    pub fn apply_friction(&mut self, physics: &PhysicsConfig) {
        if self.velocity.x > 0.0 {
            self.velocity.x = (self.velocity.x - physics.friction).max(0.0);
        } else {
            self.velocity.x = (self.velocity.x + physics.friction).min(0.0);
        }
    }
}
