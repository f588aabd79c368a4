//! The player and enemies, plus the events they report to the game.
//!
//! Both variants wrap a [`KinematicBody`](crate::physics::KinematicBody) and
//! differ only in how they pick a movement intent and react to contact.
//! Neither touches audio or particles: anything the presentation layer should
//! react to is pushed onto the frame's event list.

mod enemy;
mod player;

pub use enemy::{Enemy, EnemyUpdate};
pub use player::Player;

use crate::config::PhysicsConfig;
use crate::math::Vec2;
use crate::tilemap::TileMap;

/// Discrete things that happened during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    Dashed,
    /// Start or end of a dash burst.
    DashBurst { center: Vec2 },
    /// Emitted every tick the dash burst is active.
    DashTrail { center: Vec2, velocity_x: f32 },
    Shot { origin: Vec2, direction: f32 },
    ProjectileHitTerrain { pos: Vec2, direction: f32 },
    PlayerHit { center: Vec2 },
    /// The player has been airborne long enough to count as fallen out of the level.
    PlayerFell,
    EnemyKilled { center: Vec2 },
    LeafSpawned { pos: Vec2 },
    LevelLoaded { level: usize },
}

impl GameEvent {
    /// Name of the sound effect that accompanies this event, if any.
    pub fn sound(&self) -> Option<&'static str> {
        match self {
            GameEvent::Jumped => Some("jump"),
            GameEvent::Dashed => Some("dash"),
            GameEvent::Shot { .. } => Some("shoot"),
            GameEvent::PlayerHit { .. } | GameEvent::EnemyKilled { .. } => Some("hit"),
            _ => None,
        }
    }
}

/// Per-frame state shared by every entity update.
pub struct FrameContext<'a> {
    pub tilemap: &'a TileMap,
    pub physics: &'a PhysicsConfig,
    pub events: &'a mut Vec<GameEvent>,
    pub rng: &'a mut fastrand::Rng,
}
