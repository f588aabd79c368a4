//! Tuning values for the game and editor.
//!
//! Defaults reproduce the shipped game. Any subset can be overridden from a
//! JSON file; missing fields fall back to their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Shared body physics, in pixels and pixels per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Per-tick decay of horizontal velocity toward zero.
    pub friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            max_fall_speed: 5.0,
            friction: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: Vec2,
    pub jump_speed: f32,
    pub max_jumps: u32,
    /// Ticks after leaving the ground during which a jump is still honoured.
    pub coyote_frames: u32,
    /// Air time recorded right after a jump, so the jump animation shows at once.
    pub jump_air_time: u32,
    /// Velocity of a wall jump, pushing away from the wall.
    pub wall_jump: Vec2,
    pub wall_slide_speed: f32,
    /// Air time above which wall contact turns into a slide.
    pub wall_slide_after: u32,
    pub dash_frames: i32,
    /// Dash counter magnitude at which the burst phase ends.
    pub dash_active_until: i32,
    pub dash_speed: f32,
    /// Velocity multiplier on the last burst tick.
    pub dash_end_factor: f32,
    /// Air time after which the player counts as having fallen out of the level.
    pub fall_death_frames: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(8.0, 15.0),
            jump_speed: 3.0,
            max_jumps: 1,
            coyote_frames: 4,
            jump_air_time: 5,
            wall_jump: Vec2::new(3.5, 2.5),
            wall_slide_speed: 0.5,
            wall_slide_after: 4,
            dash_frames: 60,
            dash_active_until: 50,
            dash_speed: 8.0,
            dash_end_factor: 0.1,
            fall_death_frames: 120,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub size: Vec2,
    pub walk_speed: f32,
    /// Chance per idle tick of starting a walk.
    pub walk_chance: f32,
    pub min_walk_frames: u32,
    pub max_walk_frames: u32,
    /// Floor sensor offset: horizontal from the centre, vertical from the top.
    pub floor_sensor: Vec2,
    /// Maximum vertical distance to the player for a shot.
    pub sight_height: f32,
    /// Horizontal distance from the centre at which projectiles spawn.
    pub muzzle_offset: f32,
    pub projectile_speed: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(8.0, 15.0),
            walk_speed: 0.5,
            walk_chance: 0.01,
            min_walk_frames: 30,
            max_walk_frames: 120,
            floor_sensor: Vec2::new(7.0, 23.0),
            sight_height: 16.0,
            muzzle_offset: 7.0,
            projectile_speed: 1.5,
        }
    }
}

/// Configuration values for a game or editor session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tile_size: u32,
    /// Size of the low-resolution display the world is drawn into.
    pub viewport: Vec2,
    /// Directory holding `0.json`, `1.json`, ...
    pub levels_dir: PathBuf,
    /// Map file the editor opens and saves.
    pub editor_map: PathBuf,
    /// Camera closes 1/n of the distance to its target per tick.
    pub camera_smoothing: f32,
    pub projectile_lifetime: u32,
    pub transition_frames: i32,
    /// Ticks after death before the screen starts closing.
    pub death_fade_after: u32,
    /// Ticks after death before the level restarts.
    pub death_restart_after: u32,
    pub hit_screenshake: f32,
    /// 1-in-n scale for leaf spawns, compared against the emitter's area.
    pub leaf_odds: f32,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            viewport: Vec2::new(300.0, 200.0),
            levels_dir: PathBuf::from("data/maps"),
            editor_map: PathBuf::from("map.json"),
            camera_smoothing: 30.0,
            projectile_lifetime: 360,
            transition_frames: 30,
            death_fade_after: 10,
            death_restart_after: 40,
            hit_screenshake: 16.0,
            leaf_odds: 49999.0,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read a configuration file; fields it omits keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    #[must_use]
    pub fn with_levels_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.levels_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_editor_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.editor_map = path.into();
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Vec2::new(width, height);
        self
    }

    #[must_use]
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    #[must_use]
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }
}
