//! Ninja2D - tile map, physics and gameplay core for a pixel-art platformer.
//!
//! Everything here is headless: rendering, audio and windowing live in the
//! frontend, which drives a [`GameSession`] or [`EditorSession`] once per
//! tick and reacts to the returned [`GameEvent`]s.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod config;
pub mod editor;
pub mod entities;
pub mod error;
pub mod game;
pub mod grid;
pub mod input;
pub mod levels;
pub mod math;
pub mod offgrid;
pub mod physics;
pub mod projectile;
pub mod tilemap;
pub mod tiles;

pub use crate::animation::{Action, Animation, AnimationState};
pub use crate::assets::AssetTable;
pub use crate::camera::Camera;
pub use crate::config::{EnemyConfig, GameConfig, PhysicsConfig, PlayerConfig};
pub use crate::editor::{Brush, EditorSession};
pub use crate::entities::{Enemy, FrameContext, GameEvent, Player};
pub use crate::error::MapError;
pub use crate::game::GameSession;
pub use crate::grid::{Direction, GridCoord, GridIndex};
pub use crate::input::{Control, Controls};
pub use crate::levels::LevelSet;
pub use crate::math::{IVec2, Rect, Vec2};
pub use crate::physics::{Collisions, KinematicBody};
pub use crate::projectile::{Projectile, ProjectileFate};
pub use crate::tilemap::{TileMap, TileSprite};
pub use crate::tiles::{GridTile, OffgridTile, Tile, TileKind};
