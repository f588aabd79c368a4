//! Headless game loop: level sequencing, entity updates and frame events.
//!
//! A frontend owns a [`GameSession`], feeds it input through
//! [`press`](GameSession::press) / [`release`](GameSession::release), calls
//! [`update`](GameSession::update) at 60 Hz and draws what the accessors
//! expose. Sounds and particles are driven by the returned [`GameEvent`]s.

use anyhow::{Context, Result};

use crate::assets::AssetTable;
use crate::camera::Camera;
use crate::config::GameConfig;
use crate::entities::{Enemy, FrameContext, GameEvent, Player};
use crate::input::{Control, Controls};
use crate::levels::LevelSet;
use crate::math::{Rect, Vec2};
use crate::projectile::{Projectile, ProjectileFate};
use crate::tilemap::{TileMap, TileSprite};
use crate::tiles::TileKind;

const LEAF_TREE: (TileKind, u32) = (TileKind::LargeDecor, 2);
const PLAYER_SPAWNER: (TileKind, u32) = (TileKind::Spawners, 0);
const ENEMY_SPAWNER: (TileKind, u32) = (TileKind::Spawners, 1);

/// Leaf emitter area relative to the top-left of a tree sprite.
const LEAF_EMITTER_OFFSET: Vec2 = Vec2::new(4.0, 4.0);
const LEAF_EMITTER_SIZE: Vec2 = Vec2::new(23.0, 13.0);

/// Where the player starts before the first level places it.
const PLAYER_START: Vec2 = Vec2::new(50.0, 50.0);

pub struct GameSession {
    config: GameConfig,
    assets: AssetTable,
    levels: LevelSet,
    level: usize,
    tilemap: TileMap,
    player: Player,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    leaf_emitters: Vec<Rect>,
    camera: Camera,
    controls: Controls,
    /// Ticks since the player died; zero while alive.
    dead: u32,
    /// Screen wipe progress. Negative while opening, positive while closing.
    transition: i32,
    screenshake: f32,
    rng: fastrand::Rng,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Discover the levels in `config.levels_dir` and start the first one.
    pub fn new(config: GameConfig, assets: AssetTable) -> Result<Self> {
        Self::with_rng(config, assets, fastrand::Rng::new())
    }

    /// Like [`new`](Self::new) but with a fixed random seed, for replays and tests.
    pub fn with_seed(config: GameConfig, assets: AssetTable, seed: u64) -> Result<Self> {
        Self::with_rng(config, assets, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: GameConfig, assets: AssetTable, rng: fastrand::Rng) -> Result<Self> {
        let levels = LevelSet::discover(&config.levels_dir)?;
        let mut session = Self {
            tilemap: TileMap::new(config.tile_size),
            player: Player::new(PLAYER_START, config.player.clone()),
            camera: Camera::new(config.viewport),
            config,
            assets,
            levels,
            level: 0,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            leaf_emitters: Vec::new(),
            controls: Controls::new(),
            dead: 0,
            transition: 0,
            screenshake: 0.0,
            rng,
            events: Vec::new(),
        };
        session.load_level(0)?;
        Ok(session)
    }

    /// Replace the current level with level `level` and place its entities.
    pub fn load_level(&mut self, level: usize) -> Result<()> {
        let path = self.levels.path(level);
        let mut tilemap = TileMap::load(&path)
            .with_context(|| format!("failed to load level {level} from {}", path.display()))?;
        self.assets
            .validate(&tilemap)
            .with_context(|| format!("level {level} references missing assets"))?;

        self.leaf_emitters = tilemap
            .extract(&[LEAF_TREE], true)
            .iter()
            .map(|tree| Rect::from_pos_size(tree.pos + LEAF_EMITTER_OFFSET, LEAF_EMITTER_SIZE))
            .collect();

        self.enemies.clear();
        for spawner in tilemap.extract(&[PLAYER_SPAWNER, ENEMY_SPAWNER], false) {
            if spawner.matches(&[PLAYER_SPAWNER]) {
                self.player.respawn(spawner.pos);
            } else {
                self.enemies
                    .push(Enemy::new(spawner.pos, self.config.enemy.clone()));
            }
        }

        self.tilemap = tilemap;
        self.level = level;
        self.projectiles.clear();
        self.camera.scroll = Vec2::ZERO;
        self.dead = 0;
        self.transition = -self.config.transition_frames;
        self.events.push(GameEvent::LevelLoaded { level });
        log::info!(
            "loaded level {} ({} enemies, {} leaf emitters)",
            level,
            self.enemies.len(),
            self.leaf_emitters.len()
        );
        Ok(())
    }

    /// Mark a control as held; it counts as pressed on the next update.
    pub fn press(&mut self, control: Control) {
        self.controls.press(control);
    }

    /// Mark a control as released.
    pub fn release(&mut self, control: Control) {
        self.controls.release(control);
    }

    /// Advance the game by one tick and return what happened.
    pub fn update(&mut self) -> Result<Vec<GameEvent>> {
        self.handle_input();
        self.screenshake = (self.screenshake - 1.0).max(0.0);
        self.update_transition()?;

        self.camera
            .follow(self.player.body.center(), self.config.camera_smoothing);
        self.spawn_leaves();
        self.update_entities();

        self.controls.begin_frame();
        Ok(std::mem::take(&mut self.events))
    }

    fn handle_input(&mut self) {
        if self.controls.was_pressed(Control::Jump) && self.player.jump() {
            self.events.push(GameEvent::Jumped);
        }
        if self.controls.was_pressed(Control::Dash) && self.player.dash() {
            self.events.push(GameEvent::Dashed);
        }
    }

    fn update_transition(&mut self) -> Result<()> {
        let frames = self.config.transition_frames;
        if self.enemies.is_empty() {
            self.transition += 1;
            if self.transition > frames {
                let next = self.levels.next(self.level);
                log::info!("level {} cleared, moving to level {}", self.level, next);
                self.load_level(next)?;
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }

        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= self.config.death_fade_after {
                self.transition = (self.transition + 1).min(frames);
            }
            if self.dead > self.config.death_restart_after {
                log::info!("restarting level {}", self.level);
                self.load_level(self.level)?;
            }
        }
        Ok(())
    }

    fn spawn_leaves(&mut self) {
        for emitter in &self.leaf_emitters {
            if self.rng.f32() * self.config.leaf_odds < emitter.area() {
                let pos = emitter.position()
                    + Vec2::new(self.rng.f32() * emitter.w, self.rng.f32() * emitter.h);
                self.events.push(GameEvent::LeafSpawned { pos });
            }
        }
    }

    fn update_entities(&mut self) {
        let Self {
            config,
            tilemap,
            player,
            enemies,
            projectiles,
            controls,
            dead,
            screenshake,
            rng,
            events,
            ..
        } = self;
        let mut ctx = FrameContext {
            tilemap,
            physics: &config.physics,
            events,
            rng,
        };

        enemies.retain_mut(|enemy| {
            let outcome = enemy.update(&mut ctx, player);
            projectiles.extend(outcome.shot);
            if outcome.killed {
                *screenshake = screenshake.max(config.hit_screenshake);
            }
            !outcome.killed
        });

        if *dead == 0 {
            let movement = Vec2::new(controls.horizontal(), 0.0);
            if player.update(&mut ctx, movement) {
                *dead += 1;
                *screenshake = screenshake.max(config.hit_screenshake);
            }
        }

        projectiles.retain_mut(|projectile| {
            let target = (*dead == 0).then_some(&*player);
            match projectile.update(ctx.tilemap, target, config.projectile_lifetime) {
                ProjectileFate::Flying => true,
                ProjectileFate::Expired => false,
                ProjectileFate::HitTerrain => {
                    ctx.events.push(GameEvent::ProjectileHitTerrain {
                        pos: projectile.pos,
                        direction: projectile.speed.signum(),
                    });
                    false
                }
                ProjectileFate::HitPlayer => {
                    *dead += 1;
                    *screenshake = screenshake.max(config.hit_screenshake);
                    ctx.events.push(GameEvent::PlayerHit {
                        center: player.body.center(),
                    });
                    false
                }
            }
        });
    }

    /// Random offset to apply to the final frame while the screen shakes.
    pub fn screenshake_offset(&mut self) -> Vec2 {
        let shake = self.screenshake;
        Vec2::new(
            self.rng.f32() * shake - shake / 2.0,
            self.rng.f32() * shake - shake / 2.0,
        )
    }

    /// Tiles to draw this frame, positioned relative to the camera.
    pub fn visible_tiles(&self) -> impl Iterator<Item = TileSprite> + '_ {
        self.tilemap
            .visible_tiles(self.camera.render_offset().as_vec2(), self.camera.viewport)
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Asset table levels are validated against.
    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    /// Index of the level being played.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Number of levels found on disk.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Geometry of the current level, without its spawners.
    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    /// The player, also while dead.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Enemies still alive in this level.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Projectiles in flight.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Areas under trees where leaves spawn.
    pub fn leaf_emitters(&self) -> &[Rect] {
        &self.leaf_emitters
    }

    /// The camera following the player.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// True from the moment the player dies until the level restarts.
    pub fn is_dead(&self) -> bool {
        self.dead > 0
    }

    /// Screen wipe progress, from `-transition_frames` (opening) to `transition_frames` (closed).
    pub fn transition(&self) -> i32 {
        self.transition
    }

    /// Current screenshake strength in pixels.
    pub fn screenshake(&self) -> f32 {
        self.screenshake
    }
}
