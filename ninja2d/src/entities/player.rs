use crate::animation::Action;
use crate::config::PlayerConfig;
use crate::math::Vec2;
use crate::physics::KinematicBody;

use super::{FrameContext, GameEvent};

#[derive(Clone, Debug)]
pub struct Player {
    pub body: KinematicBody,
    /// Jump charges left before landing again.
    pub jumps: u32,
    pub wall_slide: bool,
    /// Dash countdown; the sign is the dash direction, zero when not dashing.
    pub dashing: i32,
    config: PlayerConfig,
}

impl Player {
    /// Create a player with its top-left corner at `pos`.
    pub fn new(pos: Vec2, config: PlayerConfig) -> Self {
        Self {
            body: KinematicBody::new(pos, config.size),
            jumps: config.max_jumps,
            wall_slide: false,
            dashing: 0,
            config,
        }
    }

    /// Tuning values for movement, jumping and dashing.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Place the player at a spawn point, as if it just landed there.
    pub fn respawn(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.velocity = Vec2::ZERO;
        self.body.air_time = 0;
        self.jumps = self.config.max_jumps;
        self.wall_slide = false;
        self.dashing = 0;
    }

    /// Dashing fast enough to pass through projectiles and kill enemies.
    pub fn is_invulnerable(&self) -> bool {
        self.dashing.abs() >= self.config.dash_active_until
    }

    /// The sprite is hidden during the burst phase of a dash.
    pub fn is_visible(&self) -> bool {
        self.dashing.abs() <= self.config.dash_active_until
    }

    /// Advance one tick with the given movement intent.
    ///
    /// Returns `true` on the tick the player falls out of the level.
    pub fn update(&mut self, ctx: &mut FrameContext<'_>, movement: Vec2) -> bool {
        self.body.step(ctx.tilemap, movement, ctx.physics);

        let fell = self.body.air_time == self.config.fall_death_frames + 1;
        if fell {
            ctx.events.push(GameEvent::PlayerFell);
        }

        if self.body.collisions.down {
            self.jumps = self.config.max_jumps;
        }

        self.wall_slide = false;
        if self.body.collisions.horizontal() && self.body.air_time > self.config.wall_slide_after {
            self.wall_slide = true;
            self.body.velocity.y = self.body.velocity.y.min(self.config.wall_slide_speed);
            self.body.flip = !self.body.collisions.right;
            self.body.animation.set_action(Action::WallSlide);
        }

        if !self.wall_slide {
            let action = if self.body.air_time > self.config.coyote_frames {
                Action::Jump
            } else if movement.x != 0.0 {
                Action::Run
            } else {
                Action::Idle
            };
            self.body.animation.set_action(action);
        }

        self.update_dash(ctx);
        self.body.apply_friction(ctx.physics);
        fell
    }

    fn update_dash(&mut self, ctx: &mut FrameContext<'_>) {
        let magnitude = self.dashing.abs();
        if magnitude == self.config.dash_frames || magnitude == self.config.dash_active_until {
            ctx.events.push(GameEvent::DashBurst {
                center: self.body.center(),
            });
        }

        self.dashing -= self.dashing.signum();

        let magnitude = self.dashing.abs();
        if magnitude > self.config.dash_active_until {
            let direction = self.dashing.signum() as f32;
            self.body.velocity.x = direction * self.config.dash_speed;
            if magnitude == self.config.dash_active_until + 1 {
                self.body.velocity.x *= self.config.dash_end_factor;
            }
            ctx.events.push(GameEvent::DashTrail {
                center: self.body.center(),
                velocity_x: self.body.velocity.x,
            });
        }
    }

    /// Try to jump. Returns whether the jump happened; nothing changes otherwise.
    ///
    /// While wall sliding only a jump away from the wall, with the intent
    /// still pointing into it, is allowed. Otherwise a jump needs a charge or
    /// must come within the coyote window after leaving the ground.
    pub fn jump(&mut self) -> bool {
        if self.wall_slide {
            let into_wall = if self.body.flip {
                self.body.last_movement.x < 0.0
            } else {
                self.body.last_movement.x > 0.0
            };
            if !into_wall {
                return false;
            }
            let away = if self.body.flip { 1.0 } else { -1.0 };
            self.body.velocity = Vec2::new(away * self.config.wall_jump.x, -self.config.wall_jump.y);
            self.body.air_time = self.config.jump_air_time;
            self.jumps = self.jumps.saturating_sub(1);
            return true;
        }

        if self.jumps > 0 || self.body.air_time <= self.config.coyote_frames {
            self.body.velocity.y = -self.config.jump_speed;
            self.jumps = self.jumps.saturating_sub(1);
            self.body.air_time = self.config.jump_air_time;
            return true;
        }
        false
    }

    /// Start a dash in the facing direction. Returns false if already dashing.
    pub fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = if self.body.flip {
            -self.config.dash_frames
        } else {
            self.config.dash_frames
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::grid::GridCoord;
    use crate::tilemap::TileMap;
    use crate::tiles::{GridTile, TileKind};

    struct Harness {
        map: TileMap,
        physics: PhysicsConfig,
        events: Vec<GameEvent>,
        rng: fastrand::Rng,
    }

    impl Harness {
        fn new(map: TileMap) -> Self {
            Self {
                map,
                physics: PhysicsConfig::default(),
                events: Vec::new(),
                rng: fastrand::Rng::with_seed(7),
            }
        }

        fn tick(&mut self, player: &mut Player, movement: Vec2) -> bool {
            let mut ctx = FrameContext {
                tilemap: &self.map,
                physics: &self.physics,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            player.update(&mut ctx, movement)
        }
    }

    fn floor_map() -> TileMap {
        let mut map = TileMap::new(16);
        for x in 0..=20 {
            map.set_tile(GridTile::new(TileKind::Grass, 0, GridCoord::new(x, 10)));
        }
        map
    }

    fn wall_map() -> TileMap {
        let mut map = TileMap::new(16);
        for y in 0..10 {
            map.set_tile(GridTile::new(TileKind::Stone, 0, GridCoord::new(5, y)));
        }
        map
    }

    #[test]
    fn jump_is_refused_without_charge_after_coyote_window() {
        let mut player = Player::new(Vec2::ZERO, PlayerConfig::default());
        player.jumps = 0;
        player.body.air_time = 5;
        let before = player.body.clone();

        assert!(!player.jump());
        assert_eq!(player.body, before);
        assert_eq!(player.jumps, 0);
    }

    #[test]
    fn jump_within_coyote_window_needs_no_charge() {
        let mut player = Player::new(Vec2::ZERO, PlayerConfig::default());
        player.jumps = 0;
        player.body.air_time = 4;

        assert!(player.jump());
        assert_eq!(player.body.velocity.y, -3.0);
        assert_eq!(player.jumps, 0);
        assert_eq!(player.body.air_time, 5);
        // no second jump until landing
        assert!(!player.jump());
    }

    #[test]
    fn jump_consumes_a_charge() {
        let mut player = Player::new(Vec2::ZERO, PlayerConfig::default());
        player.body.air_time = 30;

        assert!(player.jump());
        assert_eq!(player.jumps, 0);
        assert!(!player.jump());
    }

    #[test]
    fn landing_restores_jump_charge() {
        let mut h = Harness::new(floor_map());
        let mut player = Player::new(Vec2::new(50.0, 140.0), PlayerConfig::default());
        player.jumps = 0;
        for _ in 0..20 {
            h.tick(&mut player, Vec2::ZERO);
        }
        for _ in 0..5 {
            h.tick(&mut player, Vec2::ZERO);
            assert!(player.body.collisions.down);
            assert_eq!(player.body.air_time, 0);
            assert_eq!(player.jumps, 1);
            assert_eq!(player.body.animation.action(), Action::Idle);
        }
    }

    #[test]
    fn sliding_down_a_wall_caps_fall_speed() {
        let mut h = Harness::new(wall_map());
        let mut player = Player::new(Vec2::new(72.0, 10.0), PlayerConfig::default());
        player.body.velocity.y = 3.0;
        player.body.air_time = 10;

        h.tick(&mut player, Vec2::new(1.0, 0.0));
        assert!(player.body.collisions.right);
        assert!(player.wall_slide);
        assert!(player.body.velocity.y <= 0.5);
        assert!(!player.body.flip);
        assert_eq!(player.body.animation.action(), Action::WallSlide);
    }

    #[test]
    fn wall_jump_pushes_away_from_wall() {
        let mut h = Harness::new(wall_map());
        let mut player = Player::new(Vec2::new(72.0, 10.0), PlayerConfig::default());
        player.body.air_time = 10;
        h.tick(&mut player, Vec2::new(1.0, 0.0));
        assert!(player.wall_slide);

        assert!(player.jump());
        assert_eq!(player.body.velocity, Vec2::new(-3.5, -2.5));
        assert_eq!(player.body.air_time, 5);
    }

    #[test]
    fn wall_jump_requires_pushing_into_wall() {
        let mut h = Harness::new(wall_map());
        let mut player = Player::new(Vec2::new(72.0, 10.0), PlayerConfig::default());
        player.body.air_time = 10;
        player.body.velocity.x = 1.0;
        h.tick(&mut player, Vec2::ZERO);
        assert!(player.wall_slide);

        let before = player.body.velocity;
        assert!(!player.jump());
        assert_eq!(player.body.velocity, before);
    }

    #[test]
    fn dash_bursts_then_coasts() {
        let mut h = Harness::new(TileMap::new(16));
        let mut player = Player::new(Vec2::new(0.0, 0.0), PlayerConfig::default());
        assert!(player.dash());
        assert!(!player.dash());
        assert!(player.is_invulnerable());

        h.tick(&mut player, Vec2::ZERO);
        assert_eq!(player.dashing, 59);
        assert_eq!(player.body.velocity.x, 8.0 - 0.1);
        assert!(!player.is_visible());
        assert!(matches!(h.events[0], GameEvent::DashBurst { .. }));
        assert!(matches!(h.events[1], GameEvent::DashTrail { .. }));

        for _ in 0..9 {
            h.tick(&mut player, Vec2::ZERO);
        }
        assert_eq!(player.dashing, 50);
        assert!(player.is_invulnerable());
        assert!(player.body.velocity.x < 1.0);

        h.tick(&mut player, Vec2::ZERO);
        assert!(!player.is_invulnerable());
        let bursts = h
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::DashBurst { .. }))
            .count();
        assert_eq!(bursts, 2);

        for _ in 0..60 {
            h.tick(&mut player, Vec2::ZERO);
        }
        assert_eq!(player.dashing, 0);
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn dash_follows_facing() {
        let mut player = Player::new(Vec2::ZERO, PlayerConfig::default());
        player.body.flip = true;
        player.dash();
        assert_eq!(player.dashing, -60);
    }

    #[test]
    fn falling_forever_reports_once() {
        let mut h = Harness::new(TileMap::new(16));
        let mut player = Player::new(Vec2::ZERO, PlayerConfig::default());
        let falls = (0..300).filter(|_| h.tick(&mut player, Vec2::ZERO)).count();
        assert_eq!(falls, 1);
        assert_eq!(
            h.events.iter().filter(|e| **e == GameEvent::PlayerFell).count(),
            1
        );
    }
}
