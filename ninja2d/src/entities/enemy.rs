use crate::animation::Action;
use crate::config::EnemyConfig;
use crate::math::Vec2;
use crate::physics::KinematicBody;
use crate::projectile::Projectile;

use super::{FrameContext, GameEvent, Player};

/// What happened to an enemy during its update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyUpdate {
    /// The enemy was dashed through and should be removed.
    pub killed: bool,
    pub shot: Option<Projectile>,
}

/// Patrolling gunner: idles, wanders along platforms without walking off
/// them, and fires along the ground at the player when a walk ends.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: KinematicBody,
    /// Ticks of walking left; zero while idle.
    pub walking: u32,
    config: EnemyConfig,
}

impl Enemy {
    /// Spawn an idle enemy with its top-left corner at `pos`.
    pub fn new(pos: Vec2, config: EnemyConfig) -> Self {
        Self {
            body: KinematicBody::new(pos, config.size),
            walking: 0,
            config,
        }
    }

    /// Tuning values this enemy was spawned with.
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Where the gun is drawn and projectiles leave from.
    pub fn muzzle(&self) -> Vec2 {
        let side = if self.body.flip { -1.0 } else { 1.0 };
        self.body.center() + Vec2::new(side * self.config.muzzle_offset, 0.0)
    }

    /// Advance one tick: patrol, maybe shoot, and check for being dashed through.
    pub fn update(&mut self, ctx: &mut FrameContext<'_>, player: &Player) -> EnemyUpdate {
        let mut outcome = EnemyUpdate::default();
        let mut movement = Vec2::ZERO;

        if self.walking > 0 {
            let side = if self.body.flip { -1.0 } else { 1.0 };
            let ahead = Vec2::new(
                self.body.center().x + side * self.config.floor_sensor.x,
                self.body.pos.y + self.config.floor_sensor.y,
            );
            if ctx.tilemap.solid_tile_at(ahead).is_some() {
                if self.body.collisions.horizontal() {
                    self.body.flip = !self.body.flip;
                } else {
                    movement.x = side * self.config.walk_speed;
                }
            } else {
                self.body.flip = !self.body.flip;
            }

            self.walking -= 1;
            if self.walking == 0 {
                outcome.shot = self.try_shoot(ctx, player);
            }
        } else if ctx.rng.f32() < self.config.walk_chance {
            self.walking = ctx
                .rng
                .u32(self.config.min_walk_frames..=self.config.max_walk_frames);
            log::trace!("enemy at {:?} walks for {} ticks", self.body.pos, self.walking);
        }

        self.body.step(ctx.tilemap, movement, ctx.physics);
        self.body.apply_friction(ctx.physics);
        let action = if movement.x != 0.0 {
            Action::Run
        } else {
            Action::Idle
        };
        self.body.animation.set_action(action);

        if player.is_invulnerable() && self.body.rect().overlaps(&player.body.rect()) {
            ctx.events.push(GameEvent::EnemyKilled {
                center: self.body.center(),
            });
            outcome.killed = true;
        }
        outcome
    }

    /// Fire toward the player if it is level with us, in front, and nothing
    /// solid lies in between.
    fn try_shoot(&self, ctx: &mut FrameContext<'_>, player: &Player) -> Option<Projectile> {
        let distance = player.body.pos - self.body.pos;
        if distance.y.abs() >= self.config.sight_height {
            return None;
        }
        let in_front = if self.body.flip {
            distance.x < 0.0
        } else {
            distance.x > 0.0
        };
        if !in_front || !ctx.tilemap.line_of_sight(self.body.center(), player.body.center()) {
            return None;
        }

        let direction = if self.body.flip { -1.0 } else { 1.0 };
        let origin = self.muzzle();
        ctx.events.push(GameEvent::Shot { origin, direction });
        Some(Projectile::new(origin, direction * self.config.projectile_speed))
    }
}
