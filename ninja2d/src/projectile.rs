use crate::entities::Player;
use crate::math::Vec2;
use crate::tilemap::TileMap;

/// Outcome of moving a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileFate {
    Flying,
    HitTerrain,
    Expired,
    HitPlayer,
}

/// A bullet travelling horizontally at a fixed speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    /// Pixels per tick; the sign is the direction of travel.
    pub speed: f32,
    /// Ticks since it was fired.
    pub age: u32,
}

impl Projectile {
    /// Fire a projectile from `pos`.
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self { pos, speed, age: 0 }
    }

    /// Move one tick and report what it ran into.
    ///
    /// `target` is the player, if it can currently be hit.
    pub fn update(&mut self, tilemap: &TileMap, target: Option<&Player>, lifetime: u32) -> ProjectileFate {
        self.pos.x += self.speed;
        self.age += 1;

        if tilemap.solid_tile_at(self.pos).is_some() {
            ProjectileFate::HitTerrain
        } else if self.age > lifetime {
            ProjectileFate::Expired
        } else if target.is_some_and(|player| {
            !player.is_invulnerable() && player.body.rect().contains(self.pos)
        }) {
            ProjectileFate::HitPlayer
        } else {
            ProjectileFate::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::grid::GridCoord;
    use crate::tiles::{GridTile, TileKind};

    #[test]
    fn stops_at_solid_tile() {
        let mut map = TileMap::new(16);
        map.set_tile(GridTile::new(TileKind::Grass, 0, GridCoord::new(2, 0)));
        let mut bullet = Projectile::new(Vec2::new(28.0, 8.0), 1.5);

        assert_eq!(bullet.update(&map, None, 360), ProjectileFate::Flying);
        assert_eq!(bullet.update(&map, None, 360), ProjectileFate::Flying);
        assert_eq!(bullet.update(&map, None, 360), ProjectileFate::HitTerrain);
    }

    #[test]
    fn expires_after_lifetime() {
        let map = TileMap::new(16);
        let mut bullet = Projectile::new(Vec2::ZERO, -1.5);
        for _ in 0..360 {
            assert_eq!(bullet.update(&map, None, 360), ProjectileFate::Flying);
        }
        assert_eq!(bullet.update(&map, None, 360), ProjectileFate::Expired);
    }

    #[test]
    fn dashing_player_is_not_hit() {
        let map = TileMap::new(16);
        let mut player = Player::new(Vec2::new(10.0, 0.0), PlayerConfig::default());

        let mut bullet = Projectile::new(Vec2::new(9.0, 5.0), 1.5);
        player.dash();
        assert_eq!(bullet.update(&map, Some(&player), 360), ProjectileFate::Flying);

        player.dashing = 0;
        let mut bullet = Projectile::new(Vec2::new(9.0, 5.0), 1.5);
        assert_eq!(bullet.update(&map, Some(&player), 360), ProjectileFate::HitPlayer);
    }
}
