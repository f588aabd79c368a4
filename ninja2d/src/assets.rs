use std::collections::HashMap;

use crate::animation::{Action, Animation};
use crate::error::MapError;
use crate::math::Vec2;
use crate::tilemap::TileMap;
use crate::tiles::TileKind;

/// Index of the sprites and animation clips a game knows about.
///
/// Images themselves live with the renderer. The table only records, per
/// tile category, how many variants exist and how large each sprite is, in
/// the order the editor cycles through them.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    tiles: Vec<(TileKind, Vec<Vec2>)>,
    animations: HashMap<String, Animation>,
}

impl AssetTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tile sets and clips shipped with the game.
    pub fn standard() -> Self {
        let cell = Vec2::splat(16.0);
        Self::new()
            .with_tiles(TileKind::Decor, vec![cell; 4])
            .with_tiles(TileKind::Grass, vec![cell; 9])
            .with_tiles(TileKind::LargeDecor, vec![Vec2::splat(32.0); 3])
            .with_tiles(TileKind::Stone, vec![cell; 9])
            .with_tiles(TileKind::Spawners, vec![cell; 2])
            .with_animation("player/idle", Animation::new(22, 6))
            .with_animation("player/run", Animation::new(8, 4))
            .with_animation("player/jump", Animation::new(1, 5))
            .with_animation("player/slide", Animation::new(1, 5))
            .with_animation("player/wall_slide", Animation::new(1, 5))
            .with_animation("enemy/idle", Animation::new(16, 6))
            .with_animation("enemy/run", Animation::new(8, 4))
            .with_animation("particle/leaf", Animation::new(18, 20).once())
            .with_animation("particle/particle", Animation::new(4, 6).once())
    }

    /// Register the sprite sizes for a category, replacing any previous entry
    /// but keeping its position in the category order.
    pub fn insert_tiles(&mut self, kind: TileKind, sizes: Vec<Vec2>) {
        match self.tiles.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = sizes,
            None => self.tiles.push((kind, sizes)),
        }
    }

    #[must_use]
    pub fn with_tiles(mut self, kind: TileKind, sizes: Vec<Vec2>) -> Self {
        self.insert_tiles(kind, sizes);
        self
    }

    /// Register a named clip, replacing any clip with the same name.
    pub fn insert_animation(&mut self, name: impl Into<String>, animation: Animation) {
        self.animations.insert(name.into(), animation);
    }

    #[must_use]
    pub fn with_animation(mut self, name: impl Into<String>, animation: Animation) -> Self {
        self.insert_animation(name, animation);
        self
    }

    /// Tile categories in registration order.
    pub fn categories(&self) -> impl Iterator<Item = TileKind> + '_ {
        self.tiles.iter().map(|(kind, _)| *kind)
    }

    /// Number of registered tile categories.
    pub fn category_count(&self) -> usize {
        self.tiles.len()
    }

    /// Category at `index` in registration order.
    pub fn category(&self, index: usize) -> Option<TileKind> {
        self.tiles.get(index).map(|(kind, _)| *kind)
    }

    /// Number of variants registered for `kind`, zero if unknown.
    pub fn variant_count(&self, kind: TileKind) -> usize {
        self.sizes(kind).map_or(0, <[Vec2]>::len)
    }

    /// Pixel size of a tile sprite, if the variant exists.
    pub fn sprite_size(&self, kind: TileKind, variant: u32) -> Option<Vec2> {
        self.sizes(kind)?.get(variant as usize).copied()
    }

    fn sizes(&self, kind: TileKind) -> Option<&[Vec2]> {
        self.tiles
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, sizes)| sizes.as_slice())
    }

    /// Look up a clip by its full name, e.g. `"particle/leaf"`.
    pub fn clip(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Clip for an entity kind in a given action, e.g. `("player", Action::Run)`.
    pub fn animation(&self, entity: &str, action: Action) -> Option<&Animation> {
        self.clip(&format!("{entity}/{action}"))
    }

    /// Check that every tile in `map` has a sprite.
    ///
    /// Reports the first offending tile, off-grid tiles first and then grid
    /// tiles in row-major order.
    pub fn validate(&self, map: &TileMap) -> Result<(), MapError> {
        let offgrid = map.offgrid().iter().map(|tile| (tile.kind, tile.variant));
        let grid = map
            .grid()
            .sorted_coords()
            .into_iter()
            .filter_map(|coord| map.grid().get(coord))
            .map(|tile| (tile.kind, tile.variant))
            .collect::<Vec<_>>();

        for (kind, variant) in offgrid.chain(grid) {
            if self.sprite_size(kind, variant).is_none() {
                return Err(MapError::InvalidTileReference { kind, variant });
            }
        }
        Ok(())
    }
}
