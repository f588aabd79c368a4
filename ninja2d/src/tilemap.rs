//! Level geometry: a sparse tile grid plus free-form decorative tiles.
//!
//! Collision and render queries only touch the cells around the query point
//! or inside the viewport, so their cost does not grow with the map.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::grid::{Direction, GridCoord, GridIndex};
use crate::math::{Rect, Vec2};
use crate::offgrid::OffgridLayer;
use crate::tiles::{GridTile, OffgridTile, TileKind};

/// Offsets of the 3x3 block scanned around a query point.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const R: u8 = Direction::Right.bit();
const L: u8 = Direction::Left.bit();
const U: u8 = Direction::Up.bit();
const D: u8 = Direction::Down.bit();

/// Same-kind neighbour mask -> variant. Order matches the terrain sprite sheets.
const AUTOTILE_RULES: [(u8, u32); 9] = [
    (R | D, 0),
    (R | D | L, 1),
    (L | D, 2),
    (L | U | D, 3),
    (L | U, 4),
    (L | U | R, 5),
    (R | U, 6),
    (R | U | D, 7),
    (R | L | U | D, 8),
];

/// Variant selected for a neighbour mask, if the mask is one of the canonical patterns.
pub fn autotile_variant(mask: u8) -> Option<u32> {
    AUTOTILE_RULES
        .iter()
        .find(|&&(rule, _)| rule == mask)
        .map(|&(_, variant)| variant)
}

/// A tile ready to be drawn: which sprite, and where on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSprite {
    pub kind: TileKind,
    pub variant: u32,
    pub screen_pos: Vec2,
}

/// On-disk layout of a map file.
#[derive(Serialize, Deserialize)]
struct MapFile {
    tilemap: BTreeMap<String, GridTile>,
    tile_size: u32,
    offgrid: Vec<OffgridTile>,
}

#[derive(Clone, Debug)]
pub struct TileMap {
    tile_size: u32,
    grid: GridIndex,
    offgrid: OffgridLayer,
}

impl TileMap {
    /// Create an empty map with square cells of `tile_size` pixels.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            grid: GridIndex::new(),
            offgrid: OffgridLayer::new(),
        }
    }

    /// Cell edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tiles snapped to grid cells.
    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Free-form tiles in draw order.
    pub fn offgrid(&self) -> &OffgridLayer {
        &self.offgrid
    }

    /// Place a tile in the cell named by its `pos`, returning the tile it replaced.
    pub fn set_tile(&mut self, tile: GridTile) -> Option<GridTile> {
        self.grid.set(tile)
    }

    /// Clear a cell. Clearing an empty cell does nothing.
    pub fn remove_tile(&mut self, coord: GridCoord) -> Option<GridTile> {
        self.grid.remove(coord)
    }

    /// Tile in a cell, if any.
    pub fn tile_at(&self, coord: GridCoord) -> Option<&GridTile> {
        self.grid.get(coord)
    }

    /// Add a free-form tile on top of the existing ones.
    pub fn push_offgrid(&mut self, tile: OffgridTile) {
        self.offgrid.push(tile);
    }

    /// Remove the first free-form tile equal to `tile`. Returns whether one was found.
    pub fn remove_offgrid(&mut self, tile: &OffgridTile) -> bool {
        self.offgrid.remove(tile)
    }

    /// Keep only the free-form tiles for which `keep` returns true.
    pub fn retain_offgrid(&mut self, keep: impl FnMut(&OffgridTile) -> bool) {
        self.offgrid.retain(keep);
    }

    /// Cell containing a world pixel position.
    pub fn cell_at(&self, pos: Vec2) -> GridCoord {
        GridCoord::from_pixel(pos, self.tile_size)
    }

    /// Pixel rectangle covered by a cell.
    pub fn cell_rect(&self, coord: GridCoord) -> Rect {
        let size = self.tile_size as f32;
        Rect::from_pos_size(coord.to_pixel(self.tile_size), Vec2::splat(size))
    }

    /// Tiles in the 3x3 block of cells around `pos`.
    pub fn tiles_near(&self, pos: Vec2) -> impl Iterator<Item = &GridTile> + '_ {
        let center = self.cell_at(pos);
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.grid.get(center.offset(dx, dy)))
    }

    /// Collision rectangles of the physical tiles around `pos`.
    pub fn physics_rects_around(&self, pos: Vec2) -> impl Iterator<Item = Rect> + '_ {
        self.tiles_near(pos)
            .filter(|tile| tile.kind.is_physical())
            .map(|tile| self.cell_rect(tile.pos))
    }

    /// The physical tile occupying the cell that contains `pos`.
    pub fn solid_tile_at(&self, pos: Vec2) -> Option<&GridTile> {
        self.grid
            .get(self.cell_at(pos))
            .filter(|tile| tile.kind.is_physical())
    }

    /// Rectangle of the physical tile under `pos`, if any.
    pub fn solid_rect_at(&self, pos: Vec2) -> Option<Rect> {
        self.solid_tile_at(pos).map(|tile| self.cell_rect(tile.pos))
    }

    /// True if the straight segment from `from` to `to` crosses no physical tile.
    ///
    /// Samples the segment every quarter tile, so cost grows with its length
    /// and never with the size of the map.
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let step = self.tile_size as f32 / 4.0;
        let samples = (from.distance(to) / step).ceil().max(1.0) as u32;
        (0..=samples).all(|i| {
            let point = from.lerp(to, i as f32 / samples as f32);
            self.solid_tile_at(point).is_none()
        })
    }

    /// Pull every tile whose `(kind, variant)` is in `ids` out of the map.
    ///
    /// Off-grid matches come first in insertion order, then grid matches in
    /// row-major order with their position converted to the top-left pixel of
    /// the cell. With `keep` the map is left untouched.
    pub fn extract(&mut self, ids: &[(TileKind, u32)], keep: bool) -> Vec<OffgridTile> {
        let mut matches: Vec<OffgridTile> = self
            .offgrid
            .iter()
            .filter(|tile| tile.matches(ids))
            .copied()
            .collect();
        if !keep {
            self.offgrid.retain(|tile| !tile.matches(ids));
        }

        for coord in self.grid.sorted_coords() {
            let Some(tile) = self.grid.get(coord).copied() else {
                continue;
            };
            if tile.matches(ids) {
                matches.push(tile.to_pixel_tile(self.tile_size));
                if !keep {
                    self.grid.remove(coord);
                }
            }
        }

        log::debug!("extracted {} tiles (keep: {})", matches.len(), keep);
        matches
    }

    /// Same-kind orthogonal neighbour mask for the tile at `coord`.
    pub fn neighbor_mask(&self, coord: GridCoord) -> u8 {
        let Some(kind) = self.grid.get(coord).map(|tile| tile.kind) else {
            return 0;
        };
        self.grid
            .neighbors(coord)
            .filter(|(_, neighbor)| neighbor.kind == kind)
            .fold(0, |mask, (dir, _)| mask | dir.bit())
    }

    /// Recompute the variant of every autotile-eligible grid tile from its
    /// same-kind neighbours. Tiles whose neighbourhood is not one of the
    /// canonical patterns keep their variant. Returns the number of tiles changed.
    pub fn autotile(&mut self) -> usize {
        let updates: Vec<(GridCoord, u32)> = self
            .grid
            .iter()
            .filter(|tile| tile.kind.is_autotile())
            .filter_map(|tile| {
                autotile_variant(self.neighbor_mask(tile.pos)).map(|variant| (tile.pos, variant))
            })
            .collect();

        let mut changed = 0;
        for (coord, variant) in updates {
            if let Some(tile) = self.grid.get_mut(coord) {
                if tile.variant != variant {
                    tile.variant = variant;
                    changed += 1;
                }
            }
        }
        log::debug!("autotile rewrote {} tiles", changed);
        changed
    }

    /// Tiles to draw for a camera at `offset` looking at `viewport` pixels.
    ///
    /// Every off-grid tile is yielded; grid tiles only for cells inside the
    /// viewport plus one cell of margin on the far edges.
    pub fn visible_tiles(&self, offset: Vec2, viewport: Vec2) -> impl Iterator<Item = TileSprite> + '_ {
        let size = self.tile_size as f32;
        let first = self.cell_at(offset);
        let last_x = ((offset.x + viewport.x) / size).floor() as i32;
        let last_y = ((offset.y + viewport.y) / size).floor() as i32;

        let offgrid = self.offgrid.iter().map(move |tile| TileSprite {
            kind: tile.kind,
            variant: tile.variant,
            screen_pos: tile.pos - offset,
        });

        let grid = (first.x..=last_x)
            .flat_map(move |x| (first.y..=last_y).map(move |y| GridCoord::new(x, y)))
            .filter_map(move |coord| self.grid.get(coord))
            .map(move |tile| TileSprite {
                kind: tile.kind,
                variant: tile.variant,
                screen_pos: tile.pixel_pos(self.tile_size) - offset,
            });

        offgrid.chain(grid)
    }

    /// Serialize the map to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, MapError> {
        let file = MapFile {
            tilemap: self
                .grid
                .iter()
                .map(|tile| (tile.pos.to_string(), *tile))
                .collect(),
            tile_size: self.tile_size,
            offgrid: self.offgrid.as_slice().to_vec(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the map to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| MapError::from_io(path, e))?;
        log::info!(
            "saved map {} ({} grid, {} off-grid tiles)",
            path.display(),
            self.grid.len(),
            self.offgrid.len()
        );
        Ok(())
    }

    /// Load a map written by [`TileMap::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| MapError::from_io(path, e))?;
        Self::parse(path, &json)
    }

    fn parse(path: &Path, json: &str) -> Result<Self, MapError> {
        let file: MapFile = serde_json::from_str(json).map_err(|e| MapError::corrupt(path, e))?;
        if file.tile_size == 0 {
            return Err(MapError::corrupt(path, "tile_size must be positive"));
        }

        let mut map = Self::new(file.tile_size);
        for (key, tile) in file.tilemap {
            let coord: GridCoord = key.parse().map_err(|e| MapError::corrupt(path, e))?;
            if coord != tile.pos {
                return Err(MapError::corrupt(
                    path,
                    format!("key {key} does not match tile position {}", tile.pos),
                ));
            }
            map.grid.set(tile);
        }
        map.offgrid = OffgridLayer::from(file.offgrid);
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(kind: TileKind, x: i32, y: i32) -> GridTile {
        GridTile::new(kind, 0, GridCoord::new(x, y))
    }

    fn floor_map() -> TileMap {
        let mut map = TileMap::new(16);
        for x in 0..=20 {
            map.set_tile(tile(TileKind::Grass, x, 10));
        }
        map
    }

    #[test]
    fn tiles_near_scans_three_by_three() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Stone, 2, 2));
        map.set_tile(tile(TileKind::Stone, 4, 4));
        map.set_tile(tile(TileKind::Stone, 5, 5));

        let near: Vec<GridCoord> = map.tiles_near(Vec2::new(56.0, 56.0)).map(|t| t.pos).collect();
        assert_eq!(near, vec![GridCoord::new(2, 2), GridCoord::new(4, 4)]);
    }

    #[test]
    fn physics_rects_skip_decorative_tiles() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Decor, 1, 1));
        map.set_tile(tile(TileKind::Grass, 1, 2));

        let rects: Vec<Rect> = map.physics_rects_around(Vec2::new(20.0, 20.0)).collect();
        assert_eq!(rects, vec![Rect::new(16.0, 32.0, 16.0, 16.0)]);
    }

    #[test]
    fn solid_rect_at_requires_physical_tile() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Stone, 0, 0));
        map.set_tile(tile(TileKind::LargeDecor, 1, 0));

        assert_eq!(map.solid_rect_at(Vec2::new(8.0, 8.0)), Some(Rect::new(0.0, 0.0, 16.0, 16.0)));
        assert_eq!(map.solid_rect_at(Vec2::new(20.0, 8.0)), None);
        assert_eq!(map.solid_rect_at(Vec2::new(40.0, 8.0)), None);
    }

    #[test]
    fn line_of_sight_is_blocked_by_solid_cells_only() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Stone, 5, 0));
        map.set_tile(tile(TileKind::Decor, 2, 0));

        assert!(map.line_of_sight(Vec2::new(8.0, 8.0), Vec2::new(72.0, 8.0)));
        assert!(!map.line_of_sight(Vec2::new(8.0, 8.0), Vec2::new(120.0, 8.0)));
        assert!(!map.line_of_sight(Vec2::new(120.0, 8.0), Vec2::new(8.0, 8.0)));
        assert!(map.line_of_sight(Vec2::new(8.0, 24.0), Vec2::new(120.0, 24.0)));
    }

    #[test]
    fn extract_removes_exactly_the_matches() {
        let mut map = floor_map();
        map.set_tile(GridTile::new(TileKind::Spawners, 0, GridCoord::new(3, 9)));
        map.set_tile(GridTile::new(TileKind::Spawners, 1, GridCoord::new(8, 9)));
        map.set_tile(GridTile::new(TileKind::Spawners, 2, GridCoord::new(9, 9)));
        map.push_offgrid(OffgridTile::new(TileKind::Spawners, 1, Vec2::new(100.5, 20.25)));
        map.push_offgrid(OffgridTile::new(TileKind::Decor, 1, Vec2::new(1.0, 1.0)));

        let ids = [(TileKind::Spawners, 0), (TileKind::Spawners, 1)];
        let found = map.extract(&ids, false);
        assert_eq!(
            found,
            vec![
                OffgridTile::new(TileKind::Spawners, 1, Vec2::new(100.5, 20.25)),
                OffgridTile::new(TileKind::Spawners, 0, Vec2::new(48.0, 144.0)),
                OffgridTile::new(TileKind::Spawners, 1, Vec2::new(128.0, 144.0)),
            ]
        );

        assert_eq!(map.grid().len(), 22);
        assert!(map.tile_at(GridCoord::new(9, 9)).is_some());
        assert_eq!(map.offgrid().len(), 1);
        assert!(map.extract(&ids, false).is_empty());
    }

    #[test]
    fn extract_with_keep_leaves_map_untouched() {
        let mut map = TileMap::new(16);
        map.set_tile(GridTile::new(TileKind::LargeDecor, 2, GridCoord::new(1, 1)));

        let first = map.extract(&[(TileKind::LargeDecor, 2)], true);
        let second = map.extract(&[(TileKind::LargeDecor, 2)], true);
        assert_eq!(first, second);
        assert_eq!(first[0].pos, Vec2::new(16.0, 16.0));
        assert_eq!(map.grid().len(), 1);
    }

    #[test]
    fn autotile_table_is_exact() {
        assert_eq!(autotile_variant(R | D), Some(0));
        assert_eq!(autotile_variant(R | D | L), Some(1));
        assert_eq!(autotile_variant(L | D), Some(2));
        assert_eq!(autotile_variant(L | U | D), Some(3));
        assert_eq!(autotile_variant(L | U), Some(4));
        assert_eq!(autotile_variant(L | U | R), Some(5));
        assert_eq!(autotile_variant(R | U), Some(6));
        assert_eq!(autotile_variant(R | U | D), Some(7));
        assert_eq!(autotile_variant(R | L | U | D), Some(8));
        assert_eq!(autotile_variant(0), None);
        assert_eq!(autotile_variant(L | R), None);
        assert_eq!(autotile_variant(U), None);
    }

    #[test]
    fn autotile_assigns_variants_from_same_kind_neighbors() {
        // 3x3 block of grass with a stone tile to the right of the centre row.
        let mut map = TileMap::new(16);
        for y in 0..3 {
            for x in 0..3 {
                map.set_tile(GridTile::new(TileKind::Grass, 7, GridCoord::new(x, y)));
            }
        }
        map.set_tile(GridTile::new(TileKind::Stone, 7, GridCoord::new(3, 1)));
        map.set_tile(GridTile::new(TileKind::Decor, 7, GridCoord::new(5, 5)));

        map.autotile();
        let variant = |x, y| map.tile_at(GridCoord::new(x, y)).map(|t| t.variant);
        assert_eq!(variant(0, 0), Some(0));
        assert_eq!(variant(1, 0), Some(1));
        assert_eq!(variant(2, 0), Some(2));
        assert_eq!(variant(2, 1), Some(3));
        assert_eq!(variant(2, 2), Some(4));
        assert_eq!(variant(1, 2), Some(5));
        assert_eq!(variant(0, 2), Some(6));
        assert_eq!(variant(0, 1), Some(7));
        assert_eq!(variant(1, 1), Some(8));
        // isolated stone and non-terrain keep their variant
        assert_eq!(variant(3, 1), Some(7));
        assert_eq!(variant(5, 5), Some(7));

        assert_eq!(map.autotile(), 0);
    }

    #[test]
    fn queries_look_up_a_bounded_number_of_cells() {
        let mut map = TileMap::new(16);
        for y in 0..100 {
            for x in 0..100 {
                map.set_tile(tile(TileKind::Stone, x, y));
            }
        }
        assert_eq!(map.grid().len(), 10_000);

        map.grid().reset_lookups();
        assert_eq!(map.tiles_near(Vec2::new(800.0, 800.0)).count(), 9);
        assert_eq!(map.grid().lookups(), 9);

        map.grid().reset_lookups();
        let viewport = Vec2::new(300.0, 200.0);
        let drawn = map.visible_tiles(Vec2::new(400.0, 320.0), viewport).count();
        let budget = (300 / 16 + 2) * (200 / 16 + 2);
        assert!(map.grid().lookups() <= budget, "looked up {} cells", map.grid().lookups());
        assert_eq!(drawn, map.grid().lookups());
    }

    #[test]
    fn visible_tiles_are_offset_and_culled() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Grass, 2, 1));
        map.set_tile(tile(TileKind::Grass, 40, 1));
        map.push_offgrid(OffgridTile::new(TileKind::Decor, 3, Vec2::new(900.0, 900.0)));

        let sprites: Vec<TileSprite> = map
            .visible_tiles(Vec2::new(10.0, 4.0), Vec2::new(100.0, 100.0))
            .collect();
        assert_eq!(
            sprites,
            vec![
                TileSprite {
                    kind: TileKind::Decor,
                    variant: 3,
                    screen_pos: Vec2::new(890.0, 896.0),
                },
                TileSprite {
                    kind: TileKind::Grass,
                    variant: 0,
                    screen_pos: Vec2::new(22.0, 12.0),
                },
            ]
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");

        let mut map = floor_map();
        map.set_tile(GridTile::new(TileKind::Spawners, 1, GridCoord::new(-2, -7)));
        map.push_offgrid(OffgridTile::new(TileKind::LargeDecor, 2, Vec2::new(33.5, 12.125)));
        map.push_offgrid(OffgridTile::new(TileKind::Decor, 0, Vec2::new(-4.0, 0.1)));
        map.save(&path).unwrap();

        let loaded = TileMap::load(&path).unwrap();
        assert_eq!(loaded.tile_size(), 16);
        assert_eq!(loaded.grid().sorted_coords(), map.grid().sorted_coords());
        for coord in map.grid().sorted_coords() {
            assert_eq!(loaded.tile_at(coord), map.tile_at(coord));
        }
        assert_eq!(loaded.offgrid(), map.offgrid());
    }

    #[test]
    fn file_format_uses_string_keys() {
        let mut map = TileMap::new(16);
        map.set_tile(tile(TileKind::Stone, 4, 5));
        let value: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
        assert_eq!(value["tile_size"], 16);
        assert_eq!(value["tilemap"]["4;5"]["type"], "stone");
        assert_eq!(value["tilemap"]["4;5"]["pos"], serde_json::json!([4, 5]));
        assert_eq!(value["offgrid"], serde_json::json!([]));
    }

    #[test]
    fn load_distinguishes_missing_from_corrupt() {
        let dir = tempfile::tempdir().unwrap();

        let missing = TileMap::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, MapError::NotFound { .. }));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(TileMap::load(&garbage), Err(MapError::Corrupt { .. })));

        let unknown_kind = dir.path().join("unknown.json");
        std::fs::write(
            &unknown_kind,
            r#"{"tilemap": {"0;0": {"type": "lava", "variant": 0, "pos": [0, 0]}}, "tile_size": 16, "offgrid": []}"#,
        )
        .unwrap();
        assert!(matches!(TileMap::load(&unknown_kind), Err(MapError::Corrupt { .. })));

        let mismatched = dir.path().join("mismatched.json");
        std::fs::write(
            &mismatched,
            r#"{"tilemap": {"1;0": {"type": "grass", "variant": 0, "pos": [0, 0]}}, "tile_size": 16, "offgrid": []}"#,
        )
        .unwrap();
        assert!(matches!(TileMap::load(&mismatched), Err(MapError::Corrupt { .. })));
    }
}
