//! Headless level editor: brush selection, painting and erasing tiles.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::assets::AssetTable;
use crate::config::GameConfig;
use crate::grid::GridCoord;
use crate::math::{Rect, Vec2};
use crate::tilemap::{TileMap, TileSprite};
use crate::tiles::{GridTile, OffgridTile, TileKind};

/// Window pixels per display pixel.
pub const RENDER_SCALE: f32 = 2.0;

/// Scroll speed in display pixels per tick.
const SCROLL_SPEED: f32 = 2.0;

const DEFAULT_TILE_SIZE: u32 = 16;

/// Tile that the next click places.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub kind: TileKind,
    pub variant: u32,
}

pub struct EditorSession {
    path: PathBuf,
    assets: AssetTable,
    tilemap: TileMap,
    scroll: Vec2,
    group: usize,
    variant: u32,
    on_grid: bool,
}

impl EditorSession {
    /// Open the map at `path`, starting from an empty 16 px map if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, assets: AssetTable) -> Result<Self> {
        Self::open_with_tile_size(path, assets, DEFAULT_TILE_SIZE)
    }

    /// Open the configured editor map.
    pub fn from_config(config: &GameConfig, assets: AssetTable) -> Result<Self> {
        Self::open_with_tile_size(&config.editor_map, assets, config.tile_size)
    }

    fn open_with_tile_size(
        path: impl Into<PathBuf>,
        assets: AssetTable,
        tile_size: u32,
    ) -> Result<Self> {
        let path = path.into();
        if assets.category_count() == 0 {
            bail!("cannot edit {} without any tile categories", path.display());
        }

        let tilemap = match TileMap::load(&path) {
            Ok(map) => map,
            Err(e) if e.is_not_found() => {
                log::warn!("{} does not exist, starting an empty map", path.display());
                TileMap::new(tile_size)
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open {}", path.display()))
            }
        };
        assets
            .validate(&tilemap)
            .with_context(|| format!("{} references missing assets", path.display()))?;

        Ok(Self {
            path,
            assets,
            tilemap,
            scroll: Vec2::ZERO,
            group: 0,
            variant: 0,
            on_grid: false,
        })
    }

    /// File the session saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The map being edited.
    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    /// World offset of the top-left corner of the view.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Whether clicks snap to grid cells.
    pub fn is_on_grid(&self) -> bool {
        self.on_grid
    }

    /// Category and variant the next click places.
    pub fn brush(&self) -> Brush {
        let kind = self
            .assets
            .category(self.group)
            .unwrap_or(TileKind::Grass);
        Brush {
            kind,
            variant: self.variant,
        }
    }

    /// Step through tile categories, wrapping at either end. Resets the variant.
    pub fn cycle_group(&mut self, step: i32) {
        let count = self.assets.category_count() as i32;
        self.group = (self.group as i32 + step).rem_euclid(count) as usize;
        self.variant = 0;
    }

    /// Step through the variants of the current category, wrapping at either end.
    pub fn cycle_variant(&mut self, step: i32) {
        let count = self.assets.variant_count(self.brush().kind) as i32;
        if count == 0 {
            return;
        }
        self.variant = (self.variant as i32 + step).rem_euclid(count) as u32;
    }

    /// Switch between snapping to the grid and free placement.
    pub fn toggle_grid(&mut self) {
        self.on_grid = !self.on_grid;
    }

    /// Scroll for one tick; `direction` components are -1, 0 or 1.
    pub fn scroll_by(&mut self, direction: Vec2) {
        self.scroll += direction * SCROLL_SPEED;
    }

    /// Convert a window-space cursor position to display pixels.
    pub fn window_to_display(window: Vec2) -> Vec2 {
        window / RENDER_SCALE
    }

    /// Grid cell under the cursor.
    pub fn hovered_cell(&self, mouse: Vec2) -> GridCoord {
        GridCoord::from_pixel(mouse + self.scroll, self.tilemap.tile_size())
    }

    /// Display position of the translucent brush preview.
    pub fn preview_position(&self, mouse: Vec2) -> Vec2 {
        if self.on_grid {
            self.hovered_cell(mouse).to_pixel(self.tilemap.tile_size()) - self.scroll
        } else {
            mouse
        }
    }

    /// Apply a left click: paint the hovered cell on the grid, or drop a free tile.
    pub fn click(&mut self, mouse: Vec2) {
        if self.on_grid {
            self.paint(mouse);
        } else {
            self.place(mouse);
        }
    }

    /// Put the brush tile into the hovered grid cell, replacing what was there.
    pub fn paint(&mut self, mouse: Vec2) {
        let brush = self.brush();
        let cell = self.hovered_cell(mouse);
        self.tilemap
            .set_tile(GridTile::new(brush.kind, brush.variant, cell));
    }

    /// Add the brush tile off grid at the cursor's world position.
    pub fn place(&mut self, mouse: Vec2) {
        let brush = self.brush();
        self.tilemap
            .push_offgrid(OffgridTile::new(brush.kind, brush.variant, mouse + self.scroll));
    }

    /// Remove the hovered grid tile and every off-grid tile drawn under the cursor.
    pub fn erase(&mut self, mouse: Vec2) {
        self.tilemap.remove_tile(self.hovered_cell(mouse));

        let world = mouse + self.scroll;
        let assets = &self.assets;
        self.tilemap.retain_offgrid(|tile| {
            let Some(size) = assets.sprite_size(tile.kind, tile.variant) else {
                return true;
            };
            !Rect::from_pos_size(tile.pos, size).contains(world)
        });
    }

    /// Fix up terrain variants. Returns the number of tiles changed.
    pub fn autotile(&mut self) -> usize {
        self.tilemap.autotile()
    }

    /// Write the map back to [`path`](Self::path).
    pub fn save(&self) -> Result<()> {
        self.tilemap
            .save(&self.path)
            .with_context(|| format!("failed to save {}", self.path.display()))
    }

    /// Tiles to draw this frame, positioned relative to the scroll.
    pub fn visible_tiles(&self, viewport: Vec2) -> impl Iterator<Item = TileSprite> + '_ {
        self.tilemap
            .visible_tiles(self.scroll.as_ivec2().as_vec2(), viewport)
    }
}
