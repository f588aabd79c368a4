//! Tile categories and placed tile records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::GridCoord;
use crate::math::Vec2;

/// Tile category. Names match the asset folders and the map file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
}

/// Static behaviour flags for a tile category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCapabilities {
    /// Takes part in collision queries.
    pub physical: bool,
    /// Variant is recomputed from same-kind neighbours by autotiling.
    pub autotile: bool,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
    ];

    /// Static behaviour flags for this category.
    pub const fn capabilities(self) -> TileCapabilities {
        match self {
            TileKind::Grass | TileKind::Stone => TileCapabilities {
                physical: true,
                autotile: true,
            },
            TileKind::Decor | TileKind::LargeDecor | TileKind::Spawners => TileCapabilities {
                physical: false,
                autotile: false,
            },
        }
    }

    /// Solid for collision.
    pub const fn is_physical(self) -> bool {
        self.capabilities().physical
    }

    /// Variant is chosen by autotiling.
    pub const fn is_autotile(self) -> bool {
        self.capabilities().autotile
    }

    /// Name used in map files and asset folders.
    pub const fn as_str(self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::Decor => "decor",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed tile. `P` is a grid cell for on-grid tiles and a pixel
/// position for off-grid tiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile<P> {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u32,
    pub pos: P,
}

pub type GridTile = Tile<GridCoord>;
pub type OffgridTile = Tile<Vec2>;

impl<P> Tile<P> {
    /// Create a tile of `kind` and `variant` at `pos`.
    pub fn new(kind: TileKind, variant: u32, pos: P) -> Self {
        Self { kind, variant, pos }
    }

    /// True if this tile's `(kind, variant)` pair is one of `ids`.
    pub fn matches(&self, ids: &[(TileKind, u32)]) -> bool {
        ids.iter()
            .any(|&(kind, variant)| self.kind == kind && self.variant == variant)
    }
}

impl GridTile {
    /// Top-left pixel position of the tile's cell.
    pub fn pixel_pos(&self, tile_size: u32) -> Vec2 {
        self.pos.to_pixel(tile_size)
    }

    /// Copy of this tile positioned in pixels rather than cells.
    pub fn to_pixel_tile(&self, tile_size: u32) -> OffgridTile {
        Tile::new(self.kind, self.variant, self.pixel_pos(tile_size))
    }
}
