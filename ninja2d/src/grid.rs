//! Sparse grid storage for on-grid tiles.
//!
//! Cells are keyed by integer coordinates and only occupied cells are stored,
//! so maps can extend in any direction (including negative coordinates).

#[cfg(test)]
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;
use crate::tiles::GridTile;

/// A cell in the grid (grid coordinates).
///
/// Serialized inside tiles as `[x, y]`; used as a map-file key as `"x;y"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a world pixel position.
    pub fn from_pixel(pos: Vec2, tile_size: u32) -> Self {
        let size = tile_size as f32;
        Self {
            x: (pos.x / size).floor() as i32,
            y: (pos.y / size).floor() as i32,
        }
    }

    /// Top-left pixel of this cell.
    pub fn to_pixel(self, tile_size: u32) -> Vec2 {
        Vec2::new(
            (self.x * tile_size as i32) as f32,
            (self.y * tile_size as i32) as f32,
        )
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }
}

impl From<[i32; 2]> for GridCoord {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<GridCoord> for [i32; 2] {
    fn from(coord: GridCoord) -> Self {
        [coord.x, coord.y]
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

/// Error returned when a `"x;y"` key cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid grid key {0:?}, expected \"x;y\"")]
pub struct ParseCoordError(pub String);

impl FromStr for GridCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError(s.to_string());
        let (x, y) = s.split_once(';').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Self { x, y })
    }
}

/// Orthogonal neighbour directions, each with its own mask bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub const fn bit(self) -> u8 {
        match self {
            Direction::Right => 0b0001,
            Direction::Left => 0b0010,
            Direction::Up => 0b0100,
            Direction::Down => 0b1000,
        }
    }
}

/// Sparse mapping from cell to the tile placed there.
#[derive(Clone, Debug, Default)]
pub struct GridIndex {
    cells: HashMap<GridCoord, GridTile>,
    #[cfg(test)]
    lookups: Cell<usize>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a tile at its own `pos`, overwriting whatever was there.
    pub fn set(&mut self, tile: GridTile) -> Option<GridTile> {
        self.cells.insert(tile.pos, tile)
    }

    /// Remove the tile at `coord`. Absent cells are a no-op.
    pub fn remove(&mut self, coord: GridCoord) -> Option<GridTile> {
        self.cells.remove(&coord)
    }

    pub fn get(&self, coord: GridCoord) -> Option<&GridTile> {
        #[cfg(test)]
        self.lookups.set(self.lookups.get() + 1);
        self.cells.get(&coord)
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut GridTile> {
        self.cells.get_mut(&coord)
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Tiles present in the four orthogonal neighbour cells.
    pub fn neighbors(&self, coord: GridCoord) -> impl Iterator<Item = (Direction, &GridTile)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.get(coord.step(dir)).map(|tile| (dir, tile)))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All tiles, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &GridTile> {
        self.cells.values()
    }

    /// Occupied cells sorted by row, then column.
    pub fn sorted_coords(&self) -> Vec<GridCoord> {
        let mut coords: Vec<GridCoord> = self.cells.keys().copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        coords
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[cfg(test)]
    pub(crate) fn lookups(&self) -> usize {
        self.lookups.get()
    }

    #[cfg(test)]
    pub(crate) fn reset_lookups(&self) {
        self.lookups.set(0);
    }
}
