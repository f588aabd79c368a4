use crate::tiles::OffgridTile;

/// Decorative tiles placed at arbitrary pixel positions, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OffgridLayer {
    tiles: Vec<OffgridTile>,
}

impl OffgridLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tile; it is drawn after every tile added before it.
    pub fn push(&mut self, tile: OffgridTile) {
        self.tiles.push(tile);
    }

    /// Remove the first tile equal to `tile`. Returns whether one was removed.
    pub fn remove(&mut self, tile: &OffgridTile) -> bool {
        match self.tiles.iter().position(|t| t == tile) {
            Some(index) => {
                self.tiles.remove(index);
                true
            }
            None => false,
        }
    }

    /// Keep only the tiles for which `keep` returns true, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&OffgridTile) -> bool) {
        self.tiles.retain(keep);
    }

    /// Tiles in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, OffgridTile> {
        self.tiles.iter()
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the layer holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in insertion order, as a slice.
    pub fn as_slice(&self) -> &[OffgridTile] {
        &self.tiles
    }

    /// Remove every tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

impl From<Vec<OffgridTile>> for OffgridLayer {
    fn from(tiles: Vec<OffgridTile>) -> Self {
        Self { tiles }
    }
}

impl<'a> IntoIterator for &'a OffgridLayer {
    type Item = &'a OffgridTile;
    type IntoIter = std::slice::Iter<'a, OffgridTile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}
