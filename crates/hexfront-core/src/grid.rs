//! Flat tile storage addressed by offset coordinates.
//!
//! Storage is `width * height` cells in row-major order. Shifted (odd) rows
//! have one fewer playable tile: their last storage slot is a phantom column
//! that `contains` rejects and `at` never hands out.

use std::cell::Cell;

use crate::hex::{GridRect, GridSize, HexCoord};
use crate::spread::Channel;
use crate::tile::Tile;

/// The hex grid.
///
/// Owns the tiles and the two visit-generation counters used by the spread
/// engine. Counters live on the grid value, so independent grids never share
/// traversal state.
#[derive(Debug, Clone, Default)]
pub struct HexGrid {
    tiles: Vec<Tile>,
    size: GridSize,
    generations: [Cell<u64>; 2],
}

impl HexGrid {
    /// Create a grid filled with default tiles
    pub fn new(size: GridSize) -> Self {
        let mut grid = Self::default();
        grid.empty(size);
        grid
    }

    /// Drop every tile and reallocate default tiles at `size`
    pub fn empty(&mut self, size: GridSize) {
        let size = GridSize::new(size.width.max(0), size.height.max(0));
        self.tiles = vec![Tile::default(); size.area()];
        self.size = size;
    }

    /// Reset every tile in place, keeping the current size
    pub fn clear(&mut self) {
        self.empty(self.size);
    }

    /// Reallocate to `rect`, given relative to the current bounds.
    ///
    /// The overlap of old and new bounds is copied to its translated
    /// position; everything else starts as a default tile.
    pub fn resize(&mut self, rect: GridRect) {
        let old = std::mem::take(&mut self.tiles);
        let old_size = self.size;
        self.empty(rect.size());

        for (index, tile) in old.into_iter().enumerate() {
            let x = index as i32 % old_size.width;
            let y = index as i32 / old_size.width;
            let pos = HexCoord::new(x - rect.x, y - rect.y);
            if let Some(slot) = self.slot(pos) {
                self.tiles[slot] = tile;
            }
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of in-bounds tiles (phantom columns excluded)
    pub fn count(&self) -> usize {
        self.positions().count()
    }

    /// Whether a coordinate names a playable tile
    pub fn contains(&self, pos: HexCoord) -> bool {
        self.size.contains(pos)
    }

    /// Get the tile at a coordinate, or `None` outside the grid
    pub fn at(&self, pos: HexCoord) -> Option<&Tile> {
        if !self.contains(pos) {
            return None;
        }
        self.tiles.get(self.index(pos))
    }

    pub fn at_mut(&mut self, pos: HexCoord) -> Option<&mut Tile> {
        if !self.contains(pos) {
            return None;
        }
        let index = self.index(pos);
        self.tiles.get_mut(index)
    }

    /// Every playable coordinate in row-major order
    pub fn positions(&self) -> impl Iterator<Item = HexCoord> + '_ {
        let GridSize { width, height } = self.size;
        (0..height)
            .flat_map(move |y| (0..width).map(move |x| HexCoord::new(x, y)))
            .filter(move |&pos| self.contains(pos))
    }

    /// Every playable tile in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, &Tile)> + '_ {
        self.positions().filter_map(move |pos| Some((pos, self.at(pos)?)))
    }

    /// Playable tiles inside `rect`, for renderers
    pub fn area(&self, rect: GridRect) -> impl Iterator<Item = (HexCoord, &Tile)> + '_ {
        (rect.y..rect.y + rect.height)
            .flat_map(move |y| (rect.x..rect.x + rect.width).map(move |x| HexCoord::new(x, y)))
            .filter_map(move |pos| Some((pos, self.at(pos)?)))
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Advance a channel's generation and return the fresh stamp
    pub(crate) fn next_stamp(&self, channel: Channel) -> u64 {
        let counter = &self.generations[channel.index()];
        counter.set(counter.get() + 1);
        counter.get()
    }

    /// Current stamp of a channel
    pub(crate) fn generation(&self, channel: Channel) -> u64 {
        self.generations[channel.index()].get()
    }

    fn slot(&self, pos: HexCoord) -> Option<usize> {
        self.contains(pos).then(|| self.index(pos))
    }

    fn index(&self, pos: HexCoord) -> usize {
        (pos.y * self.size.width + pos.x) as usize
    }
}
