//! Grid model: tile types, traversal rules, and the playfield itself.

use bitflags::bitflags;
use glam::{IVec2, UVec2};

pub mod direction;
pub mod parser;

bitflags! {
    /// Which classes of actor may occupy a tile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraversalFlags: u8 {
        const PLAYER = 1 << 0;
        const GHOST = 1 << 1;
        /// Ghosts that have not yet left the house.
        const HOUSEBOUND = 1 << 2;
    }
}

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// An empty tile.
    Empty,
    /// A wall tile.
    Wall,
    /// A regular pellet.
    Pellet,
    /// A power pellet.
    PowerPellet,
    /// The player's starting position.
    PlayerSpawn,
    /// Ghost house interior.
    House,
    /// The ghost house door.
    Door,
}

impl MapTile {
    /// Returns the traversal flags for this tile.
    pub fn traversal_flags(self) -> TraversalFlags {
        match self {
            MapTile::Wall => TraversalFlags::empty(),
            MapTile::House | MapTile::Door => TraversalFlags::HOUSEBOUND,
            _ => TraversalFlags::all(),
        }
    }

    /// Whether the tile is a collectible item.
    pub fn is_item(self) -> bool {
        matches!(self, MapTile::Pellet | MapTile::PowerPellet)
    }

    /// Whether the tile is part of the open playfield, outside the house.
    pub fn is_playable(self) -> bool {
        matches!(
            self,
            MapTile::Empty | MapTile::Pellet | MapTile::PowerPellet | MapTile::PlayerSpawn
        )
    }
}

/// The playfield: a rectangular, row-major tile grid.
///
/// Columns past either horizontal edge are treated as open warp space, so
/// passability checks only reject positions that leave the grid vertically.
#[derive(Debug, Clone)]
pub struct Grid {
    /// The size of the grid, in cells.
    pub size: UVec2,
    tiles: Vec<MapTile>,
}

impl Grid {
    /// Creates a grid from row-major tile data. The tile count must match the size.
    pub fn from_tiles(size: UVec2, tiles: Vec<MapTile>) -> Grid {
        debug_assert_eq!(tiles.len(), (size.x * size.y) as usize);
        Grid { size, tiles }
    }

    pub fn width(&self) -> i32 {
        self.size.x as i32
    }

    pub fn height(&self) -> i32 {
        self.size.y as i32
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width() && pos.y >= 0 && pos.y < self.height()
    }

    fn index(&self, pos: IVec2) -> usize {
        (pos.y * self.width() + pos.x) as usize
    }

    /// Returns the tile at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: IVec2) -> Option<MapTile> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    /// Whether an actor with the given flags may occupy `pos`.
    ///
    /// Positions past the left or right edge are passable as long as the row
    /// exists, which is what lets actors enter a horizontal warp.
    pub fn passable(&self, pos: IVec2, flags: TraversalFlags) -> bool {
        if pos.x < 0 || pos.x >= self.width() {
            return pos.y >= 0 && pos.y < self.height();
        }
        match self.get(pos) {
            Some(tile) => tile.traversal_flags().intersects(flags),
            None => false,
        }
    }

    /// Wraps a horizontally out-of-range position onto the opposite edge.
    pub fn wrap_x(&self, pos: IVec2) -> IVec2 {
        if pos.x < 0 {
            IVec2::new(self.width() - 1, pos.y)
        } else if pos.x >= self.width() {
            IVec2::new(0, pos.y)
        } else {
            pos
        }
    }

    /// Removes and returns the item at `pos`, if the tile holds one.
    pub fn take_item(&mut self, pos: IVec2) -> Option<MapTile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let index = self.index(pos);
        let tile = self.tiles[index];
        if tile.is_item() {
            self.tiles[index] = MapTile::Empty;
            Some(tile)
        } else {
            None
        }
    }

    /// Counts the remaining pellets and power pellets.
    pub fn count_items(&self) -> (u32, u32) {
        let mut pellets = 0;
        let mut power_pellets = 0;
        for tile in &self.tiles {
            match tile {
                MapTile::Pellet => pellets += 1,
                MapTile::PowerPellet => power_pellets += 1,
                _ => {}
            }
        }
        (pellets, power_pellets)
    }

    /// Iterates positions holding the given tile, in row-major order.
    pub fn positions_of(&self, tile: MapTile) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width();
        self.tiles.iter().enumerate().filter_map(move |(i, t)| {
            if *t == tile {
                Some(IVec2::new(i as i32 % width, i as i32 / width))
            } else {
                None
            }
        })
    }

    /// Iterates all tiles with their positions, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, MapTile)> + '_ {
        let width = self.width();
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (IVec2::new(i as i32 % width, i as i32 / width), *t))
    }
}
