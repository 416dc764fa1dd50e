// Read-only query surface over cell occupancy, owned by the session and
// consumed by every search component. Search code only ever borrows a Grid
// immutably; all mutation happens in the session between decision calls.

use crate::types::{Coord, Tile};

#[derive(Debug, Clone)]
pub struct Grid {
    cols: i32,
    rows: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(cols: i32, rows: i32) -> Self {
        assert!(cols > 0 && rows > 0, "grid dimensions must be positive");
        Grid {
            cols,
            rows,
            tiles: vec![Tile::Empty; (cols * rows) as usize],
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.cols && coord.y >= 0 && coord.y < self.rows
    }

    /// Encoded cell index (`x + cols * y`), shared with DirectionMap keys.
    pub fn cell_index(&self, coord: Coord) -> usize {
        (coord.x + self.cols * coord.y) as usize
    }

    /// Occupancy at (x, y). Out-of-bounds queries are a caller bug.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        debug_assert!(self.in_bounds(Coord::new(x, y)), "tile_at out of bounds");
        self.tiles[(x + self.cols * y) as usize]
    }

    pub fn set_tile(&mut self, coord: Coord, tile: Tile) {
        debug_assert!(self.in_bounds(coord), "set_tile out of bounds");
        let idx = self.cell_index(coord);
        self.tiles[idx] = tile;
    }

    /// Resets every cell to empty
    pub fn clear(&mut self) {
        for tile in self.tiles.iter_mut() {
            *tile = Tile::Empty;
        }
    }

    /// Number of cells not occupied by a snake. Fruit tiles count as free
    /// for spawn purposes since a new fruit replaces the old one.
    pub fn free_cell_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Tile::Empty | Tile::Fruit))
            .count()
    }

    /// Walks the board column-major and returns the nth free cell. Used for
    /// fruit spawning at a constant rate regardless of snake size.
    pub fn nth_free_cell(&self, n: usize) -> Option<Coord> {
        let mut free_found = 0;
        for x in 0..self.cols {
            for y in 0..self.rows {
                match self.tile_at(x, y) {
                    Tile::Empty | Tile::Fruit => {
                        if free_found == n {
                            return Some(Coord::new(x, y));
                        }
                        free_found += 1;
                    }
                    _ => {}
                }
            }
        }
        None
    }
}
