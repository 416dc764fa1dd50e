// Core board types shared by the live game and every search component.
// Coordinates are screen-style: x grows eastward, y grows southward, so
// North is y-1 and South is y+1.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 2D coordinate on the board (column, row)
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Manhattan distance to another coordinate
    pub fn manhattan_distance(&self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// The four possible movement directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// String representation for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// The opposite direction. A direction may never be queued immediately
    /// after its opposite.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: Coord) -> Coord {
        match self {
            Direction::North => Coord::new(coord.x, coord.y - 1),
            Direction::South => Coord::new(coord.x, coord.y + 1),
            Direction::East => Coord::new(coord.x + 1, coord.y),
            Direction::West => Coord::new(coord.x - 1, coord.y),
        }
    }

    /// The direction of a single-cell step from one coordinate to an
    /// adjacent one. Any non-unit delta is a modeling bug in the caller.
    pub fn from_step(from: Coord, to: Coord) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (0, 1) => Some(Direction::South),
            (0, -1) => Some(Direction::North),
            _ => None,
        }
    }
}

/// Occupancy of a single board cell
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Fruit,
    SnakeBody,
    SnakeHead,
}

/// Ordered sequence of positions, head-first, tail-last
pub type SnakeBody = VecDeque<Coord>;

/// Head position of a snake body. Bodies are never empty while alive.
pub fn head_of(body: &SnakeBody) -> Coord {
    *body.front().expect("snake body must not be empty")
}

/// Advances a body one cell in the given direction without growing:
/// the head moves, the tail cell is dropped, length is conserved.
pub fn advance_body(body: &mut SnakeBody, dir: Direction) {
    let new_head = dir.apply(head_of(body));
    body.push_front(new_head);
    body.pop_back();
}
