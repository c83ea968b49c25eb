// Core value types shared by the game rules, the heuristic and the search

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D coordinate on the board, origin at the south-west corner
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Taxicab distance between two positions
    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Vector pointing from `self` to `other`
    pub fn vector_to(&self, other: Position) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// The four orthogonal neighbours, in North, South, East, West order
    pub fn neighbors(&self) -> [Position; 4] {
        [
            Direction::North.apply(self),
            Direction::South.apply(self),
            Direction::East.apply(self),
            Direction::West.apply(self),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement actions available to every agent. `Stop` keeps the agent in place.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    /// Returns all actions in canonical enumeration order
    pub fn all() -> [Direction; 5] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Stop,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Stop => "stop",
        }
    }

    /// Unit movement vector; `Stop` is the zero vector
    pub fn vector(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }

    pub fn reverse(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }

    /// Calculates the next position when moving in this direction
    pub fn apply(&self, pos: &Position) -> Position {
        let (dx, dy) = self.vector();
        Position {
            x: pos.x + dx,
            y: pos.y + dy,
        }
    }

    /// Dot product of this heading with an arbitrary vector
    pub fn dot(&self, v: (i32, i32)) -> i32 {
        let (dx, dy) = self.vector();
        dx * v.0 + dy * v.1
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "up" => Ok(Direction::North),
            "south" | "s" | "down" => Ok(Direction::South),
            "east" | "e" | "right" => Ok(Direction::East),
            "west" | "w" | "left" => Ok(Direction::West),
            "stop" | "x" => Ok(Direction::Stop),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}
