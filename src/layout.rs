// Text layouts
//
// Character legend:
//   %  wall          .  food         o  power capsule
//   P  Pacman        G  ghost        1-9 ghost with explicit ordering
//   (space) empty floor
//
// The first text row is the top of the board (highest y).

use std::fs;
use std::path::Path;

use crate::grid::Grid;
use crate::types::Position;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown layout character '{ch}' at row {row}, column {col}")]
    UnknownChar { ch: char, row: usize, col: usize },

    #[error("layout has no Pacman start")]
    MissingPacman,

    #[error("layout has more than one Pacman start")]
    MultiplePacman,

    #[error("failed to read layout file: {0}")]
    Io(String),
}

/// Static description of a board before the game starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    walls: Grid,
    food: Grid,
    capsules: Vec<Position>,
    agent_starts: Vec<Position>,
}

impl Layout {
    /// Parses a layout from newline-separated rows. Empty lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| LayoutError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::parse(&contents)
    }

    /// Builds a layout from rows listed top to bottom
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut walls = Grid::new(width, height, false);
        let mut food = Grid::new(width, height, false);
        let mut capsules = Vec::new();
        // (ordering key, position); Pacman sorts first with key 0
        let mut agents: Vec<(u32, Position)> = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }

            let y = (height - 1 - row) as i32;
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(col as i32, y);
                match ch {
                    '%' => walls.set(pos, true),
                    '.' => food.set(pos, true),
                    'o' => capsules.push(pos),
                    'P' => {
                        if agents.iter().any(|&(key, _)| key == 0) {
                            return Err(LayoutError::MultiplePacman);
                        }
                        agents.push((0, pos));
                    }
                    'G' => agents.push((1, pos)),
                    '1'..='9' => agents.push((ch.to_digit(10).unwrap_or(1), pos)),
                    ' ' => {}
                    _ => return Err(LayoutError::UnknownChar { ch, row, col }),
                }
            }
        }

        if !agents.iter().any(|&(key, _)| key == 0) {
            return Err(LayoutError::MissingPacman);
        }
        agents.sort_by_key(|&(key, pos)| (key, pos.x, pos.y));
        capsules.sort_by_key(|pos| (pos.x, pos.y));

        Ok(Layout {
            walls,
            food,
            capsules,
            agent_starts: agents.into_iter().map(|(_, pos)| pos).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.walls.width()
    }

    pub fn height(&self) -> usize {
        self.walls.height()
    }

    pub fn walls(&self) -> &Grid {
        &self.walls
    }

    pub fn food(&self) -> &Grid {
        &self.food
    }

    pub fn capsules(&self) -> &[Position] {
        &self.capsules
    }

    /// Start cells indexed by agent: Pacman first, then ghosts
    pub fn agent_starts(&self) -> &[Position] {
        &self.agent_starts
    }

    pub fn num_ghosts(&self) -> usize {
        self.agent_starts.len().saturating_sub(1)
    }
}
