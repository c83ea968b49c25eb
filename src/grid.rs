// Fixed-size boolean grid used for walls and food

use crate::types::Position;

/// Immutable-by-convention 2D boolean array addressed by `(x, y)`
///
/// Cells are stored row by row (`y * width + x`). Reads outside the grid
/// return `false`; callers that need "outside counts as blocked" semantics use
/// [`Grid::is_blocked`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a grid with every cell set to `initial`
    pub fn new(width: usize, height: usize, initial: bool) -> Self {
        Grid {
            width,
            height,
            cells: vec![initial; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Flat index of an in-bounds position
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> bool {
        self.index_of(pos).map_or(false, |idx| self.cells[idx])
    }

    /// Like [`Grid::get`] but positions outside the grid read as set
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.index_of(pos).map_or(true, |idx| self.cells[idx])
    }

    /// Sets a cell; out-of-bounds writes are ignored
    pub fn set(&mut self, pos: Position, value: bool) {
        if let Some(idx) = self.index_of(pos) {
            self.cells[idx] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Number of orthogonal neighbours of `pos` that are blocked
    pub fn blocked_neighbors(&self, pos: Position) -> usize {
        pos.neighbors()
            .iter()
            .filter(|&&n| self.is_blocked(n))
            .count()
    }

    /// Positions of every set cell, column by column (x-major, then y)
    pub fn as_list(&self) -> Vec<Position> {
        let mut out = Vec::with_capacity(self.count());
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = Position::new(x as i32, y as i32);
                if self.get(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_reads() {
        let grid = Grid::new(3, 2, false);
        assert!(!grid.get(Position::new(-1, 0)));
        assert!(grid.is_blocked(Position::new(-1, 0)));
        assert!(grid.is_blocked(Position::new(0, 2)));
        assert!(!grid.is_blocked(Position::new(2, 1)));
    }

    #[test]
    fn test_set_and_count() {
        let mut grid = Grid::new(4, 4, false);
        grid.set(Position::new(1, 2), true);
        grid.set(Position::new(3, 3), true);
        grid.set(Position::new(9, 9), true);
        assert_eq!(grid.count(), 2);
        assert_eq!(
            grid.as_list(),
            vec![Position::new(1, 2), Position::new(3, 3)]
        );
    }

    #[test]
    fn test_blocked_neighbors_counts_border_as_blocked() {
        let grid = Grid::new(3, 3, false);
        assert_eq!(grid.blocked_neighbors(Position::new(0, 0)), 2);
        assert_eq!(grid.blocked_neighbors(Position::new(1, 1)), 0);
        assert_eq!(grid.blocked_neighbors(Position::new(1, 0)), 1);
    }
}
