//! The fixed 5x3 game grid and mapping of positions onto it

use serde::{Deserialize, Serialize};

/// Number of rows in the game field
pub const GRID_ROWS: usize = 5;
/// Number of columns in the game field
pub const GRID_COLS: usize = 3;
/// Total number of cells
pub const GRID_CELLS: usize = GRID_ROWS * GRID_COLS;

/// Zero-based coordinate of a cell, as reported by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i64,
    pub col: i64,
}

impl Position {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Index of the cell this position points at, or `None` if it is off the grid
    pub fn cell_index(&self) -> Option<usize> {
        let in_rows = (0..GRID_ROWS as i64).contains(&self.row);
        let in_cols = (0..GRID_COLS as i64).contains(&self.col);
        if in_rows && in_cols {
            Some(self.row as usize * GRID_COLS + self.col as usize)
        } else {
            None
        }
    }

    /// Human-readable form, e.g. "2 столбик 1 квадрат" for row 0, col 1
    pub fn describe(&self) -> String {
        // widened so off-grid values from the service cannot overflow
        let col = i128::from(self.col) + 1;
        let row = i128::from(self.row) + 1;
        format!("{} столбик {} квадрат", col, row)
    }
}

/// Summary of positions, joined the way the result card shows them
pub fn summarize(positions: &[Position]) -> String {
    positions
        .iter()
        .map(Position::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub winning: bool,
}

/// Grid derived from a list of positions. Never stored, always rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    winning: [bool; GRID_CELLS],
}

impl Grid {
    /// Grid with no winning cells
    pub fn empty() -> Self {
        Self {
            winning: [false; GRID_CELLS],
        }
    }

    pub fn from_positions(positions: &[Position]) -> Self {
        let mut grid = Self::empty();
        for index in positions.iter().filter_map(Position::cell_index) {
            grid.winning[index] = true;
        }
        grid
    }

    pub fn is_winning(&self, row: usize, col: usize) -> bool {
        row < GRID_ROWS && col < GRID_COLS && self.winning[row * GRID_COLS + col]
    }

    pub fn winning_count(&self) -> usize {
        self.winning.iter().filter(|w| **w).count()
    }

    /// Winning flags in cell index order
    pub fn flags(&self) -> [bool; GRID_CELLS] {
        self.winning
    }

    /// All cells in index order (row-major)
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.winning.iter().enumerate().map(|(index, winning)| Cell {
            index,
            row: index / GRID_COLS,
            col: index % GRID_COLS,
            winning: *winning,
        })
    }

    /// Cells grouped by row, top to bottom
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let cells: Vec<Cell> = self.cells().collect();
        cells.chunks(GRID_COLS).map(|row| row.to_vec()).collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}
