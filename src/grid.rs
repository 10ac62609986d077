//! The playfield: a 20x10 matrix of color ids stored row-major in one buffer.
//!
//! `0` is an empty cell, `1..=7` is the color of the shape that was locked
//! there. The same type doubles as a scratch mask for collision tests and as
//! the render overlay for the falling shape.

use crate::error::EngineError;
use crate::shape::{Shape, SHAPE_COLS, SHAPE_ROWS};

// ============================================================================
// Configuration
// ============================================================================

pub const ROWS: usize = 20;
pub const COLS: usize = 10;

/// Highest color id a cell may hold.
pub const MAX_COLOR: u8 = 7;

const CELL_COUNT: usize = ROWS * COLS;

/// A scratch board, same geometry as the playfield.
pub type Mask = Grid;

// ============================================================================
// Grid
// ============================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: [u8; CELL_COUNT],
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [0; CELL_COUNT],
        }
    }

    /// Builds a grid from literal rows, top row first.
    pub fn from_rows(rows: [[u8; COLS]; ROWS]) -> Result<Self, EngineError> {
        let mut grid = Self::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, &color) in row.iter().enumerate() {
                if !grid.set(r, c, color) {
                    return Err(EngineError::InvalidCell { row: r, col: c, color });
                }
            }
        }
        Ok(grid)
    }

    #[inline]
    fn index(row: usize, col: usize) -> usize {
        row * COLS + col
    }

    pub fn zero(&mut self) {
        self.cells.fill(0);
    }

    /// Cell color, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < ROWS && col < COLS {
            Some(self.cells[Self::index(row, col)])
        } else {
            None
        }
    }

    /// Returns false for out-of-range coordinates or colors.
    pub fn set(&mut self, row: usize, col: usize, color: u8) -> bool {
        if row >= ROWS || col >= COLS || color > MAX_COLOR {
            return false;
        }
        self.cells[Self::index(row, col)] = color;
        true
    }

    /// One row of cells, `None` below the floor.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        (row < ROWS).then(|| self.row_cells(row))
    }

    fn row_cells(&self, row: usize) -> &[u8] {
        &self.cells[row * COLS..(row + 1) * COLS]
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        row < ROWS && self.row_cells(row).iter().all(|&c| c != 0)
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        row >= ROWS || self.row_cells(row).iter().all(|&c| c == 0)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Writes the shape's color into every empty cell it covers.
    ///
    /// Occupied map cells that land outside the grid are skipped, and cells
    /// that already hold a color are left untouched.
    pub fn stamp(&mut self, shape: &Shape) {
        for rs in 0..SHAPE_ROWS {
            for cs in 0..SHAPE_COLS {
                if shape.map[rs][cs] == 0 {
                    continue;
                }
                let row = shape.row + rs as i32;
                let col = shape.col + cs as i32;
                if row < 0 || col < 0 || row >= ROWS as i32 || col >= COLS as i32 {
                    continue;
                }
                let idx = Self::index(row as usize, col as usize);
                if self.cells[idx] == 0 {
                    self.cells[idx] = shape.color;
                }
            }
        }
    }

    /// Walks upward from `from_row` across non-empty rows.
    ///
    /// Returns the index just below the first empty row met, or `-1` when
    /// every row up to the ceiling is occupied.
    pub fn top_row_estimate(&self, from_row: i32) -> i32 {
        let mut row = from_row.min(ROWS as i32 - 1);
        while row >= 0 {
            if self.is_row_empty(row as usize) {
                return row + 1;
            }
            row -= 1;
        }
        -1
    }

    /// Zeroes every full row from the floor up to `top_row` and compacts the
    /// survivors downward. Returns how many rows were cleared.
    pub fn clear_full_rows(&mut self, top_row: usize) -> u32 {
        let top_row = top_row.min(ROWS - 1);
        let mut vacated = [false; ROWS];
        let mut count = 0;

        for r in (top_row..ROWS).rev() {
            if self.is_row_full(r) {
                self.cells[r * COLS..(r + 1) * COLS].fill(0);
                vacated[r] = true;
                count += 1;
            }
        }

        if count == 0 {
            return 0;
        }

        let mut r = ROWS - 1;
        while r > top_row {
            if vacated[r] {
                let mut rr = r;
                while vacated[rr] && rr > top_row {
                    rr -= 1;
                }
                self.cells
                    .copy_within(rr * COLS..(rr + 1) * COLS, r * COLS);
                self.cells[rr * COLS..(rr + 1) * COLS].fill(0);
                vacated[r] = false;
                vacated[rr] = true;
            }
            r -= 1;
        }

        count
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
