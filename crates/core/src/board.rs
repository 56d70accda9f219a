//! Board module - manages the grid of locked cells
//!
//! The board is a 10x20 grid where each cell is empty or holds the color of the
//! piece that locked there. Uses a flat array for cache locality and zero
//! allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use crate::piece::Piece;
use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const WIDTH: usize = BOARD_WIDTH as usize;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    /// One row of cells, left to right.
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * WIDTH;
        &self.cells[start..start + WIDTH]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(WIDTH)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Whether `piece`, shifted by `(offset_x, offset_y)`, would overlap a wall,
    /// the floor or a locked cell.
    ///
    /// Walls and floor are checked for every filled cell. Locked cells are only
    /// consulted for rows at or below the top edge, so a piece may hang partly
    /// above the board while spawning or rotating.
    pub fn is_collision(&self, piece: &Piece, offset_x: i8, offset_y: i8) -> bool {
        piece.shape().filled_cells().any(|(dx, dy)| {
            let x = piece.x + dx + offset_x;
            let y = piece.y + dy + offset_y;

            if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
                return true;
            }

            y >= 0 && self.cells[(y as usize) * WIDTH + (x as usize)].is_some()
        })
    }

    /// Write the piece's color into every filled cell that lies on the board.
    /// Cells above the top edge are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        let color = piece.color();
        for (dx, dy) in piece.shape().filled_cells() {
            self.set(piece.x + dx, piece.y + dy, Some(color));
        }
    }

    /// Remove every full row and return how many were removed.
    ///
    /// Scans bottom to top. A full row is cut out, everything above it shifts
    /// down one row and an empty row appears at the top; the same index is then
    /// checked again because it now holds the row that used to sit above.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT as usize;

        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.remove_row(row);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Shift rows `0..y` down by one (overwriting row `y`) and empty row 0.
    fn remove_row(&mut self, y: usize) {
        // copy_within handles the overlapping ranges
        self.cells.copy_within(0..y * WIDTH, WIDTH);
        self.cells[..WIDTH].fill(None);
    }

    /// True when anything is locked in the top row.
    pub fn is_game_over(&self) -> bool {
        self.row(0).iter().any(|cell| cell.is_some())
    }

    /// Create from a 2D vector for testing (converts to flat array)
    #[cfg(test)]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        assert_eq!(cells_2d.len(), BOARD_HEIGHT as usize);
        assert!(cells_2d.iter().all(|row| row.len() == WIDTH));

        let mut flat = [None; BOARD_SIZE];
        for (y, row) in cells_2d.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                flat[y * WIDTH + x] = *cell;
            }
        }
        Self { cells: flat }
    }

    /// Convert to 2D vector for testing/display
    #[cfg(test)]
    pub fn to_cells(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
