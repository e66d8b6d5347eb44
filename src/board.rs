//! Game board representation and line clearing

use crate::tetromino::{ColorIndex, Shape};
use std::ops::Range;

/// Default board dimensions
pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 20;

/// Smallest and largest accepted board side
pub const MIN_SIDE: usize = 4;
pub const MAX_SIDE: usize = 40;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ColorIndex),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// Outcome of a line-clear pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineClear {
    /// Indices the removed rows had before compaction, top to bottom
    pub removed_rows: Vec<usize>,
    /// Final indices of the empty rows inserted at the top
    pub inserted_rows: Range<usize>,
}

impl LineClear {
    pub fn count(&self) -> usize {
        self.removed_rows.len()
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Grid stored as [row][col], row 0 is the top, rows increase downward
    rows: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    /// Create a new empty board. Dimensions are clamped to MIN_SIDE..=MAX_SIDE.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.clamp(MIN_SIDE, MAX_SIDE);
        let height = height.clamp(MIN_SIDE, MAX_SIDE);
        Self {
            width,
            height,
            rows: vec![vec![Cell::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// Get the cell at (x, y). Returns None if out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Set the cell at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self
            .rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Rows top to bottom, for rendering
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|row| row.as_slice())
    }

    /// Write `color` wherever `shape` is set, with its top-left at (x, y).
    ///
    /// Cells above row 0 are dropped. Returns false if any cell fell outside
    /// the side or bottom edges; such cells are skipped.
    pub fn place_cells(&mut self, shape: &Shape, x: i32, y: i32, color: ColorIndex) -> bool {
        let mut all_placed = true;
        for (dr, dc) in shape.cells() {
            let (cx, cy) = (x + dc, y + dr);
            if cy < 0 {
                continue;
            }
            if !self.set(cx, cy, Cell::Filled(color)) {
                all_placed = false;
            }
        }
        all_placed
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|cell| cell.is_filled()))
    }

    /// Remove every full row, shift the rest down and refill the top with
    /// empty rows so the board keeps its height.
    pub fn clear_full_rows(&mut self) -> LineClear {
        let removed_rows: Vec<usize> = (0..self.height).filter(|&y| self.is_row_full(y)).collect();
        if removed_rows.is_empty() {
            return LineClear::default();
        }

        let width = self.width;
        let cleared = removed_rows.len();
        let mut kept: Vec<Vec<Cell>> = Vec::with_capacity(self.height);
        kept.extend(std::iter::repeat_with(|| vec![Cell::Empty; width]).take(cleared));
        kept.extend(
            std::mem::take(&mut self.rows)
                .into_iter()
                .filter(|row| !row.iter().all(|cell| cell.is_filled())),
        );
        self.rows = kept;

        LineClear {
            removed_rows,
            inserted_rows: 0..cleared,
        }
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(value: u8) -> ColorIndex {
        ColorIndex::new(value).unwrap()
    }

    fn fill_row(board: &mut Board, y: i32, value: u8) {
        for x in 0..board.width() as i32 {
            board.set(x, y, Cell::Filled(color(value)));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::default();
        assert!(board.is_empty());
        assert_eq!(board.width(), DEFAULT_WIDTH);
        assert_eq!(board.height(), DEFAULT_HEIGHT);
    }

    #[test]
    fn test_dimensions_are_clamped() {
        let board = Board::new(1, 100);
        assert_eq!(board.width(), MIN_SIDE);
        assert_eq!(board.height(), MAX_SIDE);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::default();
        assert!(board.set(5, 5, Cell::Filled(color(3))));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(color(3))));
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::default();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(0, DEFAULT_HEIGHT as i32), None);
        assert_eq!(board.get(DEFAULT_WIDTH as i32, 0), None);
    }

    #[test]
    fn test_row_full() {
        let mut board = Board::default();
        fill_row(&mut board, 19, 1);
        assert!(board.is_row_full(19));
        assert!(!board.is_row_full(18));
        assert!(!board.is_row_full(DEFAULT_HEIGHT));
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::default();
        fill_row(&mut board, 19, 1);
        // A block resting on the full row
        board.set(0, 18, Cell::Filled(color(2)));

        let clear = board.clear_full_rows();
        assert_eq!(clear.count(), 1);
        assert_eq!(clear.removed_rows, vec![19]);
        assert_eq!(clear.inserted_rows, 0..1);
        // The block from row 18 should now be on row 19
        assert_eq!(board.get(0, 19), Some(Cell::Filled(color(2))));
        assert!(board.get(0, 18).unwrap().is_empty());
        assert_eq!(board.rows().count(), DEFAULT_HEIGHT);
    }

    #[test]
    fn test_clear_separated_rows_keeps_order() {
        let mut board = Board::default();
        fill_row(&mut board, 19, 1);
        board.set(3, 18, Cell::Filled(color(4)));
        fill_row(&mut board, 17, 1);
        board.set(7, 16, Cell::Filled(color(5)));
        fill_row(&mut board, 15, 1);

        let clear = board.clear_full_rows();
        assert_eq!(clear.removed_rows, vec![15, 17, 19]);
        assert_eq!(clear.inserted_rows, 0..3);
        assert_eq!(board.get(3, 19), Some(Cell::Filled(color(4))));
        assert_eq!(board.get(7, 18), Some(Cell::Filled(color(5))));
        for y in 0..3 {
            assert!(board.rows().nth(y).unwrap().iter().all(Cell::is_empty));
        }
        assert_eq!(board.rows().count(), DEFAULT_HEIGHT);
        assert!((0..DEFAULT_HEIGHT).all(|y| !board.is_row_full(y)));
    }

    #[test]
    fn test_clear_without_full_rows_is_noop() {
        let mut board = Board::default();
        board.set(0, 19, Cell::Filled(color(1)));
        let before = board.clone();
        let clear = board.clear_full_rows();
        assert_eq!(clear.count(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_cells_drops_rows_above_top() {
        let mut board = Board::default();
        let shape = Shape::from_rows(&[&[1, 1], &[1, 1]]);
        assert!(board.place_cells(&shape, 2, -1, color(6)));
        assert_eq!(board.get(2, 0), Some(Cell::Filled(color(6))));
        assert_eq!(board.get(3, 0), Some(Cell::Filled(color(6))));
        assert_eq!(board.rows().flatten().filter(|c| c.is_filled()).count(), 2);
    }

    #[test]
    fn test_place_cells_reports_out_of_bounds() {
        let mut board = Board::default();
        let shape = Shape::from_rows(&[&[1, 1, 1, 1]]);
        assert!(!board.place_cells(&shape, DEFAULT_WIDTH as i32 - 2, 0, color(1)));
    }
}
