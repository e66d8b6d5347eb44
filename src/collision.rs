//! Collision queries between a shape and the board

use crate::board::Board;
use crate::tetromino::Shape;

/// Check whether `shape`, with its top-left at `base` shifted by `offset`,
/// overlaps a wall, the floor or a locked cell.
///
/// Cells above row 0 only collide with the side walls, so a piece may hang
/// partially above the visible field.
pub fn collides(shape: &Shape, base: (i32, i32), offset: (i32, i32), board: &Board) -> bool {
    let (x, y) = (base.0 + offset.0, base.1 + offset.1);
    let width = board.width() as i32;
    let height = board.height() as i32;

    shape.cells().any(|(dr, dc)| {
        let (cx, cy) = (x + dc, y + dr);
        if cx < 0 || cx >= width || cy >= height {
            return true;
        }
        cy >= 0 && board.get(cx, cy).is_some_and(|cell| cell.is_filled())
    })
}

/// Row offset at which `shape` would come to rest if dropped straight down
pub fn drop_distance(shape: &Shape, base: (i32, i32), board: &Board) -> i32 {
    let mut distance = 0;
    while !collides(shape, base, (0, distance + 1), board) {
        distance += 1;
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::tetromino::{ColorIndex, TetrominoType};

    #[test]
    fn test_walls_and_floor() {
        let board = Board::new(12, 20);
        let shape = TetrominoType::O.shape();
        assert!(!collides(&shape, (0, 0), (0, 0), &board));
        assert!(collides(&shape, (0, 0), (-1, 0), &board));
        assert!(collides(&shape, (10, 0), (1, 0), &board));
        assert!(!collides(&shape, (0, 18), (0, 0), &board));
        assert!(collides(&shape, (0, 18), (0, 1), &board));
    }

    #[test]
    fn test_locked_cell() {
        let mut board = Board::new(12, 20);
        board.set(5, 10, Cell::Filled(ColorIndex::new(1).unwrap()));
        let shape = TetrominoType::I.shape();
        assert!(collides(&shape, (3, 9), (0, 1), &board));
        assert!(!collides(&shape, (3, 9), (0, 0), &board));
    }

    #[test]
    fn test_above_top_ignores_contents_but_not_walls() {
        let mut board = Board::new(12, 20);
        for x in 0..12 {
            board.set(x, 0, Cell::Filled(ColorIndex::new(2).unwrap()));
        }
        let vertical_i = TetrominoType::I.shape().rotated_cw();
        // Entirely above the field: no contact with the filled top row
        assert!(!collides(&vertical_i, (4, -4), (0, 0), &board));
        assert!(collides(&vertical_i, (4, -4), (0, 1), &board));
        assert!(collides(&vertical_i, (0, -4), (-1, 0), &board));
    }

    #[test]
    fn test_drop_distance() {
        let board = Board::new(12, 20);
        let shape = TetrominoType::I.shape();
        assert_eq!(drop_distance(&shape, (4, 0), &board), 19);
    }
}
