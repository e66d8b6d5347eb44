//! Active falling piece

use crate::board::Board;
use crate::collision::{collides, drop_distance};
use crate::tetromino::{ColorIndex, Shape, TetrominoType};

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current orientation of the shape
    pub shape: Shape,
    pub color: ColorIndex,
    /// Top-left of the shape's bounding box in board coordinates
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a new piece centered at the top of a board of `board_width` columns
    pub fn spawn(piece_type: TetrominoType, color: ColorIndex, board_width: usize) -> Self {
        let shape = piece_type.shape();
        Self {
            piece_type,
            shape,
            color,
            x: (board_width / 2) as i32 - (shape.width() / 2) as i32,
            y: 0,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Check if the piece would collide after moving by (dx, dy)
    pub fn collides_at(&self, board: &Board, dx: i32, dy: i32) -> bool {
        collides(&self.shape, self.position(), (dx, dy), board)
    }

    /// Try to move by (dx, dy), returns true if successful
    pub fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if self.collides_at(board, dx, dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    /// The shape after one clockwise turn, not yet committed
    pub fn rotated(&self) -> Shape {
        self.shape.rotated_cw()
    }

    /// Try to rotate clockwise in place. No wall kicks: a blocked rotation
    /// leaves the piece untouched.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let candidate = self.rotated();
        if collides(&candidate, self.position(), (0, 0), board) {
            return false;
        }
        self.shape = candidate;
        true
    }

    /// Absolute board coordinates (x, y) of every block
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(move |(dr, dc)| (self.x + dc, self.y + dr))
    }

    /// Get the ghost piece row (where the piece would land)
    pub fn ghost_y(&self, board: &Board) -> i32 {
        self.y + drop_distance(&self.shape, self.position(), board)
    }
}
