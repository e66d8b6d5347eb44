//! Tetromino catalog and shape matrices
//!
//! Shapes are rectangular 0/1 masks with the row index growing downward,
//! matching board coordinates.

/// Largest bounding box side of any catalog shape
pub const MAX_SHAPE_SIDE: usize = 4;

/// Number of distinct block colors (color indices are 1..=COLOR_COUNT)
pub const COLOR_COUNT: u8 = 7;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T,
    L,
    J,
    S,
    Z,
}

/// Spawn orientation of every shape, indexed by catalog order
const CATALOG: [&[&[u8]]; 7] = [
    &[&[1, 1, 1, 1]],
    &[&[1, 1], &[1, 1]],
    &[&[1, 1, 1], &[0, 1, 0]],
    &[&[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1, 1], &[0, 0, 1]],
    &[&[1, 1, 0], &[0, 1, 1]],
    &[&[0, 1, 1], &[1, 1, 0]],
];

impl TetrominoType {
    /// Get all tetromino types in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::L,
            TetrominoType::J,
            TetrominoType::S,
            TetrominoType::Z,
        ]
    }

    /// Position in the catalog (0..7)
    pub fn index(&self) -> usize {
        match self {
            TetrominoType::I => 0,
            TetrominoType::O => 1,
            TetrominoType::T => 2,
            TetrominoType::L => 3,
            TetrominoType::J => 4,
            TetrominoType::S => 5,
            TetrominoType::Z => 6,
        }
    }

    /// Color index bound to this shape when colors follow the catalog
    pub fn catalog_color(&self) -> ColorIndex {
        ColorIndex(self.index() as u8 + 1)
    }

    /// The shape in its spawn orientation
    pub fn shape(&self) -> Shape {
        Shape::from_rows(CATALOG[self.index()])
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::L => "L",
            TetrominoType::J => "J",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
        }
    }
}

/// A block color, always in 1..=COLOR_COUNT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorIndex(u8);

impl ColorIndex {
    pub fn new(value: u8) -> Option<Self> {
        (1..=COLOR_COUNT).contains(&value).then_some(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// A rectangular occupancy mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    width: usize,
    height: usize,
    mask: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    /// Build a shape from rows of 0/1 values. Rows must share one length.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len().min(MAX_SHAPE_SIDE);
        let width = rows.first().map_or(0, |r| r.len()).min(MAX_SHAPE_SIDE);
        let mut mask = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in rows.iter().take(height).enumerate() {
            for (c, &cell) in row.iter().take(width).enumerate() {
                mask[r][c] = cell != 0;
            }
        }
        Self { width, height, mask }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.mask[row][col]
    }

    /// Iterate over the (row, col) offsets of all set cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |r| {
            (0..self.width)
                .filter(move |&c| self.mask[r][c])
                .map(move |c| (r as i32, c as i32))
        })
    }

    /// Rotate 90° clockwise: reverse the rows, then transpose
    pub fn rotated_cw(&self) -> Shape {
        let mut mask = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for r in 0..self.width {
            for c in 0..self.height {
                mask[r][c] = self.mask[self.height - 1 - c][r];
            }
        }
        Shape {
            width: self.height,
            height: self.width,
            mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in TetrominoType::all() {
            assert_eq!(kind.shape().cells().count(), 4, "{}", kind.name());
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        // ###      .#
        // .#.  ->  ##
        //          .#
        let rotated = TetrominoType::T.shape().rotated_cw();
        assert_eq!(rotated, Shape::from_rows(&[&[0, 1], &[1, 1], &[0, 1]]));
    }

    #[test]
    fn test_rotate_i_swaps_dimensions() {
        let rotated = TetrominoType::I.shape().rotated_cw();
        assert_eq!(rotated.width(), 1);
        assert_eq!(rotated.height(), 4);
    }

    #[test]
    fn test_four_rotations_are_identity() {
        for kind in TetrominoType::all() {
            let shape = kind.shape();
            let back = shape.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
            assert_eq!(back, shape, "{}", kind.name());
        }
    }

    #[test]
    fn test_color_index_range() {
        assert!(ColorIndex::new(0).is_none());
        assert!(ColorIndex::new(8).is_none());
        assert_eq!(ColorIndex::new(7).map(|c| c.get()), Some(7));
        for kind in TetrominoType::all() {
            assert!((1..=COLOR_COUNT).contains(&kind.catalog_color().get()));
        }
    }
}
