//! Polyomino shapes: seven fixed templates on a 4x4 occupancy map.

use rand::Rng;

use crate::error::EngineError;
use crate::grid::{COLS, ROWS};

pub const SHAPE_ROWS: usize = 4;
pub const SHAPE_COLS: usize = 4;
pub const SHAPE_COUNT: usize = 7;

pub type ShapeMap = [[u8; SHAPE_COLS]; SHAPE_ROWS];

// ============================================================================
// Kinds
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl ShapeKind {
    /// Template order; a kind's position here is its type index.
    pub const ALL: [ShapeKind; SHAPE_COUNT] = [
        ShapeKind::I,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::T,
        ShapeKind::Z,
    ];

    /// Canonical color id, `1..=7`.
    pub fn color(self) -> u8 {
        match self {
            ShapeKind::I => 1, // red
            ShapeKind::J => 2, // white
            ShapeKind::L => 3, // magenta
            ShapeKind::O => 4, // blue
            ShapeKind::S => 5, // green
            ShapeKind::T => 6, // yellow
            ShapeKind::Z => 7, // cyan
        }
    }

    /// Spawn orientation: occupancy map plus bounding width and height.
    fn template(self) -> (ShapeMap, i32, i32) {
        match self {
            ShapeKind::I => (
                [[1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                4,
                1,
            ),
            ShapeKind::J => (
                [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                3,
                2,
            ),
            ShapeKind::L => (
                [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                3,
                2,
            ),
            ShapeKind::O => (
                [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                2,
                2,
            ),
            ShapeKind::S => (
                [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                3,
                2,
            ),
            ShapeKind::T => (
                [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                3,
                2,
            ),
            ShapeKind::Z => (
                [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                3,
                2,
            ),
        }
    }
}

impl TryFrom<usize> for ShapeKind {
    type Error = EngineError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        ShapeKind::ALL
            .get(index)
            .copied()
            .ok_or(EngineError::UnknownShape(index))
    }
}

// ============================================================================
// Shape
// ============================================================================

/// A live piece: template data plus a top-left anchor in grid coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub color: u8,
    pub row: i32,
    pub col: i32,
    pub width: i32,
    pub height: i32,
    pub map: ShapeMap,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        let (map, width, height) = kind.template();
        Self {
            kind,
            color: kind.color(),
            row: 0,
            col: 0,
            width,
            height,
            map,
        }
    }

    pub fn new_at(kind: ShapeKind, row: i32, col: i32) -> Self {
        Self {
            row,
            col,
            ..Self::new(kind)
        }
    }

    /// Template by type index.
    pub fn by_type(index: usize) -> Result<Self, EngineError> {
        ShapeKind::try_from(index).map(Self::new)
    }

    /// Uniform pick among the seven templates, anchored at (0, 0).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(ShapeKind::ALL[rng.gen_range(0..SHAPE_COUNT)])
    }

    pub fn copy_from(&mut self, src: &Shape) {
        *self = *src;
    }

    /// Rotates 90 degrees clockwise in place.
    ///
    /// The map is re-aligned to column 0, the bounding box swaps, and the
    /// anchor is pulled back inside the grid. Locked cells are not consulted.
    pub fn rotate(&mut self) {
        let mut turned: ShapeMap = [[0; SHAPE_COLS]; SHAPE_ROWS];
        for (r, row) in turned.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.map[SHAPE_COLS - 1 - c][r];
            }
        }

        if turned.iter().any(|row| row.iter().any(|&v| v != 0)) {
            while turned.iter().all(|row| row[0] == 0) {
                for row in turned.iter_mut() {
                    row.rotate_left(1);
                }
            }
        }
        self.map = turned;

        std::mem::swap(&mut self.width, &mut self.height);

        let overflow = COLS as i32 - (self.col + self.width);
        if overflow < 0 {
            self.col += overflow;
        }
        let overflow = ROWS as i32 - (self.row + self.height);
        if overflow < 0 {
            self.row += overflow;
        }
    }

    pub fn rotated(&self) -> Self {
        let mut copy = *self;
        copy.rotate();
        copy
    }

    /// Same shape with the anchor shifted.
    pub fn translated(&self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
            ..*self
        }
    }

    /// Absolute `(row, col)` of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.map.iter().enumerate().flat_map(move |(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, _)| (self.row + r as i32, self.col + c as i32))
        })
    }
}
