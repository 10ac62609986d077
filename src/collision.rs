//! Collision detection through a scratch mask.
//!
//! A candidate position is stamped onto a zeroed mask and the overlap with
//! the playfield is checked cell by cell. The predicates below are the only
//! legality gate for movement and rotation.

use crate::grid::{Grid, Mask, COLS, ROWS};
use crate::shape::{Shape, SHAPE_COLS, SHAPE_ROWS};

/// True when `shape`, shifted by the offsets, overlaps a locked cell.
///
/// `mask` is zeroed before use; its previous content never leaks into the
/// result.
pub fn test_collision(
    grid: &Grid,
    mask: &mut Mask,
    shape: &Shape,
    row_offset: i32,
    col_offset: i32,
) -> bool {
    let moved = shape.translated(row_offset, col_offset);
    mask.zero();
    mask.stamp(&moved);

    let row_start = moved.row.max(0);
    let row_end = (moved.row + SHAPE_ROWS as i32).min(ROWS as i32);
    let col_start = moved.col.max(0);
    let col_end = (moved.col + SHAPE_COLS as i32).min(COLS as i32);

    for r in row_start..row_end {
        for c in col_start..col_end {
            let (r, c) = (r as usize, c as usize);
            let locked = grid.get(r, c).unwrap_or(0);
            let piece = mask.get(r, c).unwrap_or(0);
            if locked != 0 && piece != 0 {
                return true;
            }
        }
    }
    false
}

/// Owns the collision mask and answers "is this move legal".
#[derive(Clone, Debug, Default)]
pub struct Collider {
    mask: Mask,
}

impl Collider {
    pub fn new() -> Self {
        Self { mask: Mask::new() }
    }

    pub fn collides(&mut self, grid: &Grid, shape: &Shape) -> bool {
        test_collision(grid, &mut self.mask, shape, 0, 0)
    }

    pub fn can_move_down(&mut self, grid: &Grid, shape: &Shape) -> bool {
        shape.row + shape.height < ROWS as i32
            && !test_collision(grid, &mut self.mask, shape, 1, 0)
    }

    pub fn can_move_right(&mut self, grid: &Grid, shape: &Shape) -> bool {
        shape.col < COLS as i32 - shape.width
            && !test_collision(grid, &mut self.mask, shape, 0, 1)
    }

    pub fn can_move_left(&mut self, grid: &Grid, shape: &Shape) -> bool {
        shape.col > 0 && !test_collision(grid, &mut self.mask, shape, 0, -1)
    }

    /// Tests the rotated footprint on a copy; `shape` is left as is.
    pub fn can_rotate(&mut self, grid: &Grid, shape: &Shape) -> bool {
        let rotated = shape.rotated();
        !test_collision(grid, &mut self.mask, &rotated, 0, 0)
    }
}
