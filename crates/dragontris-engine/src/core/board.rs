use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::LockOverflowError;

use super::{
    piece::{Piece, PiecePosition},
    shape::{PieceKind, ShapeMatrix},
};

/// Number of columns of the playfield.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows of the playfield.
pub const BOARD_HEIGHT: usize = 20;

/// Row indices of a board, ordered bottom-to-top when produced by [`Board::full_rows`].
pub type RowIndices = ArrayVec<usize, BOARD_HEIGHT>;

/// A single cell of the playfield.
///
/// Occupied cells remember which piece kind locked into them so a renderer
/// can look up the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked cell of a specific piece kind.
    Occupied(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }
}

type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; BOARD_WIDTH];

/// The 10×20 playfield holding locked cells.
///
/// Rows are indexed top-to-bottom (row 0 is the top). Pieces may hang above
/// row 0 while falling; those cells are never stored, so every cell index the
/// board touches lies inside `[0, WIDTH) × [0, HEIGHT)`.
///
/// # Example
///
/// ```
/// use dragontris_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::EMPTY;
/// let landed = Piece::new(PieceKind::O).simulate_drop_position(&board);
/// board.fill_piece(landed).unwrap();
/// assert!(board.full_rows().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Maps signed board coordinates to array indices, rejecting anything outside the grid.
fn cell_index(x: i32, y: i32) -> Option<(usize, usize)> {
    let x = usize::try_from(x).ok().filter(|x| *x < BOARD_WIDTH)?;
    let y = usize::try_from(y).ok().filter(|y| *y < BOARD_HEIGHT)?;
    Some((x, y))
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [EMPTY_ROW; BOARD_HEIGHT],
    };

    /// Returns an iterator over the rows, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }

    /// Returns the cell at `(x, y)`, or `None` when outside the board.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = cell_index(x, y)?;
        Some(self.rows[y][x])
    }

    /// Locks a single cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the board.
    pub fn fill_cell(&mut self, x: usize, y: usize, kind: PieceKind) {
        self.rows[y][x] = Cell::Occupied(kind);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.is_empty())
    }

    /// Tests whether `shape` placed at `position` collides.
    ///
    /// A cell collides when it falls outside the horizontal bounds, at or below
    /// the floor, or on an occupied board cell. Cells above row 0 only collide
    /// with the side walls, which lets pieces spawn partially off the top.
    #[must_use]
    pub fn is_colliding(&self, position: PiecePosition, shape: &ShapeMatrix) -> bool {
        shape.occupied_cells().any(|(dx, dy)| {
            let x = position.x() + dx;
            let y = position.y() + dy;
            let outside_walls = !usize::try_from(x).is_ok_and(|x| x < BOARD_WIDTH);
            let below_floor = usize::try_from(y).is_ok_and(|y| y >= BOARD_HEIGHT);
            outside_walls || below_floor || self.cell(x, y).is_some_and(Cell::is_occupied)
        })
    }

    #[must_use]
    pub fn is_piece_colliding(&self, piece: Piece) -> bool {
        self.is_colliding(piece.position(), piece.shape())
    }

    /// Writes the piece's kind into every cell it occupies.
    ///
    /// Cells above row 0 cannot be stored; if the piece has any, the visible
    /// part is still written and [`LockOverflowError`] is returned. Callers
    /// lock into a working copy and discard it on overflow.
    pub fn fill_piece(&mut self, piece: Piece) -> Result<(), LockOverflowError> {
        let mut overflowed = false;
        for (x, y) in piece.occupied_positions() {
            if y < 0 {
                overflowed = true;
                continue;
            }
            if let Some((x, y)) = cell_index(x, y) {
                self.rows[y][x] = Cell::Occupied(piece.kind());
            }
        }
        if overflowed {
            return Err(LockOverflowError);
        }
        Ok(())
    }

    /// Returns the indices of every completely occupied row, bottom row first.
    #[must_use]
    pub fn full_rows(&self) -> RowIndices {
        (0..BOARD_HEIGHT)
            .rev()
            .filter(|&y| self.rows[y].iter().all(|cell| cell.is_occupied()))
            .collect()
    }

    /// Removes the given rows and pads the top with empty rows.
    ///
    /// Remaining rows keep their relative order. Indices outside the board and
    /// duplicates are ignored.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        let mut dst = BOARD_HEIGHT;
        for y in (0..BOARD_HEIGHT).rev() {
            if rows.contains(&y) {
                continue;
            }
            dst -= 1;
            self.rows[dst] = self.rows[y];
        }
        self.rows[..dst].fill(EMPTY_ROW);
    }
}
