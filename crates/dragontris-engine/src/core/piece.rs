use serde::{Deserialize, Serialize};

use crate::PieceCollisionError;

use super::{
    board::Board,
    shape::{PieceKind, PieceRotation, ShapeMatrix},
};

/// Horizontal offsets tried, in order, when a rotation collides.
///
/// This is a simplified wall kick: only sideways shifts on the same row, and
/// the same table for every piece kind and rotation state.
pub const ROTATION_KICKS: [i8; 5] = [0, -1, 1, -2, 2];

/// A falling piece with position, rotation, and type.
///
/// Pieces are immutable - movement and rotation operations return new `Piece` instances.
///
/// # Coordinate System
///
/// - Position is the top-left corner of the piece's bounding matrix
/// - `y` may be negative while the piece is still entering from above the board
/// - Rotation is tracked as 0 (spawn) to 3 clockwise quarter turns
///
/// # Example
///
/// ```
/// use dragontris_engine::{Board, Piece, PieceKind, Shift};
///
/// let board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::T, &board).unwrap();
/// let moved = piece.try_shift(Shift::Right, &board).unwrap();
/// let rotated = moved.try_rotate(&board).unwrap();
/// assert_eq!(rotated.rotation().as_u8(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,-2")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.as_u8(),
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s
            .split_once('#')
            .ok_or_else(|| D::Error::custom(format!("missing '#' in 'kind#rotation@x,y': '{s}'")))?;
        let (rotation_str, position_str) = rest
            .split_once('@')
            .ok_or_else(|| D::Error::custom(format!("missing '@' in 'kind#rotation@x,y': '{s}'")))?;
        let (x_str, y_str) = position_str
            .split_once(',')
            .ok_or_else(|| D::Error::custom(format!("missing ',' in 'kind#rotation@x,y': '{s}'")))?;

        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c)
                .ok_or_else(|| D::Error::custom(format!("invalid piece kind: {c}")))?,
            _ => {
                return Err(D::Error::custom(format!(
                    "piece kind must be single character, got '{kind_str}'"
                )));
            }
        };

        let rotation = rotation_str
            .parse::<u8>()
            .map_err(|e| D::Error::custom(format!("invalid rotation: {rotation_str} ({e})")))?;
        if rotation > 3 {
            return Err(D::Error::custom(format!(
                "rotation must be 0-3, got {rotation}"
            )));
        }

        let x = x_str
            .parse::<i8>()
            .map_err(|e| D::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i8>()
            .map_err(|e| D::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Piece {
            position: PiecePosition::new(x, y),
            rotation: PieceRotation::new(rotation),
            kind,
        })
    }
}

/// One-cell translation applied to a falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Left,
    Right,
    Down,
}

impl Shift {
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Shift::Left => (-1, 0),
            Shift::Right => (1, 0),
            Shift::Down => (0, 1),
        }
    }
}

impl Piece {
    /// Creates a piece of `kind` at the spawn position without checking the board.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN,
            rotation: PieceRotation::SPAWN,
            kind,
        }
    }

    /// Places a new piece at the spawn position.
    ///
    /// The spawn position is horizontally centered with the bounding box
    /// starting two rows above the board. Fails when the stack already
    /// reaches into the spawn zone.
    pub fn spawn(kind: PieceKind, board: &Board) -> Result<Self, PieceCollisionError> {
        let piece = Self::new(kind);
        if board.is_piece_colliding(piece) {
            return Err(PieceCollisionError);
        }
        Ok(piece)
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &'static ShapeMatrix {
        self.kind.shape(self.rotation)
    }

    /// Returns board coordinates of the occupied cells. Rows may be negative.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape()
            .occupied_cells()
            .map(move |(dx, dy)| (self.position.x() + dx, self.position.y() + dy))
    }

    #[must_use]
    pub fn shifted(&self, shift: Shift) -> Self {
        let (dx, dy) = shift.delta();
        Self {
            position: self.position.offset(dx, dy),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Moves the piece one cell, or fails without any partial effect.
    pub fn try_shift(self, shift: Shift, board: &Board) -> Result<Self, PieceCollisionError> {
        let piece = self.shifted(shift);
        if board.is_piece_colliding(piece) {
            return Err(PieceCollisionError);
        }
        Ok(piece)
    }

    /// Rotates the piece a quarter turn clockwise, kicking sideways if needed.
    ///
    /// Each offset of [`ROTATION_KICKS`] is tried at the same row, and the
    /// first one that does not collide wins. Fails only when all of them collide.
    pub fn try_rotate(self, board: &Board) -> Result<Self, PieceCollisionError> {
        let rotated = self.rotated_right();
        ROTATION_KICKS
            .iter()
            .map(|&dx| Self {
                position: rotated.position.offset(dx, 0),
                ..rotated
            })
            .find(|piece| !board.is_piece_colliding(*piece))
            .ok_or(PieceCollisionError)
    }

    /// Returns the lowest position this piece reaches by falling straight down.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while let Ok(piece) = dropped.try_shift(Shift::Down, board) {
            dropped = piece;
        }
        dropped
    }
}

/// Position of a piece's bounding matrix on the board.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left cell of the board
/// - X increases rightward (columns)
/// - Y increases downward (rows) and is negative above the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i8,
    y: i8,
}

impl PiecePosition {
    /// Spawn position: horizontally centered, two rows above the board.
    pub const SPAWN: Self = Self::new(4, -2);

    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> i32 {
        i32::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> i32 {
        i32::from(self.y)
    }

    #[must_use]
    pub const fn offset(self, dx: i8, dy: i8) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}
