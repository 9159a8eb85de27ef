//! Board, shape, and piece primitives.
//!
//! These types know nothing about timing or scoring. They provide the pure
//! geometry the session state machine is built on:
//!
//! - [`PieceKind`] / [`ShapeMatrix`] - static piece shapes and their rotations
//! - [`Board`] - the 10×20 grid of locked cells and collision testing
//! - [`Piece`] - a falling piece with immutable move/rotate operations

pub use self::{board::*, piece::*, shape::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod shape;
