pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding at target position")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece locked above the top of the board")]
pub struct LockOverflowError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum CommandError {
    #[display("command not accepted in the current state")]
    NotAccepted,
    #[display("ghost piece not available at this level")]
    GhostUnavailable,
    #[display("{_0}")]
    #[from]
    Collision(PieceCollisionError),
}
