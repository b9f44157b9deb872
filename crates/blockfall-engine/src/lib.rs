//! Bit-packed core of a falling-block puzzle game.
//!
//! The falling piece (a 4×4 box) and the whole board are each stored as one
//! wide integer ([`BitField`]); moving, colliding, locking and clearing are all
//! bit arithmetic over those integers. See [`Field`] for the bit layout.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece is outside the side walls or colliding at the requested position")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("field size {width}x{height} cannot hold a 4x4 piece")]
pub struct FieldSizeError {
    pub width: usize,
    pub height: usize,
}

/// Rejected raw field contents, e.g. from deserialization.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum InvalidFieldError {
    #[display("invalid field size: {_0}")]
    Size(FieldSizeError),
    #[display("empty cell at bit {offset} carries color bits {bits:#x}")]
    InconsistentCell { offset: usize, bits: u32 },
    #[display("field bits extend to bit {bit_len}, beyond the {limit} bits of the board and spawn area")]
    BitsAboveSpawnArea { bit_len: usize, limit: usize },
}

impl From<FieldSizeError> for InvalidFieldError {
    fn from(err: FieldSizeError) -> Self {
        InvalidFieldError::Size(err)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum GameConfigError {
    #[display("invalid field size: {_0}")]
    FieldSize(FieldSizeError),
    #[display("drop delay must be at least one tick")]
    ZeroDropDelay,
    #[display("grace factor must be at least 1")]
    ZeroGraceFactor,
    #[display("grace delay {drop_delay} x {grace_factor} does not fit in a tick counter")]
    GraceDelayOverflow { drop_delay: i32, grace_factor: i32 },
}

impl From<FieldSizeError> for GameConfigError {
    fn from(err: FieldSizeError) -> Self {
        GameConfigError::FieldSize(err)
    }
}
