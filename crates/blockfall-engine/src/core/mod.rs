pub use self::{bit_field::*, cell::*, field::*, piece::*};

pub(crate) mod bit_field;
pub(crate) mod cell;
pub(crate) mod field;
pub(crate) mod piece;
