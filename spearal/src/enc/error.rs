use std::io;

use crate::cache::IndexOverflow;

/// Potential errors to encounter when encoding values.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The error originated from the [`io::Write`] implementation.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A string, byte array, or container is longer than its 32-bit
    /// length field can say.
    #[error("length {0} exceeds the 32-bit wire limit")]
    OversizedData(usize),
    /// A big number's representation is longer than its 32-bit character
    /// count can say.
    #[error("number representation exceeds the 32-bit wire limit")]
    OversizedNumber,
    /// The reference tables ran out of 32-bit indices.
    #[error("too many values to track for back-references")]
    TooManyReferences,
}

impl From<IndexOverflow> for Error {
    fn from(_: IndexOverflow) -> Self {
        Self::TooManyReferences
    }
}
