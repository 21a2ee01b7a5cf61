use std::io;

use crate::convert::ConvertError;
use crate::datetime::DateTimeError;
use crate::model::{DescriptorError, UnknownClass};

/// Potential errors to encounter when decoding values.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The error originated from the [`io::Read`] implementation.
    ///
    /// Truncated input surfaces as [`io::ErrorKind::UnexpectedEof`].
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The input declared a type tag this crate does not know.
    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),
    /// String data is not valid UTF-8.
    #[error("string data is not valid UTF-8")]
    InvalidUtf8,
    /// The input referenced a table index that was never defined.
    #[error("reference to undefined index {0}")]
    InvalidReference(u32),
    /// An integral value does not fit 64 bits.
    #[error("integral value does not fit 64 bits")]
    IntegerOverflow,
    /// A big number's representation does not parse back into a number.
    #[error("malformed big number representation")]
    InvalidBigNumber,
    /// An enum's variant is not a string.
    #[error("enum variant is not a string")]
    InvalidEnum,
    /// A bean descriptor does not follow the `Name#prop,prop` shape.
    #[error("malformed class descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),
    /// The class model refused a descriptor's class names.
    #[error(transparent)]
    UnknownClass(#[from] UnknownClass),
    /// A date or time field is out of range.
    #[error(transparent)]
    DateTime(#[from] DateTimeError),
    /// The decoded value does not convert to the requested type.
    #[error(transparent)]
    Conversion(#[from] ConvertError),
    /// A slice held more bytes than its one value.
    #[error("{0} bytes of unexpected trailing data")]
    SliceExcessData(usize),
}
