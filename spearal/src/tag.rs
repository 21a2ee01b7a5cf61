//! Wire type tags.
//!
//! A tag byte either is a literal value on its own (`0x00` to `0x02`) or
//! carries a type kind in its high nibble and kind-specific parameter bits in
//! its low nibble. Everything else is rejected as unknown.

pub(crate) const NULL: u8 = 0x00;
pub(crate) const TRUE: u8 = 0x01;
pub(crate) const FALSE: u8 = 0x02;

pub(crate) const INTEGRAL: u8 = 0x20;
pub(crate) const BIG_INTEGRAL: u8 = 0x30;
pub(crate) const FLOATING: u8 = 0x40;
pub(crate) const BIG_FLOATING: u8 = 0x50;
pub(crate) const STRING: u8 = 0x60;
pub(crate) const BYTE_ARRAY: u8 = 0x70;
pub(crate) const DATE_TIME: u8 = 0x80;
pub(crate) const COLLECTION: u8 = 0x90;
pub(crate) const MAP: u8 = 0xa0;
pub(crate) const ENUM: u8 = 0xb0;
pub(crate) const CLASS: u8 = 0xc0;
pub(crate) const BEAN: u8 = 0xd0;

/// Negative magnitude. Integral tags only, next to a 3-bit `length0`.
pub(crate) const INTEGRAL_SIGN: u8 = 0x08;

/// The payload is an index into the shared string table instead of string
/// data. Used by strings, big numbers, and class descriptors.
pub(crate) const STRING_REF: u8 = 0x04;

/// The payload is an index into the shared object table instead of a
/// definition. Used by byte arrays, collections, maps, and beans.
pub(crate) const OBJECT_REF: u8 = 0x08;

/// The floating payload is an integer scaled by 1000, not raw IEEE-754 bits.
pub(crate) const FLOAT_SCALED: u8 = 0x08;
/// Sign of the scaled floating magnitude.
pub(crate) const FLOAT_SIGN: u8 = 0x04;

/// A date part follows the date-time tag.
pub(crate) const DATE_PART: u8 = 0x08;
/// A time part follows the date-time tag (after the date part, if any).
pub(crate) const TIME_PART: u8 = 0x04;

/// Recovers the type kind of a tag byte.
///
/// Literals are their own kind; for everything else the parameter nibble is
/// masked off. Unassigned values simply match no kind at the use site.
pub(crate) const fn kind_of(byte: u8) -> u8 {
    if byte <= 0x0f { byte } else { byte & 0xf0 }
}
