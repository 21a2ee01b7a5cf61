//! Big-endian unsigned integer fields of minimal width.
//!
//! Lengths, counts, and reference indices are all written this way: the type
//! tag (or a part byte) carries `length0`, the number of payload bytes minus
//! one, and the payload is the big-endian magnitude with leading zero bytes
//! stripped. Zero still takes one byte.

use std::io;

/// Number of bytes minus one needed for a magnitude capped at [`u32::MAX`].
///
/// The result fits the 2-bit `length0` fields used by lengths and indices.
pub(crate) const fn length0_u32(value: u32) -> u8 {
    #[expect(clippy::cast_possible_truncation)]
    let length0 = ((31 - (value | 1).leading_zeros()) / 8) as u8;
    length0
}

/// Number of bytes minus one needed for an arbitrary magnitude.
///
/// The result fits the 3-bit `length0` field of integral tags.
pub(crate) const fn length0_u64(value: u64) -> u8 {
    #[expect(clippy::cast_possible_truncation)]
    let length0 = ((63 - (value | 1).leading_zeros()) / 8) as u8;
    length0
}

/// Writes the low `length0 + 1` bytes of `value` in big-endian order.
///
/// The caller must have picked `length0` via [`length0_u64`] or wider, or
/// high bytes are silently dropped.
///
/// # Errors
///
/// Returns [`Err`] if and only if the writer returns [`Err`].
pub(crate) fn write_be<W: io::Write>(mut writer: W, value: u64, length0: u8) -> io::Result<()> {
    debug_assert!(length0 <= 7, "length0 must fit 3 bits");
    let bytes = value.to_be_bytes();
    let skip = bytes.len() - (usize::from(length0) + 1);
    writer.write_all(&bytes[skip..])
}

/// Folds big-endian bytes back into a magnitude.
///
/// At most 8 bytes may be passed.
pub(crate) fn from_be(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8, "magnitude cannot exceed 8 bytes");
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}
