//! Text representation for arbitrary-precision numbers.
//!
//! Big integers and big decimals travel as plain decimal strings, never in
//! scientific notation, so the digits survive unchanged across peers. An
//! integer's trailing run of more than two zeros is shortened to `E` plus
//! the run length; a decimal is always its exact text. The characters are
//! packed two per byte using a fixed fourteen-symbol alphabet.

use std::iter;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};

/// Longest zero run an `E` suffix may expand to.
///
/// The run length travels as text, so without a cap a few bytes could
/// demand gigabytes of digits.
const MAX_ZERO_RUN: usize = 1 << 20;

/// Renders a big integer in its wire representation.
pub(crate) fn integral_repr(value: &BigInt) -> String {
    compress(value.to_str_radix(10))
}

/// Renders a big decimal in its wire representation.
///
/// The plain form is built from the unscaled digits directly rather than
/// through [`Display`](std::fmt::Display), which switches to scientific
/// notation for large exponents. Unlike integers, the text keeps its zero
/// runs: the decimal wire form is the exact digit string.
pub(crate) fn floating_repr(value: &BigDecimal) -> String {
    let (unscaled, scale) = value.as_bigint_and_exponent();
    let digits = unscaled.magnitude().to_str_radix(10);

    let mut plain = String::with_capacity(digits.len() + 2);
    if unscaled.sign() == Sign::Minus {
        plain.push('-');
    }
    match usize::try_from(scale) {
        // negative scale scales the digits up, no fraction to render
        Err(_) => {
            #[expect(clippy::cast_possible_truncation)]
            let zeros = scale.unsigned_abs() as usize;
            plain.push_str(&digits);
            plain.extend(iter::repeat_n('0', zeros));
        }
        Ok(0) => plain.push_str(&digits),
        Ok(scale) => {
            if let Some(point) = digits.len().checked_sub(scale).filter(|&point| point > 0) {
                plain.push_str(&digits[..point]);
                plain.push('.');
                plain.push_str(&digits[point..]);
            } else {
                plain.push_str("0.");
                plain.extend(iter::repeat_n('0', scale - digits.len()));
                plain.push_str(&digits);
            }
        }
    }
    plain
}

/// Replaces a trailing zero run longer than two with an `E` suffix.
///
/// The first character never counts towards the run, so a bare `0` or
/// `-1000` keeps its leading digit.
fn compress(mut repr: String) -> String {
    let zeros = repr
        .bytes()
        .enumerate()
        .rev()
        .take_while(|&(index, byte)| index > 0 && byte == b'0')
        .count();
    if zeros > 2 {
        repr.truncate(repr.len() - zeros);
        repr.push('E');
        repr.push_str(&zeros.to_string());
    }
    repr
}

/// Parses a wire representation into a big integer.
///
/// Accepts an optional leading minus, digits, and an optional `E` suffix.
/// A decimal point, a signed exponent, or any other shape yields [`None`].
pub(crate) fn parse_integral(repr: &str) -> Option<BigInt> {
    let (mantissa, zeros) = split_zero_run(repr)?;
    let digits = mantissa.strip_prefix('-').unwrap_or(mantissa);
    if digits.is_empty() || !all_digits(digits) {
        return None;
    }
    let mut expanded = String::with_capacity(mantissa.len() + zeros);
    expanded.push_str(mantissa);
    expanded.extend(iter::repeat_n('0', zeros));
    expanded.parse().ok()
}

/// Parses a wire representation into a big decimal.
///
/// The `E` suffix appends zeros to the text before interpreting it, so the
/// scale of the result matches the uncompressed digits exactly.
pub(crate) fn parse_floating(repr: &str) -> Option<BigDecimal> {
    let (mantissa, zeros) = split_zero_run(repr)?;
    let unsigned = mantissa.strip_prefix('-').unwrap_or(mantissa);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        None => (unsigned, None),
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
    };
    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return None;
    }

    let scale = frac_part.map_or(0, |frac| frac.len() + zeros);
    let mut digits = String::with_capacity(unsigned.len() + zeros + 1);
    if mantissa.starts_with('-') {
        digits.push('-');
    }
    digits.push_str(int_part);
    digits.push_str(frac_part.unwrap_or(""));
    digits.extend(iter::repeat_n('0', zeros));

    let unscaled: BigInt = digits.parse().ok()?;
    Some(BigDecimal::new(unscaled, i64::try_from(scale).ok()?))
}

/// Splits off a trailing `E` suffix, returning the mantissa text and the
/// zero run length. No suffix means a run of zero.
fn split_zero_run(repr: &str) -> Option<(&str, usize)> {
    match repr.split_once('E') {
        None => Some((repr, 0)),
        Some((mantissa, count)) => {
            if count.is_empty() || !all_digits(count) {
                return None;
            }
            let zeros = count.parse().ok()?;
            (zeros <= MAX_ZERO_RUN).then_some((mantissa, zeros))
        }
    }
}

fn all_digits(text: &str) -> bool {
    text.bytes().all(|byte| byte.is_ascii_digit())
}

/// Packs a representation two characters per byte, high nibble first.
///
/// An odd character count leaves the final low nibble zero; the decoder
/// knows the count and ignores it.
pub(crate) fn pack(repr: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(repr.len().div_ceil(2));
    for pair in repr.as_bytes().chunks(2) {
        let byte = match *pair {
            [high] => nibble_of(high) << 4,
            [high, low] => (nibble_of(high) << 4) | nibble_of(low),
            _ => unreachable!("chunks always hold one or two bytes"),
        };
        bytes.push(byte);
    }
    bytes
}

fn nibble_of(symbol: u8) -> u8 {
    match symbol {
        b'0'..=b'9' => symbol - b'0',
        b'+' => 0xa,
        b'-' => 0xb,
        b'.' => 0xc,
        b'E' => 0xd,
        _ => unreachable!("representations only use the wire alphabet"),
    }
}

/// Unpacks `count` characters from nibble-packed bytes.
///
/// Returns [`None`] when a nibble falls outside the alphabet.
pub(crate) fn unpack(count: usize, bytes: &[u8]) -> Option<String> {
    debug_assert!(
        bytes.len() == count.div_ceil(2),
        "packed length must match the character count"
    );
    let mut nibbles = bytes.iter().flat_map(|&byte| [byte >> 4, byte & 0x0f]);
    let mut repr = String::with_capacity(count);
    for _ in 0..count {
        let symbol = match nibbles.next()? {
            nibble @ 0..=9 => char::from(b'0' + nibble),
            0xa => '+',
            0xb => '-',
            0xc => '.',
            0xd => 'E',
            _ => return None,
        };
        repr.push(symbol);
    }
    Some(repr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(text: &str) -> BigDecimal {
        text.parse().expect("valid decimal literal")
    }

    #[test]
    fn integral_repr_is_plain_decimal() {
        assert_eq!(integral_repr(&BigInt::from(0)), "0", "zero");
        assert_eq!(integral_repr(&BigInt::from(100)), "100", "short run kept");
        assert_eq!(integral_repr(&BigInt::from(1000)), "1E3", "run compressed");
        assert_eq!(integral_repr(&BigInt::from(-123_000_000)), "-123E6", "sign kept");

        let large: BigInt = format!("1{}", "0".repeat(30)).parse().expect("valid digits");
        assert_eq!(integral_repr(&large), "1E30", "large power of ten");
    }

    #[test]
    fn floating_repr_never_goes_scientific() {
        assert_eq!(floating_repr(&decimal("123.45")), "123.45", "plain");
        assert_eq!(floating_repr(&decimal("0.005")), "0.005", "leading zeros");
        assert_eq!(floating_repr(&decimal("-0.5")), "-0.5", "negative fraction");
        assert_eq!(
            floating_repr(&decimal("1e20")),
            "100000000000000000000",
            "positive exponent expands to digits"
        );
        assert_eq!(
            floating_repr(&BigDecimal::new(BigInt::from(1_000_000), 6)),
            "1.000000",
            "a fractional zero run is never shortened"
        );
        assert_eq!(
            floating_repr(&BigDecimal::new(BigInt::from(0), 3)),
            "0.000",
            "zero with scale"
        );
    }

    #[test]
    fn parse_integral_expands_zero_runs() {
        assert_eq!(parse_integral("12E3"), Some(BigInt::from(12000)), "run");
        assert_eq!(parse_integral("-7"), Some(BigInt::from(-7)), "sign");
        assert_eq!(parse_integral("1.5"), None, "point rejected");
        assert_eq!(parse_integral("1E+3"), None, "signed exponent rejected");
        assert_eq!(parse_integral("E3"), None, "missing digits rejected");
        assert_eq!(parse_integral(""), None, "empty rejected");
        assert_eq!(parse_integral("1E9999999"), None, "zero run capped");
    }

    #[test]
    fn parse_floating_keeps_digits_exact() {
        let parsed = parse_floating("1.E6").expect("valid representation");
        assert_eq!(
            parsed.as_bigint_and_exponent(),
            (BigInt::from(1_000_000), 6),
            "trailing zeros restored into the fraction"
        );

        let parsed = parse_floating("12E3").expect("valid representation");
        assert_eq!(
            parsed.as_bigint_and_exponent(),
            (BigInt::from(12000), 0),
            "integral zeros stay out of the scale"
        );

        assert_eq!(parse_floating("-0.5"), Some(decimal("-0.5")), "sign");
        assert_eq!(parse_floating("1.2.3"), None, "two points rejected");
        assert_eq!(parse_floating("1E-3"), None, "signed exponent rejected");
        assert_eq!(parse_floating("."), None, "no digits rejected");
    }

    #[test]
    fn repr_and_parse_round_trip() {
        let values = ["0", "-1", "123456789123456789123456789", "10E5"];
        for text in values {
            let value = parse_integral(text).expect("valid representation");
            let back = parse_integral(&integral_repr(&value)).expect("round trip");
            assert_eq!(back, value, "integral {text}");
        }

        let values = ["0.E4", "-12.25", "1E20", "0.00001", "98765.43210"];
        for text in values {
            let value = parse_floating(text).expect("valid representation");
            let back = parse_floating(&floating_repr(&value)).expect("round trip");
            assert_eq!(
                back.as_bigint_and_exponent(),
                value.as_bigint_and_exponent(),
                "floating {text} is digit-exact"
            );
        }
    }

    #[test]
    fn packing_is_two_symbols_per_byte() {
        assert_eq!(pack("1.5"), [0x1c, 0x50], "odd count pads the low nibble");
        assert_eq!(pack("-1E3"), [0xb1, 0xd3], "full alphabet");
        assert_eq!(unpack(3, &[0x1c, 0x50]), Some("1.5".to_owned()), "unpack");
        assert_eq!(
            unpack(4, &[0xb1, 0xd3]),
            Some("-1E3".to_owned()),
            "unpack full"
        );
        assert_eq!(unpack(2, &[0xef]), None, "reserved nibbles rejected");
    }
}
