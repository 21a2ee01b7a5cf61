//! Encoding values into the wire format.

use std::io;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::cache::{DescriptorCache, ObjectCache, StringCache};
use crate::datetime::{self, DateTime};
use crate::model::{ClassModel, ClassResolution, DynamicModel, PropertyFilter, descriptor_text};
use crate::value::{Bean, Bytes, EnumValue, List, Map, Value};
use crate::{bignum, tag, varint};

mod error;

pub use error::Error;

/// Default size of the byte buffer between the encoder and its sink.
const BUFFER_LEN: usize = 1024;

/// Capacity floor; the buffer must hold the longest fixed span.
const MIN_CAPACITY: usize = 8;

/// Exponent bits of an IEEE 754 double.
const EXP_MASK: u64 = 0x7ff0_0000_0000_0000;

/// Bit pattern of `-0.0`.
const NEG_ZERO: u64 = 1 << 63;

/// Largest double magnitude whose integer value is unambiguous.
const MAX_EXACT: f64 = ((1_u64 << 52) - 1) as f64;

/// Encodes a single value to a [`Vec<u8>`].
///
/// # Errors
///
/// Returns [`Err`] if the value cannot be represented on the wire.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    Ok(buf)
}

/// Encodes a single value to an [`io::Write`].
///
/// # Errors
///
/// Returns [`Err`] if the value cannot be represented on the wire or the
/// writer fails.
pub fn to_writer<W: io::Write>(writer: W, value: &Value) -> Result<(), Error> {
    Encoder::new(writer).write_any(value)
}

/// An encoder for this crate's wire format.
///
/// The reference tables live on the encoder, so consecutive writes share
/// strings and object identities across values. A fresh encoder per
/// message gives the independent-message behavior.
#[derive(Debug)]
pub struct Encoder<W, M = DynamicModel> {
    out: Output<W>,
    model: M,
    filter: PropertyFilter,
    strings: StringCache,
    objects: ObjectCache,
    descriptors: DescriptorCache,
    depth: usize,
}

impl<W: io::Write> Encoder<W> {
    /// Creates an encoder with the default buffer size.
    pub fn new(writer: W) -> Self {
        Self::with_capacity(BUFFER_LEN, writer)
    }

    /// Creates an encoder with the given buffer capacity.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            out: Output::new(writer, capacity.max(MIN_CAPACITY)),
            model: DynamicModel,
            filter: PropertyFilter::new(),
            strings: StringCache::default(),
            objects: ObjectCache::default(),
            descriptors: DescriptorCache::default(),
            depth: 0,
        }
    }
}

impl<W, M> Encoder<W, M> {
    /// Replaces the class model used to order bean properties.
    #[must_use]
    pub fn with_model<M2: ClassModel>(self, model: M2) -> Encoder<W, M2> {
        Encoder {
            out: self.out,
            model,
            filter: self.filter,
            strings: self.strings,
            objects: self.objects,
            descriptors: self.descriptors,
            depth: self.depth,
        }
    }

    /// Restricts which bean properties are written.
    pub fn set_filter(&mut self, filter: PropertyFilter) {
        self.filter = filter;
    }

    /// Unwraps the encoder into its writer.
    ///
    /// The buffer is empty after every completed top-level write; bytes
    /// buffered by a failed write are discarded.
    pub fn into_inner(self) -> W {
        self.out.writer
    }
}

impl<W: io::Write, M: ClassModel> Encoder<W, M> {
    /// Flushes buffered bytes and the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.out.flush_buf()?;
        Ok(self.out.writer.flush()?)
    }

    /// Encodes any value.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the value cannot be represented on the wire or
    /// the writer fails.
    pub fn write_any(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(value) => self.write_bool(*value),
            Value::Int(value) => self.write_i64(*value),
            Value::Float(value) => self.write_f64(*value),
            Value::BigInt(value) => self.write_big_int(value),
            Value::BigDecimal(value) => self.write_big_decimal(value),
            Value::String(value) => self.write_str(value),
            Value::Bytes(value) => self.scope(|enc| enc.put_bytes_handle(value)),
            Value::DateTime(value) => self.write_date_time(*value),
            Value::List(value) => self.write_list(value),
            Value::Map(value) => self.write_map(value),
            Value::Enum(value) => self.write_enum_value(value),
            Value::Class(value) => self.write_class(value),
            Value::Bean(value) => self.write_bean(value),
        }
    }

    /// Encodes a null.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn write_null(&mut self) -> Result<(), Error> {
        self.scope(|enc| Ok(enc.out.put_u8(tag::NULL)?))
    }

    /// Encodes a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.scope(|enc| {
            let byte = if value { tag::TRUE } else { tag::FALSE };
            Ok(enc.out.put_u8(byte)?)
        })
    }

    /// Encodes an integer in its minimal big-endian width.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.scope(|enc| {
            let magnitude = value.unsigned_abs();
            let sign = if value < 0 { tag::INTEGRAL_SIGN } else { 0 };
            let length0 = varint::length0_u64(magnitude);
            enc.out.put_u8(tag::INTEGRAL | sign | length0)?;
            Ok(varint::write_be(&mut enc.out, magnitude, length0)?)
        })
    }

    /// Encodes a double.
    ///
    /// Integral values in the exactly representable range collapse to the
    /// integer encoding, and values with an exact thousandth fraction use
    /// a scaled four-byte form. NaN, the infinities, and `-0.0` always
    /// keep their full bit pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.scope(|enc| {
            let bits = value.to_bits();
            if bits & EXP_MASK != EXP_MASK && bits != NEG_ZERO {
                if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
                    #[expect(clippy::cast_possible_truncation)]
                    return enc.write_i64(value as i64);
                }
                if let Some((negative, magnitude)) = scaled_parts(value) {
                    let sign = if negative { tag::FLOAT_SIGN } else { 0 };
                    let length0 = varint::length0_u32(magnitude);
                    enc.out
                        .put_u8(tag::FLOATING | tag::FLOAT_SCALED | sign | length0)?;
                    return Ok(varint::write_be(&mut enc.out, magnitude.into(), length0)?);
                }
            }
            enc.out.put_u8(tag::FLOATING)?;
            Ok(enc.out.put_slice(&bits.to_be_bytes())?)
        })
    }

    /// Encodes a string, sharing repeated values by reference.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the string is oversized or the writer fails.
    pub fn write_str(&mut self, value: &str) -> Result<(), Error> {
        self.scope(|enc| enc.put_string_data(tag::STRING, value))
    }

    /// Encodes a big integer.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the representation is oversized or the writer
    /// fails.
    pub fn write_big_int(&mut self, value: &BigInt) -> Result<(), Error> {
        self.scope(|enc| enc.put_big_number(tag::BIG_INTEGRAL, &bignum::integral_repr(value)))
    }

    /// Encodes a big decimal.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the representation is oversized or the writer
    /// fails.
    pub fn write_big_decimal(&mut self, value: &BigDecimal) -> Result<(), Error> {
        self.scope(|enc| enc.put_big_number(tag::BIG_FLOATING, &bignum::floating_repr(value)))
    }

    /// Encodes a date-time, writing only the parts that are present.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the writer fails.
    pub fn write_date_time(&mut self, value: DateTime) -> Result<(), Error> {
        self.scope(|enc| enc.put_date_time(value))
    }

    /// Encodes a byte array from a plain slice.
    ///
    /// The slice has no shareable identity, but it still occupies an
    /// object index so both sides keep counting in step.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the slice is oversized or the writer fails.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.scope(|enc| {
            enc.objects.insert_anonymous()?;
            enc.put_byte_block(value)
        })
    }

    /// Encodes a list, sharing repeated handles by reference.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the list is oversized or the writer fails.
    pub fn write_list(&mut self, value: &List) -> Result<(), Error> {
        self.scope(|enc| enc.put_list(value))
    }

    /// Encodes a map in insertion order, sharing repeated handles by
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the map is oversized or the writer fails.
    pub fn write_map(&mut self, value: &Map) -> Result<(), Error> {
        self.scope(|enc| enc.put_map(value))
    }

    /// Encodes an enum constant.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if a name is oversized or the writer fails.
    pub fn write_enum_value(&mut self, value: &EnumValue) -> Result<(), Error> {
        self.scope(|enc| {
            enc.put_string_data(tag::ENUM, value.class_name())?;
            enc.write_str(value.variant())
        })
    }

    /// Encodes a class reference.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the name is oversized or the writer fails.
    pub fn write_class(&mut self, class_name: &str) -> Result<(), Error> {
        self.scope(|enc| enc.put_string_data(tag::CLASS, class_name))
    }

    /// Encodes a bean, sharing repeated handles by reference.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if a name is oversized or the writer fails.
    pub fn write_bean(&mut self, value: &Bean) -> Result<(), Error> {
        self.scope(|enc| enc.put_bean(value))
    }

    /// Runs a write step, flushing when the outermost one completes.
    fn scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 && result.is_ok() {
            self.out.flush_buf()?;
        }
        result
    }

    /// Writes string-typed data under the given kind: inline bytes on
    /// first sight, a table reference afterwards. The empty string is
    /// always inline and never cached.
    fn put_string_data(&mut self, kind: u8, value: &str) -> Result<(), Error> {
        if value.is_empty() {
            self.out.put_u8(kind)?;
            return Ok(self.out.put_u8(0)?);
        }
        if let Some(index) = self.strings.get(value) {
            let length0 = varint::length0_u32(index);
            self.out.put_u8(kind | tag::STRING_REF | length0)?;
            return Ok(varint::write_be(&mut self.out, index.into(), length0)?);
        }
        let length = u32::try_from(value.len()).map_err(|_| Error::OversizedData(value.len()))?;
        self.strings.insert(Rc::from(value))?;
        let length0 = varint::length0_u32(length);
        self.out.put_u8(kind | length0)?;
        varint::write_be(&mut self.out, length.into(), length0)?;
        Ok(self.out.put_slice(value.as_bytes())?)
    }

    /// Writes a big number: a nibble-packed representation on first
    /// sight, a string-table reference afterwards.
    fn put_big_number(&mut self, kind: u8, repr: &str) -> Result<(), Error> {
        if let Some(index) = self.strings.get(repr) {
            let length0 = varint::length0_u32(index);
            self.out.put_u8(kind | tag::STRING_REF | length0)?;
            return Ok(varint::write_be(&mut self.out, index.into(), length0)?);
        }
        let count = u32::try_from(repr.len()).map_err(|_| Error::OversizedNumber)?;
        self.strings.insert(Rc::from(repr))?;
        let length0 = varint::length0_u32(count);
        self.out.put_u8(kind | length0)?;
        varint::write_be(&mut self.out, count.into(), length0)?;
        Ok(self.out.put_slice(&bignum::pack(repr))?)
    }

    fn put_object_ref(&mut self, kind: u8, index: u32) -> Result<(), Error> {
        let length0 = varint::length0_u32(index);
        self.out.put_u8(kind | tag::OBJECT_REF | length0)?;
        Ok(varint::write_be(&mut self.out, index.into(), length0)?)
    }

    fn put_date_time(&mut self, value: DateTime) -> Result<(), Error> {
        let mut tag_byte = tag::DATE_TIME;
        if value.date().is_some() {
            tag_byte |= tag::DATE_PART;
        }
        let time = value
            .time()
            .map(|time| (time, datetime::subsecond_parts(time.nanosecond())));
        if let Some((_, (unit, _))) = time {
            tag_byte |= tag::TIME_PART | unit;
        }
        self.out.put_u8(tag_byte)?;

        if let Some(date) = value.date() {
            let delta = date.year() - 2000;
            let Ok(magnitude) = u32::try_from(delta.unsigned_abs()) else {
                unreachable!("year distance is validated on construction");
            };
            let sign = if delta < 0 { 0x80 } else { 0 };
            let length0 = varint::length0_u32(magnitude);
            self.out.put_u8(sign | (length0 << 4) | date.month())?;
            self.out.put_u8(date.day())?;
            varint::write_be(&mut self.out, magnitude.into(), length0)?;
        }

        if let Some((time, (unit, fraction))) = time {
            let length0 = if unit == 0 {
                0
            } else {
                varint::length0_u32(fraction)
            };
            self.out.put_u8((length0 << 5) | time.hour())?;
            self.out.put_u8(time.minute())?;
            self.out.put_u8(time.second())?;
            if unit != 0 {
                varint::write_be(&mut self.out, fraction.into(), length0)?;
            }
        }
        Ok(())
    }

    fn put_bytes_handle(&mut self, value: &Bytes) -> Result<(), Error> {
        if let Some(index) = self.objects.get(value.addr()) {
            return self.put_object_ref(tag::BYTE_ARRAY, index);
        }
        self.objects.insert(value.addr(), Value::Bytes(value.clone()))?;
        let bytes = value.borrow();
        self.put_byte_block(&bytes)
    }

    fn put_byte_block(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let length = u32::try_from(bytes.len()).map_err(|_| Error::OversizedData(bytes.len()))?;
        let length0 = varint::length0_u32(length);
        self.out.put_u8(tag::BYTE_ARRAY | length0)?;
        varint::write_be(&mut self.out, length.into(), length0)?;
        Ok(self.out.put_slice(bytes)?)
    }

    fn put_list(&mut self, value: &List) -> Result<(), Error> {
        if let Some(index) = self.objects.get(value.addr()) {
            return self.put_object_ref(tag::COLLECTION, index);
        }
        self.objects.insert(value.addr(), Value::List(value.clone()))?;
        let items = value.borrow();
        let count = u32::try_from(items.len()).map_err(|_| Error::OversizedData(items.len()))?;
        let length0 = varint::length0_u32(count);
        self.out.put_u8(tag::COLLECTION | length0)?;
        varint::write_be(&mut self.out, count.into(), length0)?;
        for item in &*items {
            self.write_any(item)?;
        }
        Ok(())
    }

    fn put_map(&mut self, value: &Map) -> Result<(), Error> {
        if let Some(index) = self.objects.get(value.addr()) {
            return self.put_object_ref(tag::MAP, index);
        }
        self.objects.insert(value.addr(), Value::Map(value.clone()))?;
        let entries = value.borrow();
        let count = u32::try_from(entries.len()).map_err(|_| Error::OversizedData(entries.len()))?;
        let length0 = varint::length0_u32(count);
        self.out.put_u8(tag::MAP | length0)?;
        varint::write_be(&mut self.out, count.into(), length0)?;
        for (key, entry) in &*entries {
            self.write_any(key)?;
            self.write_any(entry)?;
        }
        Ok(())
    }

    fn put_bean(&mut self, value: &Bean) -> Result<(), Error> {
        if let Some(index) = self.objects.get(value.addr()) {
            return self.put_object_ref(tag::BEAN, index);
        }
        self.objects.insert(value.addr(), Value::Bean(value.clone()))?;
        let data = value.borrow();

        // complete instances of a class the model knows are written in
        // the declared order; everything else keeps its own order
        let declared = match self.model.resolve(data.class_names()) {
            Ok(ClassResolution::Known(declared))
                if declared.len() == data.properties().len()
                    && declared.iter().all(|name| data.properties().contains_key(name)) =>
            {
                Some(declared)
            }
            _ => None,
        };

        let selection = self.filter.selection(data.class_names());
        let keep =
            |name: &&Rc<str>| selection.is_none_or(|selection| selection.contains(name.as_ref()));
        let names: Vec<Rc<str>> = match &declared {
            Some(declared) => declared.iter().filter(keep).cloned().collect(),
            None => data.properties().keys().filter(keep).cloned().collect(),
        };

        // one render per class for as long as the written shape holds
        let text = match self.descriptors.get(data.class_names(), &names) {
            Some(text) => text,
            None => {
                let text: Rc<str> = Rc::from(descriptor_text(data.class_names(), &names));
                self.descriptors
                    .insert(data.class_names(), &names, Rc::clone(&text));
                text
            }
        };
        self.put_string_data(tag::BEAN, &text)?;
        for name in &names {
            let Some(property) = data.properties().get(name) else {
                unreachable!("descriptor names come from the defined set");
            };
            self.write_any(property)?;
        }
        Ok(())
    }
}

/// Finds the scaled form of a double: a signed integer count of exact
/// thousandths with a four-byte magnitude.
fn scaled_parts(value: f64) -> Option<(bool, u32)> {
    let target = value * 1000.0;
    #[expect(clippy::cast_possible_truncation)]
    let truncated = target as i64;
    // the truncation may land one short of the candidate that divides
    // back exactly, so try one step further from zero as well
    let step = if value < 0.0 { -1 } else { 1 };
    for candidate in [truncated, truncated.saturating_add(step)] {
        if (candidate as f64) / 1000.0 == value
            && let Ok(magnitude) = u32::try_from(candidate.unsigned_abs())
        {
            return Some((candidate < 0, magnitude));
        }
    }
    None
}

/// A fixed-capacity write-behind buffer.
#[derive(Debug)]
struct Output<W> {
    writer: W,
    buf: Vec<u8>,
    cap: usize,
}

impl<W: io::Write> Output<W> {
    fn new(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buf: Vec::with_capacity(capacity),
            cap: capacity,
        }
    }

    fn put_u8(&mut self, byte: u8) -> io::Result<()> {
        if self.buf.len() >= self.cap {
            self.flush_buf()?;
        }
        self.buf.push(byte);
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.buf.len() + bytes.len() > self.cap {
            self.flush_buf()?;
        }
        if bytes.len() >= self.cap {
            // large payloads skip the buffer entirely
            return self.writer.write_all(bytes);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.writer.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl<W: io::Write> io::Write for Output<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.put_slice(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        to_vec(value).expect("encoding must work")
    }

    #[test]
    fn integers_use_their_minimal_width() {
        assert_eq!(encode(&Value::Int(0)), [0x20, 0x00], "zero");
        assert_eq!(encode(&Value::Int(255)), [0x20, 0xff], "one byte");
        assert_eq!(encode(&Value::Int(256)), [0x21, 0x01, 0x00], "two bytes");
        assert_eq!(encode(&Value::Int(-1)), [0x28, 0x01], "sign flag");
        assert_eq!(
            encode(&Value::Int(i64::from(i32::MAX))),
            [0x23, 0x7f, 0xff, 0xff, 0xff],
            "four bytes"
        );
        assert_eq!(
            encode(&Value::Int(i64::MAX)),
            [0x27, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            "eight bytes"
        );
        assert_eq!(
            encode(&Value::Int(i64::MIN)),
            [0x2f, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            "minimum uses its unsigned magnitude"
        );
    }

    #[test]
    fn strings_inline_once_then_reference() {
        assert_eq!(encode(&Value::from("")), [0x60, 0x00], "empty string");
        assert_eq!(
            encode(&Value::from("hi")),
            [0x60, 0x02, 0x68, 0x69],
            "short string"
        );

        let shared = Value::from("hi");
        let list: List = [shared.clone(), shared].into_iter().collect();
        assert_eq!(
            encode(&Value::List(list)),
            [0x90, 0x02, 0x60, 0x02, 0x68, 0x69, 0x64, 0x00],
            "second occurrence is a reference"
        );
    }

    #[test]
    fn doubles_pick_the_shortest_faithful_form() {
        assert_eq!(encode(&Value::Float(2.0)), [0x20, 0x02], "integral collapse");
        assert_eq!(
            encode(&Value::Float(-2.0)),
            [0x28, 0x02],
            "negative integral collapse"
        );
        assert_eq!(
            encode(&Value::Float(0.5)),
            [0x49, 0x01, 0xf4],
            "scaled thousandths"
        );
        assert_eq!(
            encode(&Value::Float(-0.5)),
            [0x4d, 0x01, 0xf4],
            "scaled with sign flag"
        );
        assert_eq!(
            encode(&Value::Float(0.1)),
            [0x48, 0x64],
            "tenth is one hundred thousandths"
        );

        let raw = encode(&Value::Float(-0.0));
        assert_eq!(raw.len(), 9, "negative zero stays raw");
        assert_eq!(raw[0], 0x40, "floating tag");
        assert_eq!(raw[1..], (-0.0_f64).to_be_bytes(), "full bit pattern");

        let raw = encode(&Value::Float(f64::NAN));
        assert_eq!(raw.len(), 9, "NaN stays raw");
    }

    #[test]
    fn byte_arrays_and_containers_carry_counts() {
        assert_eq!(
            encode(&Value::Bytes(Bytes::new())),
            [0x70, 0x00],
            "empty byte array"
        );
        assert_eq!(
            encode(&Value::Bytes(vec![1, 2, 3].into())),
            [0x70, 0x03, 1, 2, 3],
            "short byte array"
        );
        assert_eq!(encode(&Value::List(List::new())), [0x90, 0x00], "empty list");
        assert_eq!(encode(&Value::Map(Map::new())), [0xa0, 0x00], "empty map");
    }

    #[test]
    fn shared_handles_become_object_references() {
        let inner = List::from(vec![Value::Int(1)]);
        let outer: List = [
            Value::List(inner.clone()),
            Value::List(inner),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            encode(&Value::List(outer)),
            // outer takes index 0, inner index 1, then a reference to 1
            [0x90, 0x02, 0x90, 0x01, 0x20, 0x01, 0x98, 0x01],
            "one definition and one reference"
        );
    }

    #[test]
    fn big_numbers_pack_their_digits() {
        assert_eq!(
            encode(&Value::BigInt(12000.into())),
            [0x30, 0x04, 0x12, 0xd3],
            "compressed digits, two per byte"
        );

        let shared = Value::BigInt(12000.into());
        let list: List = [shared.clone(), shared].into_iter().collect();
        assert_eq!(
            encode(&Value::List(list)),
            [0x90, 0x02, 0x30, 0x04, 0x12, 0xd3, 0x34, 0x00],
            "repeated number becomes a string-table reference"
        );
    }

    #[test]
    fn date_times_write_only_present_parts() {
        let date = crate::datetime::Date::new(2016, 3, 14).expect("valid date");
        assert_eq!(
            encode(&Value::from(date)),
            [0x88, 0x03, 0x0e, 0x10],
            "date part only"
        );

        let time = crate::datetime::Time::new(10, 30, 45).expect("valid time");
        assert_eq!(
            encode(&Value::from(time)),
            [0x84, 0x0a, 0x1e, 0x2d],
            "time part only"
        );

        let subsec = crate::datetime::Time::with_nanos(10, 30, 45, 500_000_000)
            .expect("valid time");
        assert_eq!(
            encode(&Value::from(subsec)),
            [0x85, 0x2a, 0x1e, 0x2d, 0x01, 0xf4],
            "milliseconds use the scaled unit"
        );

        assert_eq!(
            encode(&Value::DateTime(DateTime::default())),
            [0x80],
            "no parts at all"
        );
    }

    #[test]
    fn enums_and_classes_are_named() {
        assert_eq!(
            encode(&Value::Enum(EnumValue::new("Suit", "HEARTS"))),
            [
                0xb0, 0x04, b'S', b'u', b'i', b't', //
                0x60, 0x06, b'H', b'E', b'A', b'R', b'T', b'S',
            ],
            "class name then variant string"
        );
        assert_eq!(
            encode(&Value::Class(Rc::from("Suit"))),
            [0xc0, 0x04, b'S', b'u', b'i', b't'],
            "class reference"
        );
    }

    #[test]
    fn beans_write_descriptor_then_values() {
        let bean = Bean::new("a.B");
        bean.set("x", Value::Int(1));
        bean.set("y", Value::from("z"));

        assert_eq!(
            encode(&Value::Bean(bean)),
            [
                0xd0, 0x07, b'a', b'.', b'B', b'#', b'x', b',', b'y', //
                0x20, 0x01, //
                0x60, 0x01, b'z',
            ],
            "descriptor string then property values in order"
        );
    }

    #[test]
    fn filters_drop_properties_from_the_wire() {
        let bean = Bean::new("a.B");
        bean.set("x", Value::Int(1));
        bean.set("y", Value::Int(2));

        let mut filter = PropertyFilter::new();
        filter.add("a.B", &["y"]);

        let mut enc = Encoder::new(Vec::new());
        enc.set_filter(filter);
        enc.write_bean(&bean).expect("encoding must work");
        assert_eq!(
            enc.into_inner(),
            [0xd0, 0x05, b'a', b'.', b'B', b'#', b'y', 0x20, 0x02],
            "descriptor and values keep only the selection"
        );
    }

    #[test]
    fn tiny_buffers_flush_as_they_fill() {
        let value = Value::from("a longer string that cannot fit the buffer");
        let mut enc = Encoder::with_capacity(0, Vec::new());
        enc.write_any(&value).expect("encoding must work");
        let buffered = enc.into_inner();
        assert_eq!(buffered, encode(&value), "same bytes as the default buffer");
    }
}
