//! Decoding values from the wire format.

use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::convert::FromValue;
use crate::datetime::{Date, DateTime, DateTimeError, Time};
use crate::model::{ClassDescriptor, ClassModel, ClassResolution, DynamicModel};
use crate::value::{Bean, BeanData, Bytes, EnumValue, List, Map, Value};
use crate::{bignum, tag};

mod error;
mod read;

pub use error::Error;
use read::Input;

/// Default size of the byte buffer between the decoder and its source.
const BUFFER_LEN: usize = 1024;

/// Capacity floor; the buffer must hold the longest fixed span.
const MIN_CAPACITY: usize = 8;

/// Largest container prealloc a count field is trusted for.
const MAX_PREALLOC: usize = 0x1000;

/// Decodes a single value from a byte slice.
///
/// # Errors
///
/// Returns [`Err`] if the bytes are malformed, or if the slice holds
/// anything past its one value.
pub fn from_slice(bytes: &[u8]) -> Result<Value, Error> {
    let mut reader = bytes;
    let mut decoder = Decoder::new(&mut reader);
    let value = decoder.read_any()?;
    let leftover = decoder.input.available() + reader.len();
    if leftover > 0 {
        return Err(Error::SliceExcessData(leftover));
    }
    Ok(value)
}

/// Decodes a single value from an [`io::Read`].
///
/// Bytes past the first value are left behind in an internal buffer, so
/// this suits sources holding exactly one value. Use a [`Decoder`] to
/// read a stream of values.
///
/// # Errors
///
/// Returns [`Err`] if the input is malformed or the reader fails.
pub fn from_reader<R: io::Read>(reader: R) -> Result<Value, Error> {
    Decoder::new(reader).read_any()
}

/// A decoder for this crate's wire format.
///
/// The reference tables live on the decoder, so consecutive reads resolve
/// back-references across values. A fresh decoder per message gives the
/// independent-message behavior.
#[derive(Debug)]
pub struct Decoder<R, M = DynamicModel> {
    input: Input<R>,
    model: M,
    strings: Vec<Rc<str>>,
    objects: Vec<Value>,
    // one memo per wire kind: a digit string parses differently as an
    // integer and as a decimal
    integrals: HashMap<Rc<str>, Value>,
    floatings: HashMap<Rc<str>, Value>,
    descriptors: HashMap<Rc<str>, Rc<ClassDescriptor>>,
}

impl<R: io::Read> Decoder<R> {
    /// Creates a decoder with the default buffer size.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(BUFFER_LEN, reader)
    }

    /// Creates a decoder with the given buffer capacity.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            input: Input::new(reader, capacity.max(MIN_CAPACITY)),
            model: DynamicModel,
            strings: Vec::new(),
            objects: Vec::new(),
            integrals: HashMap::new(),
            floatings: HashMap::new(),
            descriptors: HashMap::new(),
        }
    }
}

impl<R, M> Decoder<R, M> {
    /// Replaces the class model beans are checked against.
    #[must_use]
    pub fn with_model<M2: ClassModel>(self, model: M2) -> Decoder<R, M2> {
        Decoder {
            input: self.input,
            model,
            strings: self.strings,
            objects: self.objects,
            integrals: self.integrals,
            floatings: self.floatings,
            descriptors: self.descriptors,
        }
    }
}

impl<R: io::Read, M: ClassModel> Decoder<R, M> {
    /// Whether the input holds no further value.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the reader fails.
    pub fn at_end(&mut self) -> Result<bool, Error> {
        Ok(self.input.at_end()?)
    }

    /// Decodes the next value.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the input is malformed or the reader fails.
    pub fn read_any(&mut self) -> Result<Value, Error> {
        let tag_byte = self.input.take_u8()?;
        self.read_tagged(tag_byte)
    }

    /// Decodes the next value and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the input is malformed, the reader fails, or
    /// the value does not convert to `T`.
    pub fn read_as<T: FromValue>(&mut self) -> Result<T, Error> {
        let value = self.read_any()?;
        Ok(T::from_value(value)?)
    }

    /// Reads past the next value, discarding it.
    ///
    /// Definitions inside the skipped value still register, so later
    /// back-references into it stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the input is malformed or the reader fails.
    pub fn skip_any(&mut self) -> Result<(), Error> {
        self.read_any().map(drop)
    }

    fn read_tagged(&mut self, tag_byte: u8) -> Result<Value, Error> {
        match tag::kind_of(tag_byte) {
            tag::NULL => Ok(Value::Null),
            tag::TRUE => Ok(Value::Bool(true)),
            tag::FALSE => Ok(Value::Bool(false)),
            tag::INTEGRAL => self.read_integral(tag_byte),
            tag::BIG_INTEGRAL => self.read_big_number(tag_byte, false),
            tag::FLOATING => self.read_floating(tag_byte),
            tag::BIG_FLOATING => self.read_big_number(tag_byte, true),
            tag::STRING => Ok(Value::String(self.read_string_data(tag_byte)?)),
            tag::BYTE_ARRAY => self.read_byte_array(tag_byte),
            tag::DATE_TIME => self.read_date_time(tag_byte),
            tag::COLLECTION => self.read_list(tag_byte),
            tag::MAP => self.read_map(tag_byte),
            tag::ENUM => self.read_enum(tag_byte),
            tag::CLASS => Ok(Value::Class(self.read_string_data(tag_byte)?)),
            tag::BEAN => self.read_bean(tag_byte),
            _ => Err(Error::UnknownTag(tag_byte)),
        }
    }

    fn read_integral(&mut self, tag_byte: u8) -> Result<Value, Error> {
        let len = usize::from(tag_byte & 0x07) + 1;
        let magnitude = self.input.take_magnitude(len)?;
        if tag_byte & tag::INTEGRAL_SIGN != 0 {
            if magnitude == i64::MIN.unsigned_abs() {
                return Ok(Value::Int(i64::MIN));
            }
            let value = i64::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
            Ok(Value::Int(-value))
        } else {
            let value = i64::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
            Ok(Value::Int(value))
        }
    }

    fn read_floating(&mut self, tag_byte: u8) -> Result<Value, Error> {
        if tag_byte & tag::FLOAT_SCALED != 0 {
            let magnitude = self.take_short_magnitude(tag_byte)?;
            // four wire bytes at most, so the cast is exact
            let mut value = magnitude as f64 / 1000.0;
            if tag_byte & tag::FLOAT_SIGN != 0 {
                value = -value;
            }
            Ok(Value::Float(value))
        } else if tag_byte == tag::FLOATING {
            let bits = self.input.take_array::<8>()?;
            Ok(Value::Float(f64::from_be_bytes(bits)))
        } else {
            // low bits carry meaning only under the scaled flag
            Err(Error::UnknownTag(tag_byte))
        }
    }

    fn read_string_data(&mut self, tag_byte: u8) -> Result<Rc<str>, Error> {
        if tag_byte & tag::STRING_REF != 0 {
            let index = self.take_index(tag_byte)?;
            return self.shared_string(index);
        }
        let magnitude = self.take_short_magnitude(tag_byte)?;
        let byte_len = usize::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
        if byte_len == 0 {
            // the empty string is always inline and never registered
            return Ok(Rc::from(""));
        }
        let bytes = self.input.take_vec(byte_len)?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Err(Error::InvalidUtf8);
        };
        let text: Rc<str> = Rc::from(text);
        self.strings.push(Rc::clone(&text));
        Ok(text)
    }

    fn read_big_number(&mut self, tag_byte: u8, floating: bool) -> Result<Value, Error> {
        let repr = if tag_byte & tag::STRING_REF != 0 {
            let index = self.take_index(tag_byte)?;
            self.shared_string(index)?
        } else {
            let magnitude = self.take_short_magnitude(tag_byte)?;
            let count = usize::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
            let packed = self.input.take_vec(count.div_ceil(2))?;
            let repr = bignum::unpack(count, &packed).ok_or(Error::InvalidBigNumber)?;
            let repr: Rc<str> = Rc::from(repr);
            self.strings.push(Rc::clone(&repr));
            repr
        };
        let memo = if floating {
            &mut self.floatings
        } else {
            &mut self.integrals
        };
        if let Some(value) = memo.get(&repr) {
            return Ok(value.clone());
        }
        let value = if floating {
            let number = bignum::parse_floating(&repr).ok_or(Error::InvalidBigNumber)?;
            Value::BigDecimal(number)
        } else {
            let number = bignum::parse_integral(&repr).ok_or(Error::InvalidBigNumber)?;
            // integers that fit collapse to the plain representation
            match i64::try_from(&number) {
                Ok(small) => Value::Int(small),
                Err(_) => Value::BigInt(number),
            }
        };
        memo.insert(repr, value.clone());
        Ok(value)
    }

    fn read_byte_array(&mut self, tag_byte: u8) -> Result<Value, Error> {
        if tag_byte & tag::OBJECT_REF != 0 {
            let index = self.take_index(tag_byte)?;
            return self.shared_object(index);
        }
        let magnitude = self.take_short_magnitude(tag_byte)?;
        let byte_len = usize::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
        let bytes = Bytes::from(self.input.take_vec(byte_len)?);
        self.objects.push(Value::Bytes(bytes.clone()));
        Ok(Value::Bytes(bytes))
    }

    fn read_date_time(&mut self, tag_byte: u8) -> Result<Value, Error> {
        let unit = tag_byte & 0x03;
        if tag_byte & tag::TIME_PART == 0 && unit != 0 {
            return Err(Error::UnknownTag(tag_byte));
        }

        let date = if tag_byte & tag::DATE_PART != 0 {
            let month_byte = self.input.take_u8()?;
            let day = self.input.take_u8()?;
            let len = usize::from((month_byte >> 4) & 0x03) + 1;
            let magnitude = self.input.take_magnitude(len)?;
            let Ok(offset) = i64::try_from(magnitude) else {
                unreachable!("two-bit length fields cap at four bytes");
            };
            let year = if month_byte & 0x80 == 0 {
                2000 + offset
            } else {
                2000 - offset
            };
            Some(Date::new(year, month_byte & 0x0f, day)?)
        } else {
            None
        };

        let time = if tag_byte & tag::TIME_PART != 0 {
            let hour_byte = self.input.take_u8()?;
            let minute = self.input.take_u8()?;
            let second = self.input.take_u8()?;
            if unit == 0 {
                Some(Time::new(hour_byte, minute, second)?)
            } else {
                let len = usize::from((hour_byte >> 5) & 0x03) + 1;
                let magnitude = self.input.take_magnitude(len)?;
                let Ok(fraction) = u32::try_from(magnitude) else {
                    unreachable!("two-bit length fields cap at four bytes");
                };
                let nanosecond = match unit {
                    1 => fraction.checked_mul(1_000_000),
                    2 => fraction.checked_mul(1_000),
                    _ => Some(fraction),
                }
                .ok_or(DateTimeError::OutOfRange {
                    field: "subsecond",
                    value: i128::from(fraction),
                })?;
                Some(Time::with_nanos(hour_byte & 0x1f, minute, second, nanosecond)?)
            }
        } else {
            None
        };

        Ok(Value::DateTime(DateTime::from_parts(date, time)))
    }

    fn read_list(&mut self, tag_byte: u8) -> Result<Value, Error> {
        if tag_byte & tag::OBJECT_REF != 0 {
            let index = self.take_index(tag_byte)?;
            return self.shared_object(index);
        }
        let count = self.take_count(tag_byte)?;

        // register before the items so a cycle can reference back
        let list = List::new();
        self.objects.push(Value::List(list.clone()));

        let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            items.push(self.read_any()?);
        }
        *list.borrow_mut() = items;
        Ok(Value::List(list))
    }

    fn read_map(&mut self, tag_byte: u8) -> Result<Value, Error> {
        if tag_byte & tag::OBJECT_REF != 0 {
            let index = self.take_index(tag_byte)?;
            return self.shared_object(index);
        }
        let count = self.take_count(tag_byte)?;

        let map = Map::new();
        self.objects.push(Value::Map(map.clone()));

        let mut entries = IndexMap::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            let key = self.read_any()?;
            let value = self.read_any()?;
            entries.insert(key, value);
        }
        *map.borrow_mut() = entries;
        Ok(Value::Map(map))
    }

    fn read_enum(&mut self, tag_byte: u8) -> Result<Value, Error> {
        let class_name = self.read_string_data(tag_byte)?;
        let variant_tag = self.input.take_u8()?;
        if tag::kind_of(variant_tag) != tag::STRING {
            return Err(Error::InvalidEnum);
        }
        let variant = self.read_string_data(variant_tag)?;
        Ok(Value::Enum(EnumValue::from_parts(class_name, variant)))
    }

    fn read_bean(&mut self, tag_byte: u8) -> Result<Value, Error> {
        if tag_byte & tag::OBJECT_REF != 0 {
            let index = self.take_index(tag_byte)?;
            return self.shared_object(index);
        }
        let text = self.read_string_data(tag_byte)?;
        let descriptor = self.descriptor(&text)?;
        let declared = match self.model.resolve(&descriptor.class_names)? {
            ClassResolution::Known(declared) => Some(declared),
            ClassResolution::Dynamic => None,
        };

        // register before the properties so a cycle can reference back
        let bean = Bean::from_data(BeanData {
            class_names: descriptor.class_names.clone(),
            properties: IndexMap::new(),
            declared: declared.clone(),
            partial: false,
        });
        self.objects.push(Value::Bean(bean.clone()));

        let mut properties = IndexMap::with_capacity(descriptor.properties.len());
        let mut unmatched = false;
        for name in &descriptor.properties {
            let value = self.read_any()?;
            let known = declared
                .as_ref()
                .is_none_or(|declared| declared.contains(name));
            if known {
                properties.insert(Rc::clone(name), value);
            } else {
                // schema drift: the sender's class declares a property
                // this side's does not
                unmatched = true;
                let class_name = &descriptor.class_names[0];
                log::debug!("dropping unknown property {name} of class {class_name}");
            }
        }
        let partial = declared.as_ref().is_some_and(|declared| {
            unmatched || declared.iter().any(|name| !properties.contains_key(name))
        });

        {
            let mut data = bean.borrow_mut();
            data.properties = properties;
            data.partial = partial;
        }
        Ok(Value::Bean(bean))
    }

    /// Reads a magnitude whose width comes from a 2-bit `length0` field.
    fn take_short_magnitude(&mut self, tag_byte: u8) -> Result<u64, Error> {
        let len = usize::from(tag_byte & 0x03) + 1;
        Ok(self.input.take_magnitude(len)?)
    }

    fn take_index(&mut self, tag_byte: u8) -> Result<u32, Error> {
        let magnitude = self.take_short_magnitude(tag_byte)?;
        let Ok(index) = u32::try_from(magnitude) else {
            unreachable!("two-bit length fields cap at four bytes");
        };
        Ok(index)
    }

    fn take_count(&mut self, tag_byte: u8) -> Result<usize, Error> {
        let magnitude = self.take_short_magnitude(tag_byte)?;
        usize::try_from(magnitude).map_err(|_| Error::IntegerOverflow)
    }

    fn shared_string(&self, index: u32) -> Result<Rc<str>, Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .cloned()
            .ok_or(Error::InvalidReference(index))
    }

    fn shared_object(&self, index: u32) -> Result<Value, Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.objects.get(i))
            .cloned()
            .ok_or(Error::InvalidReference(index))
    }

    fn descriptor(&mut self, text: &Rc<str>) -> Result<Rc<ClassDescriptor>, Error> {
        if let Some(descriptor) = self.descriptors.get(text) {
            return Ok(Rc::clone(descriptor));
        }
        let descriptor = Rc::new(ClassDescriptor::parse(text)?);
        self.descriptors
            .insert(Rc::clone(text), Rc::clone(&descriptor));
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use crate::model::Registry;
    use crate::value::PropertyError;

    use super::*;

    fn decode(bytes: &[u8]) -> Value {
        from_slice(bytes).expect("decoding must work")
    }

    #[test]
    fn integral_magnitudes_and_signs() {
        assert_eq!(decode(&[0x20, 0x00]), Value::Int(0), "zero");
        assert_eq!(decode(&[0x21, 0x01, 0x00]), Value::Int(256), "two bytes");
        assert_eq!(decode(&[0x28, 0x01]), Value::Int(-1), "sign flag");
        assert_eq!(
            decode(&[0x2f, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Value::Int(i64::MIN),
            "the minimum round-trips through its magnitude"
        );

        let err = from_slice(&[0x27, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
            .expect_err("positive magnitude past the maximum");
        assert!(matches!(err, Error::IntegerOverflow), "got {err:?}");

        let err = from_slice(&[0x2f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
            .expect_err("negative magnitude past the minimum");
        assert!(matches!(err, Error::IntegerOverflow), "got {err:?}");
    }

    #[test]
    fn floating_forms() {
        assert_eq!(decode(&[0x49, 0x01, 0xf4]), Value::Float(0.5), "scaled");
        assert_eq!(
            decode(&[0x4d, 0x01, 0xf4]),
            Value::Float(-0.5),
            "scaled with sign"
        );

        let mut raw = vec![0x40];
        raw.extend_from_slice(&std::f64::consts::PI.to_be_bytes());
        assert_eq!(decode(&raw), Value::Float(std::f64::consts::PI), "raw bits");

        let err = from_slice(&[0x42, 0x00]).expect_err("length bits without the scaled flag");
        assert!(matches!(err, Error::UnknownTag(0x42)), "got {err:?}");
    }

    #[test]
    fn string_references_share_one_allocation() {
        let value = decode(&[0x90, 0x02, 0x60, 0x02, 0x68, 0x69, 0x64, 0x00]);
        let Value::List(list) = value else {
            panic!("expected a list, got {value:?}");
        };
        let items = list.borrow();
        let [Value::String(first), Value::String(second)] = &items[..] else {
            panic!("expected two strings, got {items:?}");
        };
        assert_eq!(&**first, "hi", "string data");
        assert!(Rc::ptr_eq(first, second), "reference resolves to the same Rc");
    }

    #[test]
    fn big_numbers_collapse_and_memoize() {
        assert_eq!(
            decode(&[0x30, 0x04, 0x12, 0xd3]),
            Value::Int(12000),
            "a compressed 12E3 fits a plain integer"
        );

        let value = decode(&[0x50, 0x04, 0x0c, 0x50]);
        let Value::BigDecimal(number) = value else {
            panic!("expected a big decimal, got {value:?}");
        };
        assert_eq!(number.to_string(), "0.50", "digits survive exactly");

        let err = from_slice(&[0x30, 0x02, 0xeb]).expect_err("0xE is not in the alphabet");
        assert!(matches!(err, Error::InvalidBigNumber), "got {err:?}");
    }

    #[test]
    fn shared_digits_parse_under_each_kind() {
        // a list of "100" as a big decimal, then the same table string
        // referenced under the big-integer tag
        let hundred: BigDecimal = "100".parse().expect("valid digits");
        assert_eq!(
            decode(&[0x90, 0x02, 0x50, 0x03, 0x10, 0x00, 0x34, 0x00]),
            Value::from(vec![Value::BigDecimal(hundred.clone()), Value::Int(100)]),
            "the decimal parse does not shadow the integer"
        );

        // the reverse order, integer first
        assert_eq!(
            decode(&[0x90, 0x02, 0x30, 0x03, 0x10, 0x00, 0x54, 0x00]),
            Value::from(vec![Value::Int(100), Value::BigDecimal(hundred)]),
            "the integer parse does not shadow the decimal"
        );
    }

    #[test]
    fn date_time_parts() {
        let expected = Date::new(2016, 3, 14).expect("valid date");
        assert_eq!(
            decode(&[0x88, 0x03, 0x0e, 0x10]),
            Value::from(expected),
            "date part"
        );

        let expected = Time::with_nanos(10, 30, 45, 500_000_000).expect("valid time");
        assert_eq!(
            decode(&[0x85, 0x2a, 0x1e, 0x2d, 0x01, 0xf4]),
            Value::from(expected),
            "time part with milliseconds"
        );

        assert_eq!(
            decode(&[0x80]),
            Value::DateTime(DateTime::default()),
            "no parts"
        );

        let err = from_slice(&[0x88, 0x0d, 0x01, 0x00]).expect_err("month 13 is out of range");
        assert!(matches!(err, Error::DateTime(_)), "got {err:?}");

        let err = from_slice(&[0x83]).expect_err("sub-second unit without a time part");
        assert!(matches!(err, Error::UnknownTag(0x83)), "got {err:?}");
    }

    #[test]
    fn cyclic_references_resolve_to_the_placeholder() {
        let value = decode(&[0x90, 0x01, 0x98, 0x00]);
        let Value::List(list) = value else {
            panic!("expected a list, got {value:?}");
        };
        let items = list.borrow();
        let [Value::List(inner)] = &items[..] else {
            panic!("expected one nested list, got {items:?}");
        };
        assert!(list.ptr_eq(inner), "the list contains itself");
    }

    #[test]
    fn beans_decode_with_dynamic_classes() {
        let value = decode(&[
            0xd0, 0x07, b'a', b'.', b'B', b'#', b'x', b',', b'y', //
            0x20, 0x01, //
            0x60, 0x01, b'z',
        ]);
        let Value::Bean(bean) = value else {
            panic!("expected a bean, got {value:?}");
        };
        assert_eq!(bean.get("x").expect("defined"), Value::Int(1), "first");
        assert_eq!(bean.get("y").expect("defined"), Value::from("z"), "second");
        assert!(!bean.is_partial(), "dynamic beans are never partial");
        assert!(
            matches!(bean.get("zz"), Err(PropertyError::Unknown)),
            "anything else is unknown"
        );
    }

    #[test]
    fn unknown_properties_are_dropped_against_a_known_class() {
        let mut registry = Registry::new();
        registry.register("a.B", &["x"]).expect("fresh class");

        let bytes = [
            0xd0, 0x07, b'a', b'.', b'B', b'#', b'x', b',', b'y', //
            0x20, 0x01, //
            0x20, 0x02,
        ];
        let mut reader = &bytes[..];
        let mut decoder = Decoder::new(&mut reader).with_model(registry);
        let value = decoder.read_any().expect("decoding must work");

        let Value::Bean(bean) = value else {
            panic!("expected a bean, got {value:?}");
        };
        assert_eq!(bean.get("x").expect("declared"), Value::Int(1), "kept");
        assert!(
            matches!(bean.get("y"), Err(PropertyError::Unknown)),
            "dropped property is unknown"
        );
        assert!(bean.is_partial(), "dropping a property leaves the bean partial");
    }

    #[test]
    fn declared_but_missing_properties_are_undefined() {
        let mut registry = Registry::new();
        registry.register("a.B", &["x", "y"]).expect("fresh class");

        let bytes = [0xd0, 0x05, b'a', b'.', b'B', b'#', b'x', 0x20, 0x01];
        let mut reader = &bytes[..];
        let mut decoder = Decoder::new(&mut reader).with_model(registry);
        let value = decoder.read_any().expect("decoding must work");

        let Value::Bean(bean) = value else {
            panic!("expected a bean, got {value:?}");
        };
        assert!(bean.is_partial(), "missing declared property");
        assert!(
            matches!(bean.get("y"), Err(PropertyError::Undefined)),
            "declared but not transmitted"
        );
    }

    #[test]
    fn unregistered_classes_are_rejected_by_a_strict_model() {
        let bytes = [0xd0, 0x05, b'a', b'.', b'B', b'#', b'x', 0x20, 0x01];
        let mut reader = &bytes[..];
        let mut decoder = Decoder::new(&mut reader).with_model(Registry::new());
        let err = decoder.read_any().expect_err("the registry is empty");
        assert!(matches!(err, Error::UnknownClass(_)), "got {err:?}");
    }

    #[test]
    fn malformed_input_is_rejected() {
        let err = from_slice(&[0x10]).expect_err("unassigned tag");
        assert!(matches!(err, Error::UnknownTag(0x10)), "got {err:?}");

        let err = from_slice(&[0x64, 0x00]).expect_err("reference into an empty table");
        assert!(matches!(err, Error::InvalidReference(0)), "got {err:?}");

        let err = from_slice(&[0x98, 0x05]).expect_err("object reference out of range");
        assert!(matches!(err, Error::InvalidReference(5)), "got {err:?}");

        let err = from_slice(&[0x60, 0x02, 0x68]).expect_err("string data cut short");
        assert!(
            matches!(&err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof),
            "got {err:?}"
        );

        let err = from_slice(&[0x60, 0x02, 0xff, 0xfe]).expect_err("invalid UTF-8");
        assert!(matches!(err, Error::InvalidUtf8), "got {err:?}");

        let err = from_slice(&[0x00, 0x00]).expect_err("a slice holds exactly one value");
        assert!(matches!(err, Error::SliceExcessData(1)), "got {err:?}");

        let err = from_slice(&[0xb0, 0x01, b'S', 0x20, 0x01]).expect_err("variant is an integer");
        assert!(matches!(err, Error::InvalidEnum), "got {err:?}");
    }

    #[test]
    fn streams_share_tables_across_values() {
        let bytes = [
            0x60, 0x02, 0x68, 0x69, // "hi"
            0x64, 0x00, // reference to it as a second top-level value
        ];
        let mut decoder = Decoder::new(&bytes[..]);
        assert!(!decoder.at_end().expect("read works"), "input remains");
        let first = decoder.read_any().expect("decoding must work");
        let second = decoder.read_any().expect("decoding must work");
        assert_eq!(first, Value::from("hi"), "definition");
        assert_eq!(second, Value::from("hi"), "reference");
        assert!(decoder.at_end().expect("read works"), "input exhausted");
    }
}
