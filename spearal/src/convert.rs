//! Conversions from decoded values into concrete Rust types.

use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::datetime::{Date, DateTime, Time};
use crate::value::{Bean, Bytes, EnumValue, List, Map, Value};

/// A value that does not fit the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The value has a different kind entirely.
    #[error("expected {want}, found {found}")]
    Mismatch {
        want: &'static str,
        found: &'static str,
    },
    /// The kind matches but the value is outside the target's range.
    #[error("{found} value does not fit {want}")]
    OutOfRange {
        want: &'static str,
        found: &'static str,
    },
    /// The value has no equivalent in the target type, like a date-time
    /// without the needed part.
    #[error("value cannot be represented as {want}")]
    Unrepresentable { want: &'static str },
}

/// A type that can be produced from a decoded [`Value`].
///
/// This is the seam behind [`Decoder::read_as`](crate::dec::Decoder::read_as)
/// and the slice-level helpers; implement it for your own types to read
/// them directly.
pub trait FromValue: Sized {
    /// Converts a decoded value.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the value cannot become `Self`.
    fn from_value(value: Value) -> Result<Self, ConvertError>;
}

fn mismatch(want: &'static str, found: &Value) -> ConvertError {
    ConvertError::Mismatch {
        want,
        found: found.type_name(),
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($int:ty),* $(,)?) => {$(
        impl FromValue for $int {
            fn from_value(value: Value) -> Result<Self, ConvertError> {
                const WANT: &str = stringify!($int);
                match value {
                    Value::Int(value) => Self::try_from(value).map_err(|_| {
                        ConvertError::OutOfRange { want: WANT, found: "integer" }
                    }),
                    Value::BigInt(value) => Self::try_from(value).map_err(|_| {
                        ConvertError::OutOfRange { want: WANT, found: "big integer" }
                    }),
                    other => Err(mismatch(WANT, &other)),
                }
            }
        }
    )*};
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Float(value) => Ok(value),
            // integral doubles may arrive collapsed to plain integers
            Value::Int(value) => Ok(value as Self),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::String(text) => Ok(text.as_ref().to_owned()),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for Rc<str> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::String(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for BigInt {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::BigInt(value) => Ok(value),
            Value::Int(value) => Ok(value.into()),
            other => Err(mismatch("big integer", &other)),
        }
    }
}

impl FromValue for BigDecimal {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::BigDecimal(value) => Ok(value),
            Value::BigInt(value) => Ok(value.into()),
            Value::Int(value) => Ok(value.into()),
            other => Err(mismatch("big decimal", &other)),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(mismatch("byte array", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        Bytes::from_value(value).map(|bytes| bytes.borrow().clone())
    }
}

impl FromValue for DateTime {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::DateTime(value) => Ok(value),
            other => Err(mismatch("date-time", &other)),
        }
    }
}

impl FromValue for Date {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        DateTime::from_value(value)?
            .date()
            .ok_or(ConvertError::Unrepresentable { want: "date" })
    }
}

impl FromValue for Time {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        DateTime::from_value(value)?
            .time()
            .ok_or(ConvertError::Unrepresentable { want: "time" })
    }
}

impl FromValue for time::PrimitiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        let value = DateTime::from_value(value)?;
        Self::try_from(value).map_err(|_| ConvertError::Unrepresentable {
            want: "calendar date-time",
        })
    }
}

impl FromValue for List {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::List(list) => Ok(list),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        List::from_value(value).map(|list| list.borrow().clone())
    }
}

impl FromValue for Map {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl FromValue for EnumValue {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Enum(value) => Ok(value),
            other => Err(mismatch("enum", &other)),
        }
    }
}

impl FromValue for Bean {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bean(bean) => Ok(bean),
            other => Err(mismatch("bean", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
