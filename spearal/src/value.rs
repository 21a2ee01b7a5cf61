//! The dynamic value model.
//!
//! Composite values hold their contents behind [`Rc`]`<`[`RefCell`]`<_>>`,
//! so cloning is shallow and two handles can point at the same underlying
//! collection. Encoding preserves that sharing on the wire, which is also
//! what makes cyclic graphs representable.

use std::cell::{Ref, RefCell, RefMut};
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use smallvec::{SmallVec, smallvec};

use crate::datetime::{Date, DateTime, Time};

/// Error returned by [`Bean::get`] for a property without a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PropertyError {
    /// The class declares the property, but this instance carries no value
    /// for it. Happens when the sender filtered the property out.
    #[error("property is declared but carries no value")]
    Undefined,
    /// The property is not part of the class at all.
    #[error("property is not part of the class")]
    Unknown,
}

/// Any value the wire format can carry.
///
/// Equality and hashing are bit-exact rather than numeric: floats compare
/// by their bit pattern (so NaN equals NaN and `0.0` differs from `-0.0`),
/// big decimals compare digits and scale, and maps compare in iteration
/// order. Composite comparisons recurse through the graph and do not
/// terminate on cyclic values; identical handles short-circuit first.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    String(Rc<str>),
    Bytes(Bytes),
    DateTime(DateTime),
    List(List),
    Map(Map),
    Enum(EnumValue),
    Class(Rc<str>),
    Bean(Bean),
}

impl Value {
    /// Short noun for error messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::BigInt(_) => "big integer",
            Self::BigDecimal(_) => "big decimal",
            Self::String(_) => "string",
            Self::Bytes(_) => "byte array",
            Self::DateTime(_) => "date-time",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Enum(_) => "enum",
            Self::Class(_) => "class",
            Self::Bean(_) => "bean",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::BigDecimal(a), Self::BigDecimal(b)) => {
                a.as_bigint_and_exponent() == b.as_bigint_and_exponent()
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Bean(a), Self::Bean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(value) => value.hash(state),
            Self::Int(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::BigInt(value) => value.hash(state),
            Self::BigDecimal(value) => {
                let (digits, scale) = value.as_bigint_and_exponent();
                digits.hash(state);
                scale.hash(state);
            }
            Self::String(value) | Self::Class(value) => value.hash(state),
            Self::Bytes(value) => value.borrow().hash(state),
            Self::DateTime(value) => value.hash(state),
            Self::List(value) => value.borrow().hash(state),
            Self::Map(value) => {
                let entries = value.borrow();
                entries.len().hash(state);
                for (key, entry) in &*entries {
                    key.hash(state);
                    entry.hash(state);
                }
            }
            Self::Enum(value) => value.hash(state),
            Self::Bean(value) => value.borrow().hash(state),
        }
    }
}

/// A shared, growable sequence of values.
#[derive(Debug, Clone, Default)]
pub struct List(Rc<RefCell<Vec<Value>>>);

/// A shared map that remembers insertion order.
///
/// Keys may be any [`Value`], including composites; key identity follows
/// the bit-exact equality rules of [`Value`].
#[derive(Debug, Clone, Default)]
pub struct Map(Rc<RefCell<IndexMap<Value, Value>>>);

/// A shared byte buffer.
#[derive(Debug, Clone, Default)]
pub struct Bytes(Rc<RefCell<Vec<u8>>>);

macro_rules! impl_composite {
    ($name:ident, $inner:ty) => {
        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Borrows the contents immutably.
            pub fn borrow(&self) -> Ref<'_, $inner> {
                self.0.borrow()
            }

            /// Borrows the contents for modification.
            pub fn borrow_mut(&self) -> RefMut<'_, $inner> {
                self.0.borrow_mut()
            }

            /// Whether both handles point at the same underlying value.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Rc::ptr_eq(&self.0, &other.0)
            }

            /// Stable address of the shared allocation, used as the
            /// identity key while encoding.
            pub(crate) fn addr(&self) -> usize {
                Rc::as_ptr(&self.0).addr()
            }
        }
    };
}

impl_composite!(List, Vec<Value>);
impl_composite!(Map, IndexMap<Value, Value>);
impl_composite!(Bytes, Vec<u8>);

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl Eq for List {}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        // insertion order is part of the wire format, so it is part of
        // equality as well
        let (a, b) = (self.borrow(), other.borrow());
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
    }
}

impl Eq for Map {}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl Eq for Bytes {}

impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl From<IndexMap<Value, Value>> for Map {
    fn from(entries: IndexMap<Value, Value>) -> Self {
        Self(Rc::new(RefCell::new(entries)))
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<IndexMap<_, _>>())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(bytes)))
    }
}

/// A named constant of a named enumeration class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    class_name: Rc<str>,
    variant: Rc<str>,
}

impl EnumValue {
    pub fn new(class_name: &str, variant: &str) -> Self {
        Self {
            class_name: Rc::from(class_name),
            variant: Rc::from(variant),
        }
    }

    pub(crate) fn from_parts(class_name: Rc<str>, variant: Rc<str>) -> Self {
        Self {
            class_name,
            variant,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }
}

/// The state behind a [`Bean`] handle.
#[derive(Debug)]
pub struct BeanData {
    pub(crate) class_names: SmallVec<[Rc<str>; 1]>,
    pub(crate) properties: IndexMap<Rc<str>, Value>,
    pub(crate) declared: Option<Rc<IndexSet<Rc<str>>>>,
    pub(crate) partial: bool,
}

impl BeanData {
    /// The class this instance belongs to, possibly followed by further
    /// names the sender attached to it.
    pub fn class_names(&self) -> &[Rc<str>] {
        &self.class_names
    }

    /// The defined properties in their wire order.
    pub fn properties(&self) -> &IndexMap<Rc<str>, Value> {
        &self.properties
    }

    /// The full property set of the class, when it is known.
    pub fn declared(&self) -> Option<&IndexSet<Rc<str>>> {
        self.declared.as_deref()
    }

    /// Whether any declared property arrived without a value.
    pub fn is_partial(&self) -> bool {
        self.partial
    }
}

/// A shared object with a class name and named properties.
///
/// Property order is preserved. A bean decoded against a known class can
/// be *partial*: declared properties the sender filtered out report
/// [`PropertyError::Undefined`] instead of a value.
#[derive(Debug, Clone)]
pub struct Bean(Rc<RefCell<BeanData>>);

impl Bean {
    pub fn new(class_name: &str) -> Self {
        Self::from_data(BeanData {
            class_names: smallvec![Rc::from(class_name)],
            properties: IndexMap::new(),
            declared: None,
            partial: false,
        })
    }

    pub(crate) fn from_data(data: BeanData) -> Self {
        Self(Rc::new(RefCell::new(data)))
    }

    /// Attaches a further class name after the primary one.
    pub fn add_class(&self, class_name: &str) {
        self.0.borrow_mut().class_names.push(Rc::from(class_name));
    }

    /// Defines a property, replacing any previous value but keeping its
    /// original position. The declared set is not consulted.
    pub fn set(&self, property: &str, value: Value) {
        self.0.borrow_mut().properties.insert(Rc::from(property), value);
    }

    /// Looks up a defined property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Undefined`] for a property the class
    /// declares but this instance does not carry, and
    /// [`PropertyError::Unknown`] for anything else.
    pub fn get(&self, property: &str) -> Result<Value, PropertyError> {
        let data = self.0.borrow();
        if let Some(value) = data.properties.get(property) {
            return Ok(value.clone());
        }
        let declared = data
            .declared
            .as_ref()
            .is_some_and(|declared| declared.contains(property));
        if declared {
            Err(PropertyError::Undefined)
        } else {
            Err(PropertyError::Unknown)
        }
    }

    /// Whether any declared property arrived without a value.
    pub fn is_partial(&self) -> bool {
        self.0.borrow().partial
    }

    /// Borrows the full state, including class names and declared set.
    pub fn borrow(&self) -> Ref<'_, BeanData> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, BeanData> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same underlying instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).addr()
    }
}

impl PartialEq for Bean {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (self.borrow(), other.borrow());
        a.class_names == b.class_names
            && a.partial == b.partial
            && a.properties.len() == b.properties.len()
            && a.properties.iter().zip(b.properties.iter()).all(|(x, y)| x == y)
    }
}

impl Eq for Bean {}

impl Hash for BeanData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class_names.hash(state);
        self.partial.hash(state);
        self.properties.len().hash(state);
        for (name, value) in &self.properties {
            name.hash(state);
            value.hash(state);
        }
    }
}

macro_rules! impl_value_from {
    ($($variant:ident: $source:ty),* $(,)?) => {$(
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                Self::$variant(value.into())
            }
        }
    )*};
}

impl_value_from! {
    Bool: bool,
    Int: i8,
    Int: i16,
    Int: i32,
    Int: i64,
    Int: u8,
    Int: u16,
    Int: u32,
    Float: f32,
    Float: f64,
    BigInt: BigInt,
    BigDecimal: BigDecimal,
    String: &str,
    String: String,
    String: Rc<str>,
    DateTime: DateTime,
    Bytes: Bytes,
    List: List,
    Map: Map,
    Enum: EnumValue,
    Bean: Bean,
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Self::Int(value),
            Err(_) => Self::BigInt(value.into()),
        }
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::DateTime(DateTime::from_parts(Some(value), None))
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Self::DateTime(DateTime::from_parts(None, Some(value)))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values.into())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}
