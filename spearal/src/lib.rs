//! # Spearal
//!
//! A compact, self-describing binary encoding for object graphs. Values
//! carry their own type tags, repeated strings are written once and
//! referenced afterwards, and shared or cyclic objects keep their
//! identity across the wire.
//!
//! The wire kinds are:
//!
//! - `null`, `true`, `false`: a bare tag byte
//! - `integral`: a sign flag plus a 1–8 byte big-endian magnitude
//! - `floating`: collapses to `integral` when the value is an exact small
//!   integer, a thousandths-scaled magnitude when that reconstructs the
//!   value, and the raw IEEE-754 bit pattern otherwise
//! - `big integral` / `big floating`: digit strings with long zero runs
//!   compressed, packed two characters per byte
//! - `string`: length-prefixed UTF-8, shared by value
//! - `byte array`, `collection`, `map`, `bean`: shared by identity
//! - `date-time`: independently optional date and time parts
//! - `enum`, `class`: a class name plus (for enums) a variant string
//!
//! [`Value`] is the in-memory shape of any wire value. [`Encoder`] and
//! [`Decoder`] own the reference tables, so one instance spans one
//! message; the free functions cover the one-shot cases. Beans check
//! against a [`model::ClassModel`] for declared property order, schema
//! drift, and partial instances.

mod bignum;
mod cache;
pub mod convert;
pub mod datetime;
pub mod dec;
pub mod enc;
pub mod model;
mod tag;
pub mod value;
mod varint;

pub use dec::{Decoder, from_reader, from_slice};
pub use enc::{Encoder, to_vec, to_writer};
pub use value::Value;
