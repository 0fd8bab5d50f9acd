//! Encodes [`Value`] trees into canonical bencode.
//!
//! Encoding is total: a well-formed [`Value`] always has exactly one
//! canonical encoding, so nothing here returns a `Result`. Dictionary keys
//! are emitted in ascending raw-byte order no matter how the caller built
//! the dictionary, which is what makes bencode usable as a canonical form
//! for hashing.
//!
//! # Encoding a value
//!
//! ```
//! use benc::{encoding::encode, Value};
//!
//! let value = Value::List(vec![Value::from("spam"), Value::Integer(42)]);
//! assert_eq!(encode(&value), b"l4:spami42ee");
//! ```
//!
//! Several values can be appended to one buffer through an [`Encoder`]:
//!
//! ```
//! use benc::{encoding::Encoder, Value};
//!
//! let mut encoder = Encoder::new();
//! encoder.emit(&Value::Integer(1));
//! encoder.emit(&Value::from("two"));
//! assert_eq!(encoder.into_bytes(), b"i1e3:two");
//! ```

mod encoder;

pub use self::encoder::Encoder;

use alloc::vec::Vec;

use crate::value::Value;

/// Encode a single value as canonical bencode.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.emit(value);
    encoder.into_bytes()
}
