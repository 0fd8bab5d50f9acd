//! Decodes bencode from an untrusted byte buffer into a [`Value`] tree.
//!
//! The decoder walks the buffer left to right with an explicit cursor and
//! builds the value tree by recursive descent. It never reads past the end
//! of the buffer, never wraps an integer or length silently, and bounds its
//! own recursion depth, so adversarial input can only produce an [`Error`].
//!
//! # Decoding a buffer
//!
//! [`decode_all`] parses a buffer that holds exactly one value:
//!
//! ```
//! use benc::decoding::decode_all;
//!
//! let value = decode_all(b"l4:spam4:eggse")?;
//! let list = value.as_list().unwrap();
//! assert_eq!(list[0].as_bytes(), Some(&b"spam"[..]));
//! assert_eq!(list[1].as_bytes(), Some(&b"eggs"[..]));
//! # Ok::<(), benc::decoding::Error>(())
//! ```
//!
//! [`decode`] instead parses a single value from the front of the buffer
//! and reports how many bytes it consumed, which allows bencode to be
//! embedded in a larger stream:
//!
//! ```
//! use benc::decoding::decode;
//!
//! let stream = b"i42e\x00\x01\x02";
//! let (value, consumed) = decode(stream)?;
//! assert_eq!(value.as_integer(), Some(42));
//! let payload = &stream[consumed..];
//! assert_eq!(payload, b"\x00\x01\x02");
//! # Ok::<(), benc::decoding::Error>(())
//! ```
//!
//! # Decoding policy
//!
//! By default the decoder is lenient about dictionary key order: unsorted
//! and duplicate keys are accepted (the last duplicate wins), matching how
//! most real-world decoders behave. The encoder always re-emits keys in
//! canonical order. [`Decoder::with_strict_keys`] opts in to rejecting
//! non-canonical key order during decoding instead.

mod decoder;
mod error;

pub use self::{
    decoder::{DEFAULT_MAX_DEPTH, Decoder},
    error::Error,
};

use crate::value::Value;

/// Decode a single value from the front of `bytes`.
///
/// Returns the decoded value and the number of bytes consumed. Bytes past
/// the first value are not inspected; use [`decode_all`] to require that
/// the buffer holds exactly one value.
///
/// # Errors
///
/// Returns an [`Error`] describing the first malformation encountered. No
/// partial value is ever returned.
pub fn decode(bytes: &[u8]) -> Result<(Value<'_>, usize), Error> {
    Decoder::new(bytes).decode()
}

/// Decode `bytes` as exactly one value with nothing following it.
///
/// # Errors
///
/// In addition to the [`decode`] errors, returns [`Error::TrailingData`]
/// if the buffer continues past the first value.
pub fn decode_all(bytes: &[u8]) -> Result<Value<'_>, Error> {
    let (value, consumed) = Decoder::new(bytes).decode()?;

    if consumed != bytes.len() {
        return Err(Error::TrailingData { offset: consumed });
    }

    Ok(value)
}
