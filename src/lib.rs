//! Decodes and encodes bencode values.
//!
//! Bencode is the self-describing, length-prefixed serialization format used
//! by BitTorrent metadata and peer-protocol messages. It has exactly four
//! data types: byte strings, signed 64-bit integers, lists, and dictionaries
//! with byte-string keys.
//!
//! The decoder treats its input as untrusted: every length and integer is
//! validated against overflow and buffer bounds, recursion depth is
//! explicitly limited, and malformed input is reported through
//! [`decoding::Error`] rather than ever reading past the buffer. The encoder
//! only produces canonical bencode, with dictionary keys emitted in
//! ascending raw-byte order.
//!
//! # Examples
//!
//! Decoding a complete buffer into a [`Value`] tree and re-encoding it:
//!
//! ```
//! use benc::{decode_all, encode, Value};
//!
//! let value = decode_all(b"d3:cow3:moo4:spam4:eggse")?;
//! assert_eq!(value.get(b"cow").and_then(Value::as_bytes), Some(&b"moo"[..]));
//! assert_eq!(encode(&value), b"d3:cow3:moo4:spam4:eggse");
//! # Ok::<(), benc::decoding::Error>(())
//! ```
//!
//! Bencode is often embedded in a larger stream, e.g. peer-protocol messages
//! with a trailing payload. [`decode`] parses one value from the front of
//! the buffer and reports how many bytes it consumed:
//!
//! ```
//! use benc::{decode, Value};
//!
//! let (value, consumed) = decode(b"4:spam... trailing payload ...")?;
//! assert_eq!(value.as_bytes(), Some(&b"spam"[..]));
//! assert_eq!(consumed, 6);
//! # Ok::<(), benc::decoding::Error>(())
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), warn(missing_docs))]

extern crate alloc;

pub mod decoding;
pub mod encoding;
pub mod value;

pub use crate::{
    decoding::{Decoder, decode, decode_all},
    encoding::{Encoder, encode},
    value::Value,
};
