use alloc::{format, string::String};

use thiserror::Error;

/// An enumeration of the failures that can arise while decoding bencode.
///
/// Every variant carries the byte offset at which the problem was detected,
/// counted from the start of the buffer handed to the decoder.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Reached the end of the input at a position where a value was
    /// required.
    #[error("expected a value at offset {offset}, found end of input")]
    ExpectedValue {
        /// Offset at which the value was expected.
        offset: usize,
    },

    /// The lookahead byte matches no bencode type tag, or a value broke a
    /// canonical-form rule (leading zeros, `-0`, a malformed terminator,
    /// or an integer outside the signed 64-bit range).
    #[error("invalid value at offset {offset}: {reason}")]
    InvalidValue {
        /// Offset of the offending byte or value.
        offset: usize,
        /// What rule the input broke.
        reason: String,
    },

    /// A byte string declared a length that is negative, has leading
    /// zeros, overflows, is missing its `:` separator, or exceeds the
    /// remaining input.
    #[error("invalid string length at offset {offset}: {reason}")]
    InvalidLength {
        /// Offset of the length field.
        offset: usize,
        /// What was wrong with the declared length.
        reason: String,
    },

    /// A dictionary held something other than a byte string at a key
    /// position.
    #[error("dictionary key at offset {offset} is not a byte string")]
    InvalidKeyType {
        /// Offset of the non-string key.
        offset: usize,
    },

    /// A list or dictionary reached the end of the input before its
    /// closing `e`.
    #[error("container opened at offset {start} reached end of input before its 'e' terminator")]
    UnterminatedContainer {
        /// Offset of the container's opening `l` or `d`.
        start: usize,
    },

    /// Dictionary keys were not in strictly ascending raw-byte order.
    /// Only reported by decoders configured with
    /// [`Decoder::with_strict_keys`](crate::decoding::Decoder::with_strict_keys).
    #[error("dictionary key at offset {offset} is not in strictly ascending order")]
    UnsortedKeys {
        /// Offset of the out-of-order or duplicate key.
        offset: usize,
    },

    /// The input nested containers deeper than the configured limit.
    #[error("maximum nesting depth ({limit}) exceeded")]
    NestingTooDeep {
        /// The configured depth limit.
        limit: usize,
    },

    /// The input continued past the first value. Only reported by
    /// [`decode_all`](crate::decoding::decode_all).
    #[error("trailing data after value at offset {offset}")]
    TrailingData {
        /// Offset of the first unconsumed byte.
        offset: usize,
    },
}

impl Error {
    pub(crate) fn unexpected(expected: &str, got: u8, offset: usize) -> Self {
        Error::InvalidValue {
            offset,
            reason: format!("expected {}, got {:?}", expected, got as char),
        }
    }

    pub(crate) fn bad_length(offset: usize, reason: impl Into<String>) -> Self {
        Error::InvalidLength {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_value(offset: usize, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            offset,
            reason: reason.into(),
        }
    }
}

#[test]
fn decoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}
