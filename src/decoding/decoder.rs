use alloc::{borrow::Cow, collections::BTreeMap, format, vec::Vec};

use crate::{decoding::Error, value::Value};

/// The default recursion bound of a [`Decoder`].
///
/// Bencode itself places no limit on container nesting, so a bound is
/// imposed here to keep adversarial input from exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// A cursor-driven bencode decoder.
///
/// The decoder owns an offset into the source buffer and advances it while
/// building the [`Value`] tree by recursive descent. Byte strings in the
/// resulting tree borrow from the source buffer; nothing is copied. The
/// source is only ever read, so independent decoders may run concurrently
/// on independent buffers without coordination.
///
/// # Examples
///
/// ```
/// use benc::decoding::Decoder;
///
/// let decoder = Decoder::new(b"d3:foo3:bare").with_max_depth(2);
/// let (value, consumed) = decoder.decode()?;
/// assert_eq!(consumed, 12);
/// assert_eq!(value.get(b"foo").and_then(|v| v.as_bytes()), Some(&b"bar"[..]));
/// # Ok::<(), benc::decoding::Error>(())
/// ```
#[derive(Debug)]
pub struct Decoder<'se> {
    source: &'se [u8],
    offset: usize,
    max_depth: usize,
    strict_keys: bool,
}

impl<'se> Decoder<'se> {
    /// Create a new decoder reading from the given byte buffer.
    pub fn new(buffer: &'se [u8]) -> Self {
        Decoder {
            source: buffer,
            offset: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_keys: false,
        }
    }

    /// Set the maximum container nesting depth of the decoder.
    ///
    /// A decoder with `max_depth` zero accepts atoms only. Exceeding the
    /// bound is reported as [`Error::NestingTooDeep`].
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Require canonical dictionary key order.
    ///
    /// A strict decoder rejects dictionaries whose keys are not in strictly
    /// ascending raw-byte order, which also rules out duplicates. The
    /// default is to accept any key order and re-sort on encode.
    #[must_use]
    pub fn with_strict_keys(mut self) -> Self {
        self.strict_keys = true;
        self
    }

    /// Decode a single value from the front of the buffer.
    ///
    /// Returns the value and the number of bytes consumed. The decoder is
    /// consumed; a fresh one is needed per top-level parse.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error`] encountered. Errors inside nested
    /// containers propagate unchanged; no partial tree is returned.
    pub fn decode(mut self) -> Result<(Value<'se>, usize), Error> {
        let value = self.parse_value(0)?;
        Ok((value, self.offset))
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    /// Parse one value at the cursor. `depth` counts the containers the
    /// cursor is currently inside of.
    fn parse_value(&mut self, depth: usize) -> Result<Value<'se>, Error> {
        match self.peek() {
            None => Err(Error::ExpectedValue {
                offset: self.offset,
            }),
            Some(b'i') => self.parse_integer(),
            Some(b'l') => self.parse_list(depth),
            Some(b'd') => self.parse_dict(depth),
            // A leading '-' is handed to the string parser so that a
            // negative-looking length reports InvalidLength.
            Some(b'0'..=b'9' | b'-') => {
                let bytes = self.parse_byte_string()?;
                Ok(Value::Bytes(Cow::Borrowed(bytes)))
            },
            Some(other) => Err(Error::unexpected(
                "'i', 'l', 'd' or a digit",
                other,
                self.offset,
            )),
        }
    }

    fn parse_integer(&mut self) -> Result<Value<'se>, Error> {
        let start = self.offset;
        self.offset += 1; // 'i'

        let negative = if self.peek() == Some(b'-') {
            self.offset += 1;
            true
        } else {
            false
        };

        // Digits accumulate negated so that i64::MIN parses without
        // overflowing.
        let mut accumulator: i64 = 0;
        let digits_start = self.offset;
        loop {
            match self.peek() {
                None => {
                    return Err(Error::bad_value(
                        start,
                        "integer is missing its 'e' terminator",
                    ));
                },
                Some(b'e') => break,
                Some(digit @ b'0'..=b'9') => {
                    accumulator = accumulator
                        .checked_mul(10)
                        .and_then(|n| n.checked_sub(i64::from(digit - b'0')))
                        .ok_or_else(|| {
                            Error::bad_value(start, "integer does not fit in a signed 64-bit value")
                        })?;
                    self.offset += 1;
                },
                Some(other) => return Err(Error::unexpected("'e' or a digit", other, self.offset)),
            }
        }

        let digits = &self.source[digits_start..self.offset];
        if digits.is_empty() {
            return Err(Error::bad_value(start, "integer has no digits"));
        }
        if digits[0] == b'0' && digits.len() > 1 {
            return Err(Error::bad_value(start, "integer has leading zeros"));
        }
        if negative && accumulator == 0 {
            return Err(Error::bad_value(start, "negative zero is not canonical"));
        }
        self.offset += 1; // 'e'

        let integer = if negative {
            accumulator
        } else {
            accumulator.checked_neg().ok_or_else(|| {
                Error::bad_value(start, "integer does not fit in a signed 64-bit value")
            })?
        };

        Ok(Value::Integer(integer))
    }

    fn parse_byte_string(&mut self) -> Result<&'se [u8], Error> {
        let start = self.offset;

        if self.peek() == Some(b'-') {
            return Err(Error::bad_length(start, "length is negative"));
        }

        let mut length: usize = 0;
        let digits_start = self.offset;
        loop {
            match self.peek() {
                None => {
                    return Err(Error::bad_length(
                        start,
                        "end of input before the ':' separator",
                    ));
                },
                Some(b':') => break,
                Some(digit @ b'0'..=b'9') => {
                    length = length
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(usize::from(digit - b'0')))
                        .ok_or_else(|| Error::bad_length(start, "length overflows"))?;
                    self.offset += 1;
                },
                Some(other) => {
                    return Err(Error::bad_length(
                        self.offset,
                        format!("expected ':' or a digit, got {:?}", other as char),
                    ));
                },
            }
        }

        // The dispatchers only enter this parser on a digit, so at least
        // one digit precedes the ':'.
        if self.source[digits_start] == b'0' && self.offset - digits_start > 1 {
            return Err(Error::bad_length(start, "length has leading zeros"));
        }
        self.offset += 1; // ':'

        let remaining = self.source.len() - self.offset;
        if length > remaining {
            return Err(Error::bad_length(
                start,
                format!("length {length} exceeds the {remaining} bytes remaining"),
            ));
        }

        let bytes = &self.source[self.offset..self.offset + length];
        self.offset += length;
        Ok(bytes)
    }

    fn parse_list(&mut self, depth: usize) -> Result<Value<'se>, Error> {
        if depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let start = self.offset;
        self.offset += 1; // 'l'

        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::UnterminatedContainer { start }),
                Some(b'e') => {
                    self.offset += 1;
                    return Ok(Value::List(items));
                },
                Some(_) => items.push(self.parse_value(depth + 1)?),
            }
        }
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Value<'se>, Error> {
        if depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let start = self.offset;
        self.offset += 1; // 'd'

        let mut entries = BTreeMap::new();
        let mut previous_key: Option<&'se [u8]> = None;
        loop {
            match self.peek() {
                None => return Err(Error::UnterminatedContainer { start }),
                Some(b'e') => {
                    self.offset += 1;
                    return Ok(Value::Dict(entries));
                },
                Some(b'0'..=b'9' | b'-') => {},
                Some(b'i' | b'l' | b'd') => {
                    return Err(Error::InvalidKeyType {
                        offset: self.offset,
                    });
                },
                Some(other) => {
                    return Err(Error::unexpected(
                        "a byte string key or 'e'",
                        other,
                        self.offset,
                    ));
                },
            }

            let key_offset = self.offset;
            let key = self.parse_byte_string()?;
            if self.strict_keys {
                if previous_key.is_some_and(|previous| previous >= key) {
                    return Err(Error::UnsortedKeys { offset: key_offset });
                }
                previous_key = Some(key);
            }

            let value = self.parse_value(depth + 1)?;
            // Lenient mode keeps the last of any duplicate keys.
            entries.insert(Cow::Borrowed(key), value);
        }
    }
}

#[cfg(test)]
mod test {
    use alloc::{format, vec::Vec};
    use core::iter::repeat_n;

    use regex::Regex;

    use super::*;
    use crate::decoding::{decode, decode_all};

    fn decode_err(msg: &[u8], err_regex: &str) {
        match decode_all(msg) {
            Ok(value) => panic!("Unexpected parse success: {:?}", value),
            Err(err) => {
                let err = format!("{}", err);
                let err_regex = Regex::new(err_regex).expect("Test regexes should be valid");
                if !err_regex.is_match(&err) {
                    panic!("Unexpected error: {}", err);
                }
            },
        }
    }

    #[test]
    fn atoms_should_parse() {
        assert_eq!(decode_all(b"i0e").unwrap(), Value::Integer(0));
        assert_eq!(decode_all(b"i-1e").unwrap(), Value::Integer(-1));
        assert_eq!(decode_all(b"i42e").unwrap(), Value::Integer(42));
        assert_eq!(decode_all(b"4:spam").unwrap(), Value::from("spam"));
        assert_eq!(decode_all(b"0:").unwrap(), Value::from(""));
    }

    #[test]
    fn consumed_length_is_reported() {
        let (value, consumed) = decode(b"4:spamXYZ").unwrap();
        assert_eq!(value, Value::from("spam"));
        assert_eq!(consumed, 6);

        let (value, consumed) = decode(b"i42e...").unwrap();
        assert_eq!(value, Value::Integer(42));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn trailing_data_is_rejected_by_decode_all() {
        assert!(matches!(
            decode_all(b"4:spamXYZ"),
            Err(Error::TrailingData { offset: 6 })
        ));
        decode_err(b"i42e...", "trailing data");
    }

    #[test]
    fn empty_input_should_fail() {
        assert!(matches!(
            decode_all(b""),
            Err(Error::ExpectedValue { offset: 0 })
        ));
    }

    #[test]
    fn unknown_type_tags_should_fail() {
        decode_err(b"x", "expected 'i', 'l', 'd' or a digit");
        decode_err(b"e", "got 'e'");
    }

    #[test]
    fn non_canonical_integers_should_fail() {
        decode_err(b"ie", "no digits");
        decode_err(b"i-e", "no digits");
        decode_err(b"i-0e", "negative zero");
        decode_err(b"i03e", "leading zeros");
        decode_err(b"i-03e", "leading zeros");
        decode_err(b"i42", "missing its 'e' terminator");
        decode_err(b"i4x2e", "got 'x'");
    }

    #[test]
    fn integer_overflow_should_fail_without_wrapping() {
        decode_err(b"i99999999999999999999e", "does not fit");
        decode_err(b"i9223372036854775808e", "does not fit");
        decode_err(b"i-9223372036854775809e", "does not fit");
    }

    #[test]
    fn extreme_integers_should_parse() {
        assert_eq!(
            decode_all(b"i9223372036854775807e").unwrap(),
            Value::Integer(i64::MAX)
        );
        assert_eq!(
            decode_all(b"i-9223372036854775808e").unwrap(),
            Value::Integer(i64::MIN)
        );
    }

    #[test]
    fn string_lengths_are_checked_against_the_buffer() {
        assert!(matches!(
            decode_all(b"4:sp"),
            Err(Error::InvalidLength { offset: 0, .. })
        ));
        decode_err(b"4:sp", "exceeds the 2 bytes remaining");
    }

    #[test]
    fn bad_string_lengths_should_fail() {
        decode_err(b"-1:x", "length is negative");
        decode_err(b"03:foo", "leading zeros");
        decode_err(b"5", "end of input before the ':' separator");
        decode_err(b"5x:foo", "expected ':' or a digit");
        decode_err(b"99999999999999999999999999:x", "length overflows");
    }

    #[test]
    fn lists_should_nest() {
        let value = decode_all(b"l4:spaml3:eggi3eee").unwrap();
        let list = value.as_list().unwrap();
        assert_eq!(list[0], Value::from("spam"));

        let inner = list[1].as_list().unwrap();
        assert_eq!(inner[0], Value::from("egg"));
        assert_eq!(inner[1], Value::Integer(3));
    }

    #[test]
    fn unterminated_containers_should_fail() {
        assert!(matches!(
            decode_all(b"l4:spam"),
            Err(Error::UnterminatedContainer { start: 0 })
        ));
        decode_err(b"l", "end of input before its 'e' terminator");
        decode_err(b"d", "end of input before its 'e' terminator");
        decode_err(b"d3", "end of input before the ':' separator");
        decode_err(b"d3:fo", "exceeds the 2 bytes remaining");
        assert!(matches!(
            decode_all(b"d3:foo"),
            Err(Error::ExpectedValue { offset: 6 })
        ));
        decode_err(b"li42e", "end of input before its 'e' terminator");
    }

    #[test]
    fn dictionaries_should_parse() {
        let value = decode_all(b"d3:cow3:moo4:spam4:eggse").unwrap();
        assert_eq!(value.get(b"cow"), Some(&Value::from("moo")));
        assert_eq!(value.get(b"spam"), Some(&Value::from("eggs")));
    }

    #[test]
    fn map_keys_must_be_strings() {
        assert!(matches!(
            decode_all(b"di1e3:xxxe"),
            Err(Error::InvalidKeyType { offset: 1 })
        ));
        decode_err(b"dl4:spame3:xxxe", "is not a byte string");
        decode_err(b"dd3:foo3:baree", "is not a byte string");
    }

    #[test]
    fn map_keys_must_have_values() {
        decode_err(b"d3:fooe", "got 'e'");
    }

    #[test]
    fn unsorted_keys_are_accepted_by_default() {
        let value = decode_all(b"d4:spam4:eggs3:cow3:mooe").unwrap();
        assert_eq!(value.get(b"cow"), Some(&Value::from("moo")));
        assert_eq!(value.get(b"spam"), Some(&Value::from("eggs")));
    }

    #[test]
    fn duplicate_keys_resolve_to_the_last_occurrence() {
        let value = decode_all(b"d1:ai1e1:ai2ee").unwrap();
        assert_eq!(value.get(b"a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn strict_decoders_require_ascending_keys() {
        let unsorted = b"d4:spam4:eggs3:cow3:mooe";
        assert!(
            Decoder::new(unsorted)
                .with_strict_keys()
                .decode()
                .is_err_and(|err| matches!(err, Error::UnsortedKeys { offset: 13 }))
        );

        let duplicated = b"d1:ai1e1:ai2ee";
        assert!(matches!(
            Decoder::new(duplicated).with_strict_keys().decode(),
            Err(Error::UnsortedKeys { .. })
        ));

        let sorted = b"d3:cow3:moo4:spam4:eggse";
        assert!(Decoder::new(sorted).with_strict_keys().decode().is_ok());
    }

    #[test]
    fn recursion_should_be_limited() {
        let mut msg = Vec::new();
        msg.extend(repeat_n(b'l', 4096));
        msg.extend(repeat_n(b'e', 4096));
        assert!(matches!(
            decode_all(&msg),
            Err(Error::NestingTooDeep { limit: DEFAULT_MAX_DEPTH })
        ));
        decode_err(&msg, "nesting depth");
    }

    #[test]
    fn recursion_bounds_should_be_tight() {
        let test_msg = b"lllleeee";
        assert!(Decoder::new(test_msg).with_max_depth(4).decode().is_ok());
        assert!(matches!(
            Decoder::new(test_msg).with_max_depth(3).decode(),
            Err(Error::NestingTooDeep { limit: 3 })
        ));
    }

    #[test]
    fn errors_inside_containers_propagate_unchanged() {
        assert!(matches!(
            decode_all(b"ld3:fooi03eee"),
            Err(Error::InvalidValue { offset: 7, .. })
        ));
        assert!(matches!(
            decode_all(b"l4:spami-0ee"),
            Err(Error::InvalidValue { .. })
        ));
    }
}
