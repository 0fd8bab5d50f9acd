use alloc::{string::ToString, vec::Vec};

use crate::value::Value;

/// Serializes [`Value`] trees into a growing byte buffer.
///
/// Unlike the decoder, the encoder is not zero-copy; byte strings are
/// copied into the output buffer. It is given well-formed values built by
/// the caller rather than untrusted input, so emission cannot fail.
#[derive(Default, Debug)]
pub struct Encoder {
    output: Vec<u8>,
}

impl Encoder {
    /// Create a new encoder with an empty output buffer.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Append the canonical encoding of `value` to the output buffer.
    pub fn emit(&mut self, value: &Value) {
        match value {
            Value::Bytes(bytes) => self.emit_byte_string(bytes),
            Value::Dict(dict) => {
                self.output.push(b'd');
                // The map already keeps keys in ascending raw-byte order.
                for (key, value) in dict {
                    self.emit_byte_string(key);
                    self.emit(value);
                }
                self.output.push(b'e');
            },
            Value::Integer(integer) => {
                self.output.push(b'i');
                self.output.extend_from_slice(integer.to_string().as_bytes());
                self.output.push(b'e');
            },
            Value::List(list) => {
                self.output.push(b'l');
                for value in list {
                    self.emit(value);
                }
                self.output.push(b'e');
            },
        }
    }

    /// Finish encoding and return the output buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }

    fn emit_byte_string(&mut self, bytes: &[u8]) {
        // Writing to a vec can't fail
        self.output
            .extend_from_slice(bytes.len().to_string().as_bytes());
        self.output.push(b':');
        self.output.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod test {
    use alloc::{borrow::Cow, collections::BTreeMap, vec};

    use super::*;
    use crate::encoding::encode;

    #[test]
    fn integers_encode_without_padding() {
        assert_eq!(encode(&Value::Integer(0)), b"i0e");
        assert_eq!(encode(&Value::Integer(42)), b"i42e");
        assert_eq!(encode(&Value::Integer(-42)), b"i-42e");
        assert_eq!(encode(&Value::Integer(i64::MAX)), b"i9223372036854775807e");
        assert_eq!(encode(&Value::Integer(i64::MIN)), b"i-9223372036854775808e");
    }

    #[test]
    fn byte_strings_are_length_prefixed_verbatim() {
        assert_eq!(encode(&Value::from("spam")), b"4:spam");
        assert_eq!(encode(&Value::from("")), b"0:");
        assert_eq!(
            encode(&Value::Bytes(Cow::Borrowed(&[0x00, 0xFF]))),
            b"2:\x00\xFF"
        );
    }

    #[test]
    fn lists_preserve_element_order() {
        assert_eq!(encode(&Value::List(vec![])), b"le");

        let list = Value::List(vec![Value::from("spam"), Value::Integer(42)]);
        assert_eq!(encode(&list), b"l4:spami42ee");
    }

    #[test]
    fn dict_keys_are_emitted_in_ascending_byte_order() {
        let mut dict = BTreeMap::new();
        dict.insert(Cow::Borrowed(&b"zebra"[..]), Value::Integer(3));
        dict.insert(Cow::Borrowed(&b"apple"[..]), Value::Integer(1));
        dict.insert(Cow::Borrowed(&b"mango"[..]), Value::Integer(2));

        assert_eq!(
            encode(&Value::Dict(dict)),
            b"d5:applei1e5:mangoi2e5:zebrai3ee"
        );
    }

    #[test]
    fn nested_structures_encode_recursively() {
        let mut inner = BTreeMap::new();
        inner.insert(Cow::Borrowed(&b"list"[..]), {
            Value::List(vec![Value::from("spam"), Value::Integer(42)])
        });

        assert_eq!(encode(&Value::Dict(inner)), b"d4:listl4:spami42eee");
    }

    #[test]
    fn emitting_several_values_appends_them() {
        let mut encoder = Encoder::new();
        encoder.emit(&Value::Integer(1));
        encoder.emit(&Value::from("two"));
        encoder.emit(&Value::List(vec![]));

        assert_eq!(encoder.into_bytes(), b"i1e3:twole");
    }
}
