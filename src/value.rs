//! `Value`s hold arbitrary borrowed or owned bencode data as a tree.
//!
//! A `Value` produced by the decoder borrows its byte strings from the input
//! buffer. Use [`Value::into_owned`] to detach a tree from the buffer it was
//! parsed from. If the `serde` feature is enabled, `Value` also implements
//! `Serialize` and `Deserialize`.

use alloc::{borrow::Cow, collections::BTreeMap, vec::Vec};
use core::fmt::{self, Display, Formatter, Write};

use thiserror::Error;

/// The variant tag of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A byte string.
    Bytes,
    /// A dictionary.
    Dict,
    /// An integer.
    Integer,
    /// A list.
    List,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Kind::Bytes => "byte string",
            Kind::Dict => "dictionary",
            Kind::Integer => "integer",
            Kind::List => "list",
        })
    }
}

/// Returned when a typed accessor is invoked on a [`Value`] of a different
/// variant.
///
/// This is a contract violation on the caller's side, not a parse error, so
/// it is kept apart from [`crate::decoding::Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// The variant the accessor asked for.
    pub expected: Kind,
    /// The variant the value actually holds.
    pub found: Kind,
}

/// An owned or borrowed bencode value.
///
/// Byte strings are raw bytes with an explicit length. They are not
/// necessarily UTF-8 and are never interpreted as text. Dictionaries keep
/// their keys in ascending raw-byte order, which makes re-encoding canonical
/// by construction.
///
/// # Examples
///
/// ```
/// use benc::Value;
///
/// let value = Value::from(42);
/// assert_eq!(value.as_integer(), Some(42));
/// assert_eq!(value.as_bytes(), None);
///
/// let value = Value::from("spam");
/// assert_eq!(value.as_bytes(), Some(&b"spam"[..]));
/// ```
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value<'a> {
    /// An owned or borrowed byte string.
    Bytes(Cow<'a, [u8]>),
    /// A dictionary mapping byte strings to values, ordered by raw key bytes.
    Dict(BTreeMap<Cow<'a, [u8]>, Value<'a>>),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An ordered list of values. Element order is significant.
    List(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    /// Report the variant tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bytes(_) => Kind::Bytes,
            Value::Dict(_) => Kind::Dict,
            Value::Integer(_) => Kind::Integer,
            Value::List(_) => Kind::List,
        }
    }

    /// Return the integer payload, if this value is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(integer) => Some(*integer),
            _ => None,
        }
    }

    /// Return the raw bytes, if this value is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Return the elements, if this value is a list.
    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Return the entries, if this value is a dictionary.
    pub fn as_dict(&self) -> Option<&BTreeMap<Cow<'a, [u8]>, Value<'a>>> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Consume the value and return the integer payload.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeMismatch`] if the value is not an integer.
    pub fn try_into_integer(self) -> Result<i64, TypeMismatch> {
        match self {
            Value::Integer(integer) => Ok(integer),
            other => Err(other.mismatch(Kind::Integer)),
        }
    }

    /// Consume the value and return the byte string payload.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeMismatch`] if the value is not a byte string.
    pub fn try_into_bytes(self) -> Result<Cow<'a, [u8]>, TypeMismatch> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(other.mismatch(Kind::Bytes)),
        }
    }

    /// Consume the value and return the list elements.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeMismatch`] if the value is not a list.
    pub fn try_into_list(self) -> Result<Vec<Value<'a>>, TypeMismatch> {
        match self {
            Value::List(list) => Ok(list),
            other => Err(other.mismatch(Kind::List)),
        }
    }

    /// Consume the value and return the dictionary entries.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeMismatch`] if the value is not a dictionary.
    pub fn try_into_dict(self) -> Result<BTreeMap<Cow<'a, [u8]>, Value<'a>>, TypeMismatch> {
        match self {
            Value::Dict(dict) => Ok(dict),
            other => Err(other.mismatch(Kind::Dict)),
        }
    }

    /// Look up `key` in this value, if it is a dictionary.
    ///
    /// Returns `None` if the value is not a dictionary or the key is absent.
    pub fn get(&self, key: &[u8]) -> Option<&Value<'a>> {
        self.as_dict()?.get(key)
    }

    /// Convert this value into an owned value with static lifetime.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Bytes(bytes) => Value::Bytes(Cow::Owned(bytes.into_owned())),
            Value::Dict(dict) => Value::Dict(
                dict.into_iter()
                    .map(|(key, value)| (Cow::Owned(key.into_owned()), value.into_owned()))
                    .collect(),
            ),
            Value::Integer(integer) => Value::Integer(integer),
            Value::List(list) => Value::List(list.into_iter().map(Value::into_owned).collect()),
        }
    }

    /// Encode this value as canonical bencode.
    ///
    /// Shorthand for [`crate::encoding::encode`].
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::encoding::encode(self)
    }

    fn mismatch(&self, expected: Kind) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(integer: i64) -> Self {
        Value::Integer(integer)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(bytes))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(bytes))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(string: &'a str) -> Self {
        Value::Bytes(Cow::Borrowed(string.as_bytes()))
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(list: Vec<Value<'a>>) -> Self {
        Value::List(list)
    }
}

impl<'a> From<BTreeMap<Cow<'a, [u8]>, Value<'a>>> for Value<'a> {
    fn from(dict: BTreeMap<Cow<'a, [u8]>, Value<'a>>) -> Self {
        Value::Dict(dict)
    }
}

impl Display for Value<'_> {
    /// Renders the canonical bencode form, hex-escaping byte strings that
    /// contain non-printable bytes.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Bytes(bytes) => fmt_byte_string(bytes, f),
            Value::Dict(dict) => {
                f.write_char('d')?;
                for (key, value) in dict {
                    fmt_byte_string(key, f)?;
                    Display::fmt(value, f)?;
                }
                f.write_char('e')
            },
            Value::Integer(integer) => write!(f, "i{integer}e"),
            Value::List(list) => {
                f.write_char('l')?;
                for value in list {
                    Display::fmt(value, f)?;
                }
                f.write_char('e')
            },
        }
    }
}

fn fmt_byte_string(bytes: &[u8], f: &mut Formatter) -> fmt::Result {
    write!(f, "{}:", bytes.len())?;
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        for &b in bytes {
            f.write_char(b as char)?;
        }
    } else {
        for b in bytes {
            write!(f, "\\x{b:02X}")?;
        }
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;

    use alloc::string::String;
    use core::marker::PhantomData;

    use serde_ as serde;

    use serde::{
        Serialize,
        ser::{SerializeMap, SerializeSeq},
    };
    use serde_bytes::Bytes;

    impl Serialize for Value<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            match self {
                Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
                Value::Integer(integer) => serializer.serialize_i64(*integer),
                Value::List(list) => {
                    let mut seq = serializer.serialize_seq(Some(list.len()))?;
                    for value in list {
                        seq.serialize_element(value)?;
                    }
                    seq.end()
                },
                Value::Dict(dict) => {
                    let mut map = serializer.serialize_map(Some(dict.len()))?;
                    for (key, value) in dict {
                        map.serialize_entry(Bytes::new(key), value)?;
                    }
                    map.end()
                },
            }
        }
    }

    impl<'de: 'a, 'a> serde::de::Deserialize<'de> for Value<'a> {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Value<'a>, D::Error>
        where
            D: serde::de::Deserializer<'de>,
        {
            deserializer.deserialize_any(ValueVisitor(PhantomData))
        }
    }

    struct ValueVisitor<'a>(PhantomData<&'a ()>);

    impl<'de: 'a, 'a> serde::de::Visitor<'de> for ValueVisitor<'a> {
        type Value = Value<'a>;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            formatter.write_str("any valid bencode value")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Value<'a>, E> {
            Ok(Value::Integer(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Value<'a>, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value)
                .map(Value::Integer)
                .map_err(|_| E::custom("integer does not fit in 64 signed bits"))
        }

        fn visit_borrowed_bytes<E>(self, value: &'de [u8]) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Borrowed(value)))
        }

        fn visit_bytes<E>(self, value: &[u8]) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Owned(value.to_vec())))
        }

        fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Owned(value)))
        }

        fn visit_borrowed_str<E>(self, value: &'de str) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Borrowed(value.as_bytes())))
        }

        fn visit_str<E>(self, value: &str) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Owned(value.as_bytes().to_vec())))
        }

        fn visit_string<E>(self, value: String) -> Result<Value<'a>, E> {
            Ok(Value::Bytes(Cow::Owned(value.into_bytes())))
        }

        fn visit_seq<V>(self, mut access: V) -> Result<Value<'a>, V::Error>
        where
            V: serde::de::SeqAccess<'de>,
        {
            let mut list = Vec::new();
            while let Some(element) = access.next_element()? {
                list.push(element);
            }
            Ok(Value::List(list))
        }

        fn visit_map<V>(self, mut access: V) -> Result<Value<'a>, V::Error>
        where
            V: serde::de::MapAccess<'de>,
        {
            let mut dict = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<&Bytes, _>()? {
                dict.insert(Cow::Borrowed(key.as_ref()), value);
            }
            Ok(Value::Dict(dict))
        }
    }
}
