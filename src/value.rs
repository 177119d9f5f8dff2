//! The canonical value model.
//!
//! Every parser in this crate produces a [`Value`] and every serializer consumes one.
//! The variants are deliberately few:
//!
//! - `Null`, `Bool`, `Number` (always `f64`), `String`
//! - `List`: an ordered sequence of values
//! - `Record`: an ordered, key-unique map (see [`Record`])
//!
//! `String` is the fallback whenever a type cannot be positively inferred, so a CSV cell
//! is always a `String` and an SQL literal is only a `Number` if it is entirely numeric.
//!
//! ## Creating Values
//!
//! ```rust
//! use datacast::{value, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let row = value!({
//!     "name": "Alice",
//!     "age": 30
//! });
//! assert!(row.is_record());
//! ```
//!
//! ## Interop with serde
//!
//! `Value` implements `Serialize` and `Deserialize` by hand, so any self-describing serde
//! format can produce or consume it directly:
//!
//! ```rust
//! use datacast::Value;
//!
//! let value: Value = serde_json::from_str(r#"{"id": 1, "tags": ["a", "b"]}"#).unwrap();
//! assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"id":1,"tags":["a","b"]}"#);
//! ```

use crate::Record;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Integral numbers below this magnitude are rendered and serialized as integers.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A dynamically-typed value of any supported format.
///
/// # Examples
///
/// ```rust
/// use datacast::Value;
///
/// let value = Value::from(3.5);
/// assert!(value.is_number());
/// assert_eq!(value.as_f64(), Some(3.5));
/// assert_eq!(value.to_text(), "3.5");
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Record(Record),
}

/// Renders a number as shortest decimal text, without a fractional part when integral.
///
/// # Examples
///
/// ```rust
/// use datacast::value::format_number;
///
/// assert_eq!(format_number(30.0), "30");
/// assert_eq!(format_number(-0.25), "-0.25");
/// assert_eq!(format_number(f64::INFINITY), "Infinity");
/// ```
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Returns `true` for `Null`, `Bool`, `Number` and `String`.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Record(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a whole number that fits in `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::Value;
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::from(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => Some(*n as i64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Views the value as a sequence of rows, wrapping anything but a `List` as a
    /// single-element slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::Value;
    ///
    /// assert_eq!(Value::from("x").rows().len(), 1);
    /// assert_eq!(Value::List(vec![]).rows().len(), 0);
    /// ```
    #[must_use]
    pub fn rows(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Views the value as tabular records: each row that is not a `Record` becomes a
    /// one-column record keyed `value`.
    pub(crate) fn records(&self) -> Vec<Cow<'_, Record>> {
        self.rows()
            .iter()
            .map(|row| match row {
                Value::Record(record) => Cow::Borrowed(record),
                other => Cow::Owned(std::iter::once(("value".to_string(), other.clone())).collect()),
            })
            .collect()
    }

    /// Returns the text form of the value as used by tabular and XML output.
    ///
    /// `Null` renders as an empty string, numbers without a trailing `.0`, and nested
    /// lists/records as compact JSON.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::{value, Value};
    ///
    /// assert_eq!(Value::Null.to_text(), "");
    /// assert_eq!(Value::from(true).to_text(), "true");
    /// assert_eq!(Value::from(25).to_text(), "25");
    /// assert_eq!(value!([1, "a"]).to_text(), r#"[1,"a"]"#);
    /// ```
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Number(n) => Cow::Owned(format_number(*n)),
            Value::String(s) => Cow::Borrowed(s),
            Value::List(_) | Value::Record(_) => {
                Cow::Owned(serde_json::to_string(self).unwrap_or_default())
            }
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for element in items {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Record(record) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (k, v) in record.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, VariantAccess, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any structured data value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    items.push(elem);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut record = Record::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    let key = match key {
                        Value::String(s) => s,
                        other => other.to_text().into_owned(),
                    };
                    record.insert(key, value);
                }
                Ok(Value::Record(record))
            }

            // Tagged YAML nodes (`!tag value`) arrive as enums; the tag is dropped.
            fn visit_enum<A>(self, data: A) -> Result<Self::Value, A::Error>
            where
                A: de::EnumAccess<'de>,
            {
                let (_tag, variant) = data.variant::<String>()?;
                variant.newtype_variant()
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(crate::Error::custom(format!(
                "expected number, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(crate::Error::custom(format!(
                "expected bool, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::custom(format!(
                "expected string, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
