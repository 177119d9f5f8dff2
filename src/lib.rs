//! # datacast
//!
//! Converts structured data between CSV, TSV, JSON, XML, YAML and SQL insert dumps.
//!
//! Every input is parsed into one canonical [`Value`] model and every output is
//! serialized from it, so any source format can reach any target format without
//! pairwise converters.
//!
//! ## Key Features
//!
//! - **Format Detection**: by file extension, then declared MIME type, then content
//! - **Forgiving Tabular Parsing**: malformed CSV rows and mismatched SQL tuples become
//!   [`Warning`]s instead of failing the whole document
//! - **Order Preserving**: record keys and list elements keep their input order
//! - **Pluggable Codecs**: YAML bundled via `serde_yaml`, spreadsheets supplied by the caller
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use datacast::transcode;
//!
//! let csv = "name,age\n\"Jane, A.\",30\nBob,25";
//! let out = transcode(csv, "people.csv", "json-min").unwrap();
//!
//! assert_eq!(
//!     out.content.as_text(),
//!     Some(r#"[{"name":"Jane, A.","age":"30"},{"name":"Bob","age":"25"}]"#)
//! );
//! assert_eq!(out.filename, "people.json");
//! assert_eq!(out.mime, "application/json");
//! assert!(out.warnings.is_empty());
//! ```
//!
//! ### Configured Conversions
//!
//! ```rust
//! use datacast::{AttributeMode, TranscodeOptions, Transcoder};
//!
//! let transcoder = Transcoder::with_options(
//!     TranscodeOptions::new()
//!         .with_table_name("users")
//!         .with_xml_attributes(AttributeMode::Emit),
//! );
//!
//! let out = transcoder
//!     .transcode(r#"[{"id":1,"name":"O'Brien"}]"#, "export.json", "to-sql")
//!     .unwrap();
//! assert_eq!(
//!     out.content.as_text(),
//!     Some("INSERT INTO users (id, name) VALUES\n(1, 'O''Brien');")
//! );
//! ```
//!
//! ### Dynamic Values with the value! Macro
//!
//! ```rust
//! use datacast::{value, Value};
//!
//! let data = value!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["rust", "csv"]
//! });
//!
//! if let Value::Record(record) = &data {
//!     assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Lossy Conversions
//!
//! - CSV and TSV cells are always strings; types do not survive a CSV round trip.
//! - XML attributes are dropped on output unless [`AttributeMode::Emit`] is set.
//! - Numbers are `f64`; integers beyond 2^53 lose precision.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade: `debug` for format decisions, `warn` for
//! each recoverable [`Warning`]. No logger is installed.

pub mod codec;
pub mod delimited;
pub mod error;
pub mod format;
pub mod json;
pub mod macros;
pub mod map;
pub mod options;
pub mod sniff;
pub mod sql;
pub mod transcode;
pub mod value;
pub mod xml;

pub use codec::{Codecs, SerdeYaml, SpreadsheetCodec, YamlCodec};
pub use error::{Error, Parsed, Result, Warning, WarningKind};
pub use format::{Format, Target};
pub use json::JsonStyle;
pub use map::Record;
pub use options::{AttributeMode, Delimiter, TranscodeOptions, DEFAULT_MAX_XML_DEPTH};
pub use transcode::{transcode, Content, Transcoded, Transcoder};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert any `T: Serialize` into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use datacast::{to_value, value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value, value!({"x": 1, "y": 2}));
/// ```
///
/// # Errors
///
/// Returns an error if `T`'s `Serialize` implementation fails, e.g. for a map with
/// non-string keys.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    let json = serde_json::to_value(value).map_err(Error::custom)?;
    serde::Deserialize::deserialize(json).map_err(Error::custom)
}

/// Deserialize an instance of type `T` from a [`Value`].
///
/// # Examples
///
/// ```rust
/// use datacast::{from_value, value};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_value(&value!({"x": 1, "y": 2})).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the value's shape does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    let json = serde_json::to_value(value).map_err(Error::custom)?;
    serde_json::from_value(json).map_err(Error::custom)
}
