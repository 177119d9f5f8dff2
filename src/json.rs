//! JSON parsing and formatting.
//!
//! JSON goes straight through `serde_json` into [`Value`], keeping key order. Output is
//! either pretty (two-space indent) or minified.
//!
//! ```rust
//! use datacast::json::{format_json, JsonStyle};
//!
//! let pretty = format_json(r#"{"b":1,"a":[true,null]}"#, JsonStyle::Pretty).unwrap();
//! assert_eq!(pretty, "{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}");
//!
//! let minified = format_json(&pretty, JsonStyle::Minified).unwrap();
//! assert_eq!(minified, r#"{"b":1,"a":[true,null]}"#);
//! ```

use crate::{Error, Result, Value};

/// Layout of JSON output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JsonStyle {
    /// Two-space indentation, one member per line
    #[default]
    Pretty,
    /// No insignificant whitespace
    Minified,
}

/// Parses JSON text into a [`Value`].
///
/// Duplicate keys overwrite the earlier value in place.
///
/// # Errors
///
/// Returns [`Error::Parse`] with `serde_json`'s message (which carries the line and column)
/// for malformed input.
pub fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| Error::parse("JSON", err))
}

/// Renders a value as JSON text.
///
/// Non-finite numbers have no JSON form and are written as `null`.
///
/// # Examples
///
/// ```rust
/// use datacast::json::{to_json, JsonStyle};
/// use datacast::value;
///
/// let value = value!({"id": 1, "score": 2.5});
/// assert_eq!(to_json(&value, JsonStyle::Minified).unwrap(), r#"{"id":1,"score":2.5}"#);
/// ```
pub fn to_json(value: &Value, style: JsonStyle) -> Result<String> {
    let rendered = match style {
        JsonStyle::Pretty => serde_json::to_string_pretty(value),
        JsonStyle::Minified => serde_json::to_string(value),
    };
    rendered.map_err(Error::custom)
}

/// Re-formats JSON text in the given style.
///
/// Applying the same style to already-formatted output returns it unchanged.
pub fn format_json(text: &str, style: JsonStyle) -> Result<String> {
    to_json(&parse_json(text)?, style)
}
