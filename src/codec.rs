//! Pluggable codecs for formats handled outside this crate's own parsers.
//!
//! YAML comes bundled through [`SerdeYaml`]. Spreadsheet workbooks need a caller-supplied
//! [`SpreadsheetCodec`]; without one, converting from or to `.xlsx` fails with
//! [`Error::CodecUnavailable`].
//!
//! ```rust
//! use datacast::codec::{Codecs, SpreadsheetCodec};
//! use datacast::{Error, Result, Value};
//!
//! struct SingleCell;
//!
//! impl SpreadsheetCodec for SingleCell {
//!     fn decode(&self, bytes: &[u8]) -> Result<Value> {
//!         Ok(Value::from(String::from_utf8_lossy(bytes).into_owned()))
//!     }
//!
//!     fn encode(&self, value: &Value) -> Result<Vec<u8>> {
//!         Ok(value.to_text().into_owned().into_bytes())
//!     }
//! }
//!
//! assert!(matches!(
//!     Codecs::default().spreadsheet(),
//!     Err(Error::CodecUnavailable(_))
//! ));
//! assert!(Codecs::default().with_spreadsheet(SingleCell).spreadsheet().is_ok());
//! ```

use crate::{Error, Result, Value};
use std::fmt;

/// Loads and dumps YAML documents.
pub trait YamlCodec: Send + Sync {
    fn load(&self, text: &str) -> Result<Value>;

    fn dump(&self, value: &Value) -> Result<String>;
}

/// Reads and writes spreadsheet workbooks.
///
/// `decode` is expected to return the first sheet as a `List` of `Record`s keyed by the
/// header row, with cells as strings or numbers.
pub trait SpreadsheetCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Value>;

    fn encode(&self, value: &Value) -> Result<Vec<u8>>;
}

/// [`YamlCodec`] backed by `serde_yaml`.
///
/// Mapping keys that are not strings are stringified; YAML tags are dropped.
///
/// # Examples
///
/// ```rust
/// use datacast::codec::{SerdeYaml, YamlCodec};
/// use datacast::value;
///
/// let value = SerdeYaml.load("- id: 1\n  name: Ada\n").unwrap();
/// assert_eq!(value, value!([{"id": 1, "name": "Ada"}]));
/// assert_eq!(SerdeYaml.dump(&value).unwrap(), "- id: 1\n  name: Ada\n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeYaml;

impl YamlCodec for SerdeYaml {
    fn load(&self, text: &str) -> Result<Value> {
        serde_yaml::from_str(text).map_err(|err| Error::parse("YAML", err))
    }

    fn dump(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|err| Error::codec("YAML", err))
    }
}

/// The set of external codecs available to a [`Transcoder`](crate::Transcoder).
pub struct Codecs {
    yaml: Option<Box<dyn YamlCodec>>,
    spreadsheet: Option<Box<dyn SpreadsheetCodec>>,
}

impl Default for Codecs {
    /// Bundled YAML support, no spreadsheet codec.
    fn default() -> Self {
        Codecs {
            yaml: Some(Box::new(SerdeYaml)),
            spreadsheet: None,
        }
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codecs")
            .field("yaml", &self.yaml.is_some())
            .field("spreadsheet", &self.spreadsheet.is_some())
            .finish()
    }
}

impl Codecs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_yaml(mut self, codec: impl YamlCodec + 'static) -> Self {
        self.yaml = Some(Box::new(codec));
        self
    }

    /// Removes YAML support, so YAML input and output fail with
    /// [`Error::CodecUnavailable`].
    #[must_use]
    pub fn without_yaml(mut self) -> Self {
        self.yaml = None;
        self
    }

    #[must_use]
    pub fn with_spreadsheet(mut self, codec: impl SpreadsheetCodec + 'static) -> Self {
        self.spreadsheet = Some(Box::new(codec));
        self
    }

    /// Returns the configured YAML codec.
    pub fn yaml(&self) -> Result<&dyn YamlCodec> {
        self.yaml
            .as_deref()
            .ok_or_else(|| Error::codec_unavailable("YAML"))
    }

    /// Returns the configured spreadsheet codec.
    pub fn spreadsheet(&self) -> Result<&dyn SpreadsheetCodec> {
        self.spreadsheet
            .as_deref()
            .ok_or_else(|| Error::codec_unavailable("Spreadsheet"))
    }
}
