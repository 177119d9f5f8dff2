//! Error and warning types for transcoding.
//!
//! Failures come in two flavors:
//!
//! - **Call-level errors** ([`Error`]): the whole conversion is aborted and no partial
//!   output is produced. Malformed XML, invalid JSON, an SQL document without a single
//!   `INSERT INTO` statement, an unknown target token or a missing external codec all
//!   end up here.
//! - **Row-level warnings** ([`Warning`]): recoverable anomalies such as a CSV line with
//!   the wrong number of fields or an SQL tuple whose arity does not match its column
//!   list. The offending row is padded, truncated or dropped and the issue is reported
//!   next to the successful value in [`Parsed`].
//!
//! ## Examples
//!
//! ```rust
//! use datacast::{transcode, Error};
//!
//! let err = transcode(b"a,b\n1,2", "data.csv", "parquet").unwrap_err();
//! assert!(matches!(err, Error::UnsupportedConversion(_)));
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Represents every way a transcode call can fail.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Input could not be parsed as the detected or declared format
    #[error("Failed to parse {format} input: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// Target-format token is not recognized
    #[error("Unsupported conversion target: {0}")]
    UnsupportedConversion(String),

    /// External codec is not configured or failed to initialize
    #[error("{0} codec is not available")]
    CodecUnavailable(String),

    /// External codec reported a failure while running
    #[error("{codec} codec failed: {message}")]
    Codec {
        codec: &'static str,
        message: String,
    },

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error for the named format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::Error;
    ///
    /// let err = Error::parse("XML", "unexpected end of input");
    /// assert!(err.to_string().contains("XML"));
    /// ```
    pub fn parse<T: fmt::Display>(format: &'static str, message: T) -> Self {
        Error::Parse {
            format,
            message: message.to_string(),
        }
    }

    /// Creates an error for an unrecognized target-format token.
    pub fn unsupported_conversion(token: &str) -> Self {
        Error::UnsupportedConversion(token.to_string())
    }

    /// Creates an error for an external codec that is not configured.
    pub fn codec_unavailable(codec: &str) -> Self {
        Error::CodecUnavailable(codec.to_string())
    }

    /// Wraps a failure reported by an external codec.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::Error;
    ///
    /// let err = Error::codec("YAML", "mapping values are not allowed here");
    /// assert!(err.to_string().starts_with("YAML codec failed"));
    /// ```
    pub fn codec<T: fmt::Display>(codec: &'static str, message: T) -> Self {
        Error::Codec {
            codec,
            message: message.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a recoverable, row-level issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Quote-aware tokenization disagreed with the header width; the line was split naively
    CsvFieldCount,
    /// A quoted CSV field was still open at end of input
    CsvUnterminatedQuote,
    /// An SQL tuple's value count did not match its column list; the tuple was dropped
    SqlArityMismatch,
    /// An `INSERT INTO` statement without a `VALUES` body was skipped
    SqlUnsupportedStatement,
}

/// A recoverable issue found while parsing.
///
/// `row` is 1-based: the data line for CSV (header excluded) and the tuple position within the
/// whole document for SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub row: Option<usize>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, row: Option<usize>, message: impl Into<String>) -> Self {
        let warning = Warning {
            kind,
            row,
            message: message.into(),
        };
        log::warn!("{warning}");
        warning
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {}: {}", row, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A successfully parsed value together with the recoverable issues met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Parsed<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Parsed { value, warnings }
    }

    /// Wraps a value that was parsed without any warnings.
    pub fn clean(value: T) -> Self {
        Parsed {
            value,
            warnings: Vec::new(),
        }
    }

    /// Returns `true` if no recoverable issue was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Discards the warnings and returns the value.
    pub fn into_value(self) -> T {
        self.value
    }
}
