//! Source and target format identifiers.
//!
//! [`Format`] names what an input is; [`Target`] names what the caller asked for. The
//! target table (extension and MIME type per target) is static and read-only.
//!
//! | Target | Extension | MIME |
//! |---|---|---|
//! | CSV | `csv` | `text/csv` |
//! | TSV | `tsv` | `text/tab-separated-values` |
//! | JSON (pretty or minified) | `json` | `application/json` |
//! | YAML | `yaml` | `text/yaml` |
//! | XML | `xml` | `application/xml` |
//! | SQL | `sql` | `application/sql` |
//! | XLSX | `xlsx` | `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet` |

use crate::json::JsonStyle;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Format of an input document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
    Tsv,
    Xml,
    Yaml,
    Sql,
    /// Binary workbook (`.xlsx`/`.xls`), handled by the external spreadsheet codec
    Spreadsheet,
}

impl Format {
    /// Maps a file extension (without the dot, any case) to a format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::Format;
    ///
    /// assert_eq!(Format::from_extension("YML"), Some(Format::Yaml));
    /// assert_eq!(Format::from_extension("xls"), Some(Format::Spreadsheet));
    /// assert_eq!(Format::from_extension("txt"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            "tsv" => Some(Format::Tsv),
            "xml" => Some(Format::Xml),
            "yaml" | "yml" => Some(Format::Yaml),
            "sql" => Some(Format::Sql),
            "xlsx" | "xls" => Some(Format::Spreadsheet),
            _ => None,
        }
    }

    /// Maps a declared MIME type to a format. Parameters such as `; charset=utf-8` are
    /// ignored, and so is the uninformative `text/plain`.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/json" | "text/json" => Some(Format::Json),
            "text/csv" => Some(Format::Csv),
            "text/tab-separated-values" => Some(Format::Tsv),
            "application/xml" | "text/xml" => Some(Format::Xml),
            "text/yaml" | "application/yaml" | "application/x-yaml" | "text/x-yaml" => {
                Some(Format::Yaml)
            }
            "application/sql" | "text/x-sql" => Some(Format::Sql),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel" => Some(Format::Spreadsheet),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Csv => "CSV",
            Format::Tsv => "TSV",
            Format::Xml => "XML",
            Format::Yaml => "YAML",
            Format::Sql => "SQL",
            Format::Spreadsheet => "Spreadsheet",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output format requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Csv,
    Tsv,
    Json(JsonStyle),
    Yaml,
    Xml,
    Sql,
    Xlsx,
}

impl Target {
    /// Parses a target-format token.
    ///
    /// Tokens are case-insensitive and may carry a `to-` or `to_` prefix.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::{JsonStyle, Target};
    ///
    /// assert_eq!(Target::parse("to-CSV"), Some(Target::Csv));
    /// assert_eq!(Target::parse("json-min"), Some(Target::Json(JsonStyle::Minified)));
    /// assert_eq!(Target::parse("parquet"), None);
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let lowered = token.trim().to_ascii_lowercase();
        let name = lowered
            .strip_prefix("to-")
            .or_else(|| lowered.strip_prefix("to_"))
            .unwrap_or(&lowered);
        match name {
            "csv" => Some(Target::Csv),
            "tsv" => Some(Target::Tsv),
            "json" | "json-pretty" | "json_pretty" | "pretty-json" => {
                Some(Target::Json(JsonStyle::Pretty))
            }
            "json-min" | "json_min" | "json-minified" | "json_minified" | "minified-json" => {
                Some(Target::Json(JsonStyle::Minified))
            }
            "yaml" | "yml" => Some(Target::Yaml),
            "xml" => Some(Target::Xml),
            "sql" => Some(Target::Sql),
            "xlsx" => Some(Target::Xlsx),
            _ => None,
        }
    }

    /// Canonical file extension for the target.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Target::Csv => "csv",
            Target::Tsv => "tsv",
            Target::Json(_) => "json",
            Target::Yaml => "yaml",
            Target::Xml => "xml",
            Target::Sql => "sql",
            Target::Xlsx => "xlsx",
        }
    }

    /// MIME type for the target.
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        match self {
            Target::Csv => "text/csv",
            Target::Tsv => "text/tab-separated-values",
            Target::Json(_) => "application/json",
            Target::Yaml => "text/yaml",
            Target::Xml => "application/xml",
            Target::Sql => "application/sql",
            Target::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Target::parse(s).ok_or_else(|| Error::unsupported_conversion(s))
    }
}
