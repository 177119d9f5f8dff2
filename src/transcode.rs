//! The conversion pipeline: detect → parse → [`Value`] → serialize → wrap.
//!
//! [`transcode`] runs it with default options and codecs; a [`Transcoder`] carries
//! [`TranscodeOptions`] and a [`Codecs`] registry for configured use.
//!
//! ```rust
//! use datacast::{transcode, Content};
//!
//! let out = transcode("name,age\nBob,25", "people.csv", "to-json-min").unwrap();
//! assert_eq!(out.content, Content::Text(r#"[{"name":"Bob","age":"25"}]"#.to_string()));
//! assert_eq!(out.filename, "people.json");
//! assert_eq!(out.mime, "application/json");
//! ```

use crate::codec::Codecs;
use crate::delimited::{parse_delimited, serialize_delimited};
use crate::error::{Parsed, Warning};
use crate::json::{parse_json, to_json};
use crate::sql::{parse_sql_dump, serialize_sql_dump};
use crate::xml::{parse_xml, serialize_xml};
use crate::{sniff, Delimiter, Error, Format, Result, Target, TranscodeOptions, Value};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DEFAULT_TABLE_NAME: &str = "data";
const DEFAULT_FILE_STEM: &str = "converted";

/// Serialized output payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Produced only by the spreadsheet codec
    Binary(Vec<u8>),
}

impl Content {
    /// Returns the text payload, or `None` for binary content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Binary(_) => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Binary(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Text(text) => text.into_bytes(),
            Content::Binary(bytes) => bytes,
        }
    }
}

/// Result of a successful conversion.
#[derive(Clone, Debug)]
pub struct Transcoded {
    pub content: Content,
    /// Suggested output filename
    pub filename: String,
    pub mime: &'static str,
    /// Recoverable issues met while parsing the input
    pub warnings: Vec<Warning>,
}

/// Suggests an output filename: the source name with its extension replaced by the
/// target's.
///
/// # Examples
///
/// ```rust
/// use datacast::transcode::output_filename;
/// use datacast::Target;
///
/// assert_eq!(output_filename("report.final.csv", Target::Sql), "report.final.sql");
/// assert_eq!(output_filename("README", Target::Xml), "README.xml");
/// assert_eq!(output_filename("", Target::Yaml), "converted.yaml");
/// ```
#[must_use]
pub fn output_filename(source_name: &str, target: Target) -> String {
    if source_name.is_empty() {
        return format!("{DEFAULT_FILE_STEM}.{}", target.extension());
    }
    Path::new(source_name)
        .with_extension(target.extension())
        .to_string_lossy()
        .into_owned()
}

fn decode_utf8(input: &[u8]) -> Result<&str> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    std::str::from_utf8(input).map_err(|err| Error::parse("UTF-8", err))
}

/// A configured conversion pipeline.
///
/// # Examples
///
/// ```rust
/// use datacast::{TranscodeOptions, Transcoder};
///
/// let transcoder = Transcoder::with_options(TranscodeOptions::new().with_table_name("people"));
/// let out = transcoder
///     .transcode(r#"[{"id": 1}]"#, "export.json", "sql")
///     .unwrap();
/// assert_eq!(out.content.as_text(), Some("INSERT INTO people (id) VALUES\n(1);"));
/// assert_eq!(out.filename, "export.sql");
/// ```
#[derive(Debug, Default)]
pub struct Transcoder {
    options: TranscodeOptions,
    codecs: Codecs,
}

impl Transcoder {
    /// Creates a transcoder with default options and the bundled codecs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: TranscodeOptions) -> Self {
        Transcoder {
            options,
            codecs: Codecs::default(),
        }
    }

    /// Replaces the codec registry.
    #[must_use]
    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = codecs;
        self
    }

    #[must_use]
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Converts `input` to the format named by `target`.
    ///
    /// The source format is detected from `source_name` and, failing that, the content.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedConversion`] for an unknown target token, before the input
    ///   is looked at
    /// - [`Error::Parse`] when the input cannot be parsed as its detected format
    /// - [`Error::CodecUnavailable`] when the source or target needs a missing codec
    pub fn transcode(
        &self,
        input: impl AsRef<[u8]>,
        source_name: &str,
        target: &str,
    ) -> Result<Transcoded> {
        self.transcode_with_mime(input, source_name, None, target)
    }

    /// Like [`transcode`](Self::transcode), with a declared MIME type consulted when the
    /// file extension is missing or unknown.
    pub fn transcode_with_mime(
        &self,
        input: impl AsRef<[u8]>,
        source_name: &str,
        declared_mime: Option<&str>,
        target: &str,
    ) -> Result<Transcoded> {
        let target: Target = target.parse()?;
        let Parsed { value, warnings } = self.decode(input.as_ref(), source_name, declared_mime)?;
        let content = self.encode(&value, source_name, target)?;
        log::debug!(
            "converted {source_name:?} to {} ({} warnings)",
            target.extension(),
            warnings.len()
        );
        Ok(Transcoded {
            content,
            filename: output_filename(source_name, target),
            mime: target.mime(),
            warnings,
        })
    }

    /// Parses raw input into a [`Value`].
    pub fn decode(
        &self,
        input: &[u8],
        source_name: &str,
        declared_mime: Option<&str>,
    ) -> Result<Parsed<Value>> {
        let declared = sniff::format_from_name(source_name)
            .or_else(|| declared_mime.and_then(Format::from_mime));
        if declared == Some(Format::Spreadsheet) {
            log::debug!("decoding {source_name:?} with the spreadsheet codec");
            let value = self.codecs.spreadsheet()?.decode(input)?;
            return Ok(Parsed::clean(value));
        }

        let text = decode_utf8(input)?;
        let format = sniff::detect(source_name, declared_mime, text);
        log::debug!("parsing {source_name:?} as {format}");
        self.parse_text(text, format)
    }

    fn parse_text(&self, text: &str, format: Format) -> Result<Parsed<Value>> {
        let parsed = match format {
            Format::Json => Parsed::clean(parse_json(text)?),
            Format::Yaml => Parsed::clean(self.codecs.yaml()?.load(text)?),
            Format::Csv => parse_delimited(text, Delimiter::Comma),
            Format::Tsv => parse_delimited(text, Delimiter::Tab),
            Format::Xml => Parsed::clean(parse_xml(text, self.options.max_xml_depth)?),
            Format::Sql => parse_sql_dump(text)?,
            Format::Spreadsheet => {
                Parsed::clean(self.codecs.spreadsheet()?.decode(text.as_bytes())?)
            }
        };
        Ok(parsed)
    }

    /// Serializes a [`Value`] for the given target.
    ///
    /// `source_name` supplies the SQL table name when none is configured.
    pub fn encode(&self, value: &Value, source_name: &str, target: Target) -> Result<Content> {
        let content = match target {
            Target::Csv => Content::Text(serialize_delimited(value, Delimiter::Comma)?),
            Target::Tsv => Content::Text(serialize_delimited(value, Delimiter::Tab)?),
            Target::Json(style) => Content::Text(to_json(value, style)?),
            Target::Yaml => Content::Text(self.codecs.yaml()?.dump(value)?),
            Target::Xml => Content::Text(serialize_xml(value, self.options.xml_attributes)),
            Target::Sql => {
                Content::Text(serialize_sql_dump(value, &self.table_name(source_name)))
            }
            Target::Xlsx => Content::Binary(self.codecs.spreadsheet()?.encode(value)?),
        };
        Ok(content)
    }

    /// Table name for SQL output: the configured name, else the source file stem, else
    /// `data`.
    fn table_name(&self, source_name: &str) -> String {
        if let Some(name) = &self.options.table_name {
            return name.clone();
        }
        Path::new(source_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string())
    }
}

/// Converts `input` with default options and codecs.
///
/// See [`Transcoder::transcode`].
pub fn transcode(input: impl AsRef<[u8]>, source_name: &str, target: &str) -> Result<Transcoded> {
    Transcoder::default().transcode(input, source_name, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_sources() {
        let default = Transcoder::new();
        assert_eq!(default.table_name("dir/users.csv"), "users");
        assert_eq!(default.table_name(""), "data");

        let named = Transcoder::with_options(TranscodeOptions::new().with_table_name("t"));
        assert_eq!(named.table_name("users.csv"), "t");
    }

    #[test]
    fn test_bom_is_stripped() {
        assert_eq!(decode_utf8(b"\xEF\xBB\xBFa,b").unwrap(), "a,b");
        assert!(matches!(
            decode_utf8(b"\xFF\xFE"),
            Err(Error::Parse { format: "UTF-8", .. })
        ));
    }

    #[test]
    fn test_content_accessors() {
        let text = Content::Text("x".to_string());
        assert_eq!(text.as_text(), Some("x"));
        assert_eq!(text.as_bytes(), b"x");
        let binary = Content::Binary(vec![0, 1]);
        assert_eq!(binary.as_text(), None);
        assert_eq!(binary.into_bytes(), vec![0, 1]);
    }

    #[test]
    fn test_output_filename_keeps_directory() {
        assert_eq!(output_filename("in/data.tsv", Target::Csv), "in/data.csv");
    }
}
