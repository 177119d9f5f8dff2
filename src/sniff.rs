//! Source format detection.
//!
//! The file extension wins. Without a recognized extension a declared MIME type is
//! consulted, and only then the content itself:
//!
//! - leading `{` or `[` → JSON
//! - leading `<` → XML
//! - `INSERT INTO` or `CREATE TABLE` anywhere (any case, any whitespace between the
//!   words) → SQL
//! - anything else → CSV
//!
//! Spreadsheets are never detected from content; binary bytes make a poor sample.
//!
//! ```rust
//! use datacast::{sniff::detect, Format};
//!
//! assert_eq!(detect("report.TSV", None, ""), Format::Tsv);
//! assert_eq!(detect("paste", None, "  [1, 2]"), Format::Json);
//! assert_eq!(detect("dump", None, "insert\n  into t values (1);"), Format::Sql);
//! assert_eq!(detect("", None, "a,b\n1,2"), Format::Csv);
//! ```

use crate::Format;
use std::path::Path;

/// Returns the format named by the file's extension, if it is one we know.
#[must_use]
pub fn format_from_name(filename: &str) -> Option<Format> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
}

/// Decides the source format of a document.
#[must_use]
pub fn detect(filename: &str, declared_mime: Option<&str>, sample: &str) -> Format {
    if let Some(format) = format_from_name(filename) {
        return format;
    }
    if let Some(format) = declared_mime.and_then(Format::from_mime) {
        return format;
    }
    sniff_content(sample)
}

/// Guesses a text format from the document body alone.
#[must_use]
pub fn sniff_content(sample: &str) -> Format {
    let trimmed = sample.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Format::Json
    } else if trimmed.starts_with('<') {
        Format::Xml
    } else if contains_keyword_pair(trimmed, "insert", "into")
        || contains_keyword_pair(trimmed, "create", "table")
    {
        Format::Sql
    } else {
        Format::Csv
    }
}

/// ASCII case-insensitive prefix test on raw bytes.
pub(crate) fn starts_with_ci(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

/// Matches `first\s+second` anywhere in `text`, ignoring ASCII case.
fn contains_keyword_pair(text: &str, first: &str, second: &str) -> bool {
    let bytes = text.as_bytes();
    let (first, second) = (first.as_bytes(), second.as_bytes());
    (0..bytes.len()).any(|start| {
        if !starts_with_ci(&bytes[start..], first) {
            return false;
        }
        let rest = &bytes[start + first.len()..];
        let gap = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
        gap > 0 && starts_with_ci(&rest[gap..], second)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_takes_precedence() {
        assert_eq!(detect("data.csv", None, "{\"a\":1}"), Format::Csv);
        assert_eq!(detect("book.XLSX", None, "<xml/>"), Format::Spreadsheet);
        assert_eq!(detect("config.yml", Some("application/json"), ""), Format::Yaml);
    }

    #[test]
    fn test_mime_before_content() {
        assert_eq!(detect("upload", Some("text/xml"), "a,b"), Format::Xml);
        assert_eq!(detect("upload", Some("text/plain"), "<a/>"), Format::Xml);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_content() {
        assert_eq!(detect("notes.txt", None, "<root/>"), Format::Xml);
        assert_eq!(detect("dump.bak", None, "CREATE   TABLE t (id int);"), Format::Sql);
    }

    #[test]
    fn test_keyword_pair_requires_whitespace() {
        assert!(!contains_keyword_pair("INSERTINTO t", "insert", "into"));
        assert!(contains_keyword_pair("-- x\nInsert\tInto t", "insert", "into"));
        assert_eq!(sniff_content("name,insert into\n1,2"), Format::Sql);
    }

    #[test]
    fn test_default_is_csv() {
        assert_eq!(sniff_content(""), Format::Csv);
        assert_eq!(sniff_content("id\tname\n1\tAda"), Format::Csv);
    }
}
