//! CSV and TSV codec.
//!
//! Parsing is best-effort: the first non-empty line supplies the keys, every following
//! non-empty line becomes one [`Record`]. Short rows are padded with empty strings, long
//! rows are truncated, and a row whose quote-aware field count disagrees with the header
//! is re-split naively on the delimiter. Such rows are reported as [`Warning`]s instead of
//! failing the parse.
//!
//! Serialization quotes every cell, so writing and reading back reproduces the same keys
//! and the same values as strings.
//!
//! ```rust
//! use datacast::delimited::{parse_delimited, serialize_delimited};
//! use datacast::{value, Delimiter};
//!
//! let rows = value!([{"name": "Jane, A.", "age": 30}]);
//! let text = serialize_delimited(&rows, Delimiter::Comma)?;
//! assert_eq!(text, "\"name\",\"age\"\n\"Jane, A.\",\"30\"");
//!
//! let back = parse_delimited(&text, Delimiter::Comma).into_value();
//! assert_eq!(back, value!([{"name": "Jane, A.", "age": "30"}]));
//! # Ok::<(), datacast::Error>(())
//! ```

use crate::error::{Error, Parsed, Result, Warning, WarningKind};
use crate::{Delimiter, Record, Value};
use indexmap::IndexSet;
use std::io::Read;

/// Appended to the input before reading. It comes back as a record of its own unless a
/// quoted field is still open at end of input, in which case it ends that field.
const END_SENTINEL: &str = "\n\0";

/// One logical record, which may span several physical lines when a quoted field
/// contains line breaks.
struct RawRecord<'a> {
    text: &'a str,
    fields: Vec<String>,
}

struct Scan<'a> {
    records: Vec<RawRecord<'a>>,
    unterminated: bool,
}

fn read_records(text: &str, delimiter: u8) -> Scan<'_> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes().chain(END_SENTINEL.as_bytes()));

    let mut read: Vec<(usize, Vec<String>)> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let start = record
                    .position()
                    .and_then(|pos| usize::try_from(pos.byte()).ok())
                    .map_or(text.len(), |byte| byte.min(text.len()));
                read.push((start, record.iter().map(str::to_string).collect()));
            }
            Err(err) => {
                log::warn!("stopped reading delimited input: {}", err);
                break;
            }
        }
    }

    let closed = matches!(read.last(), Some((_, fields)) if fields.len() == 1 && fields[0] == "\0");
    let unterminated = if closed {
        read.pop();
        false
    } else {
        match read.last_mut().and_then(|(_, fields)| fields.last_mut()) {
            Some(field) if field.ends_with(END_SENTINEL) => {
                field.truncate(field.len() - END_SENTINEL.len());
                true
            }
            _ => false,
        }
    };

    let ends: Vec<usize> = read
        .iter()
        .skip(1)
        .map(|(start, _)| *start)
        .chain(std::iter::once(text.len()))
        .collect();
    let records = read
        .into_iter()
        .zip(ends)
        .map(|((start, fields), end)| RawRecord {
            text: text
                .get(start..end)
                .unwrap_or_default()
                .trim_matches(|c| c == '\r' || c == '\n'),
            fields,
        })
        .collect();

    Scan {
        records,
        unterminated,
    }
}

/// Index of the quote that closes a quoted field whose content starts at `pos`.
fn closing_quote(bytes: &[u8], mut pos: usize) -> Option<usize> {
    while pos < bytes.len() {
        if bytes[pos] == b'"' {
            if bytes.get(pos + 1) != Some(&b'"') {
                return Some(pos);
            }
            pos += 1;
        }
        pos += 1;
    }
    None
}

/// Drops whitespace between a closing quote and the next delimiter, as in `"x" ,y`.
fn trim_after_closing_quotes(raw: &str, fields: &mut [String], delimiter: u8) {
    let bytes = raw.as_bytes();
    let mut pos = 0;
    for field in fields.iter_mut() {
        if bytes.get(pos) != Some(&b'"') {
            pos += field.len() + 1;
            continue;
        }
        let Some(close) = closing_quote(bytes, pos + 1) else {
            return;
        };
        let end = bytes[close + 1..]
            .iter()
            .position(|&b| b == delimiter)
            .map_or(bytes.len(), |offset| close + 1 + offset);
        let tail = &raw[close + 1..end];
        if !tail.is_empty() && tail.trim().is_empty() && field.ends_with(tail) {
            field.truncate(field.len() - tail.len());
        }
        pos = end + 1;
    }
}

/// Strips one surrounding pair of double quotes.
fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn naive_split(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(|field| strip_quotes(field.trim()).to_string())
        .collect()
}

/// Parses delimited text into a `List` of `Record`s.
///
/// Never fails; anomalies are reported in the returned warnings.
///
/// # Examples
///
/// ```rust
/// use datacast::delimited::parse_delimited;
/// use datacast::{value, Delimiter};
///
/// let parsed = parse_delimited("id\tname\n1\tAda\n2", Delimiter::Tab);
/// assert_eq!(
///     parsed.value,
///     value!([{"id": "1", "name": "Ada"}, {"id": "2", "name": ""}])
/// );
/// assert_eq!(parsed.warnings.len(), 1);
/// ```
pub fn parse_delimited(text: &str, delimiter: Delimiter) -> Parsed<Value> {
    let scan = read_records(text, delimiter.as_byte());
    let mut warnings = Vec::new();

    let mut records = scan
        .records
        .into_iter()
        .filter(|record| !record.text.trim().is_empty());

    let Some(header) = records.next() else {
        return Parsed::clean(Value::List(Vec::new()));
    };
    let headers: Vec<String> = header
        .fields
        .iter()
        .map(|name| strip_quotes(name.trim()).to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, raw) in records.enumerate() {
        let row_number = index + 1;
        let fields = if raw.fields.len() == headers.len() {
            let mut fields = raw.fields;
            trim_after_closing_quotes(raw.text, &mut fields, delimiter.as_byte());
            fields
        } else {
            warnings.push(Warning::new(
                WarningKind::CsvFieldCount,
                Some(row_number),
                format!(
                    "expected {} fields, found {}; split without quote handling",
                    headers.len(),
                    raw.fields.len()
                ),
            ));
            naive_split(raw.text, delimiter.as_char())
        };

        let mut fields = fields.into_iter();
        let record: Record = headers
            .iter()
            .map(|name| {
                let cell = fields.next().unwrap_or_default();
                (name.clone(), Value::String(cell))
            })
            .collect();
        rows.push(Value::Record(record));
    }

    if scan.unterminated {
        warnings.push(Warning::new(
            WarningKind::CsvUnterminatedQuote,
            None,
            "quoted field is not closed before end of input",
        ));
    }

    log::debug!("parsed {} delimited rows", rows.len());
    Parsed::new(Value::List(rows), warnings)
}

/// Serializes a value as delimited text with every cell quoted.
///
/// A non-list value is treated as a one-row list; a list element that is not a record
/// becomes a row with a single `value` column. Rows are joined with `\n` and there is no
/// trailing line break.
///
/// # Examples
///
/// ```rust
/// use datacast::delimited::serialize_delimited;
/// use datacast::{value, Delimiter};
///
/// let rows = value!([{"a": 1}, {"b": "say \"hi\""}]);
/// assert_eq!(
///     serialize_delimited(&rows, Delimiter::Comma)?,
///     "\"a\",\"b\"\n\"1\",\"\"\n\"\",\"say \"\"hi\"\"\""
/// );
/// # Ok::<(), datacast::Error>(())
/// ```
pub fn serialize_delimited(value: &Value, delimiter: Delimiter) -> Result<String> {
    let records = value.records();
    let headers: IndexSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();
    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .delimiter(delimiter.as_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(headers.iter()).map_err(Error::custom)?;
    for record in &records {
        let row = headers.iter().map(|name| match record.get(name) {
            Some(value) => value.to_text().into_owned(),
            None => String::new(),
        });
        writer.write_record(row).map_err(Error::custom)?;
    }

    let bytes = writer.into_inner().map_err(Error::custom)?;
    let mut text = String::from_utf8(bytes).map_err(Error::custom)?;
    if text.ends_with('\n') {
        text.pop();
    }
    log::debug!("wrote {} delimited rows", records.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_quoted_delimiter_and_escaped_quote() {
        let parsed = parse_delimited(
            "name,quote\n\"Jane, A.\",\"she said \"\"hi\"\"\"",
            Delimiter::Comma,
        );
        assert!(parsed.is_clean());
        assert_eq!(
            parsed.value,
            value!([{"name": "Jane, A.", "quote": "she said \"hi\""}])
        );
    }

    #[test]
    fn test_line_break_inside_quotes() {
        let parsed = parse_delimited("a,b\r\n\"line1\r\nline2\",x\r\n", Delimiter::Comma);
        assert!(parsed.is_clean());
        assert_eq!(parsed.value, value!([{"a": "line1\r\nline2", "b": "x"}]));
    }

    #[test]
    fn test_header_tokens_trimmed_and_unquoted() {
        let parsed = parse_delimited(" \"id\" , name \n1,Ada", Delimiter::Comma);
        let rows = parsed.value.as_list().unwrap();
        let keys: Vec<_> = rows[0].as_record().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let parsed = parse_delimited("\n\na,b\n\n1,2\n   \n3,4\n", Delimiter::Comma);
        assert_eq!(parsed.value, value!([{"a": "1", "b": "2"}, {"a": "3", "b": "4"}]));
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_long_row_truncated_with_warning() {
        let parsed = parse_delimited("a,b\n1,2,3", Delimiter::Comma);
        assert_eq!(parsed.value, value!([{"a": "1", "b": "2"}]));
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::CsvFieldCount);
        assert_eq!(parsed.warnings[0].row, Some(1));
    }

    #[test]
    fn test_mismatch_falls_back_to_naive_split() {
        let parsed = parse_delimited("a,b,c\nx,5\"inch,\"y\",z", Delimiter::Comma);
        assert_eq!(
            parsed.value,
            value!([{"a": "x", "b": "5\"inch", "c": "y"}])
        );
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_unterminated_quote_reported() {
        let parsed = parse_delimited("a,b\n\"open,1", Delimiter::Comma);
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::CsvUnterminatedQuote));
    }

    #[test]
    fn test_unterminated_quote_keeps_rest_of_input() {
        let parsed = parse_delimited("a\n\"open\nstill open", Delimiter::Comma);
        assert_eq!(parsed.value, value!([{"a": "open\nstill open"}]));
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::CsvUnterminatedQuote);
    }

    #[test]
    fn test_whitespace_after_closing_quote_dropped() {
        let parsed = parse_delimited("a,b,c\n\"x\" ,y,\"z\"\t", Delimiter::Comma);
        assert!(parsed.is_clean());
        assert_eq!(parsed.value, value!([{"a": "x", "b": "y", "c": "z"}]));
    }

    #[test]
    fn test_quoted_whitespace_kept() {
        let parsed = parse_delimited("a,b\n\"  x  \",\" \"", Delimiter::Comma);
        assert!(parsed.is_clean());
        assert_eq!(parsed.value, value!([{"a": "  x  ", "b": " "}]));
    }

    #[test]
    fn test_literal_quote_inside_unquoted_field() {
        let parsed = parse_delimited("a,b\n5\"inch,\"q\" ", Delimiter::Comma);
        assert!(parsed.is_clean());
        assert_eq!(parsed.value, value!([{"a": "5\"inch", "b": "q"}]));
    }

    #[test]
    fn test_duplicate_header_keeps_last_value() {
        let parsed = parse_delimited("a,b,a\n1,2,3", Delimiter::Comma);
        assert_eq!(parsed.value, value!([{"a": "3", "b": "2"}]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            parse_delimited("", Delimiter::Comma).value,
            Value::List(vec![])
        );
        assert_eq!(serialize_delimited(&Value::List(vec![]), Delimiter::Comma).unwrap(), "");
    }

    #[test]
    fn test_serialize_header_union_in_first_seen_order() {
        let rows = value!([{"b": 1, "a": 2}, {"c": true, "a": null}]);
        assert_eq!(
            serialize_delimited(&rows, Delimiter::Tab).unwrap(),
            "\"b\"\t\"a\"\t\"c\"\n\"1\"\t\"2\"\t\"\"\n\"\"\t\"\"\t\"true\""
        );
    }

    #[test]
    fn test_serialize_wraps_single_record_and_scalars() {
        assert_eq!(
            serialize_delimited(&value!({"x": "y"}), Delimiter::Comma).unwrap(),
            "\"x\"\n\"y\""
        );
        assert_eq!(
            serialize_delimited(&value!(["p", 2]), Delimiter::Comma).unwrap(),
            "\"value\"\n\"p\"\n\"2\""
        );
    }

    #[test]
    fn test_serialize_nested_values_as_json() {
        let rows = value!([{"tags": ["a", "b"]}]);
        let text = serialize_delimited(&rows, Delimiter::Comma).unwrap();
        assert_eq!(text, "\"tags\"\n\"[\"\"a\"\",\"\"b\"\"]\"");
        let back = parse_delimited(&text, Delimiter::Comma).value;
        assert_eq!(back, value!([{"tags": "[\"a\",\"b\"]"}]));
    }
}
