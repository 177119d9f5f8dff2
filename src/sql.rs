//! SQL dump codec.
//!
//! The parser extracts the data rows of `INSERT INTO ... VALUES` statements from a dump;
//! every other statement is ignored. It does not validate SQL. Two statement shapes are
//! recognized, in strict precedence:
//!
//! 1. `INSERT INTO t (a, b) VALUES (...), (...);` uses the listed column names.
//! 2. `INSERT INTO t VALUES (...);` names columns positionally `col_1`, `col_2`, ...
//!
//! If any statement in the document lists its columns, statements without a column list
//! are skipped entirely. `-- ...` and `/* ... */` comments are ignored.
//!
//! ```rust
//! use datacast::sql::{parse_sql_dump, serialize_sql_dump};
//! use datacast::value;
//!
//! let parsed = parse_sql_dump("INSERT INTO t VALUES (1,'a'),(2,'b');").unwrap();
//! assert_eq!(
//!     parsed.value,
//!     value!([{"col_1": 1, "col_2": "a"}, {"col_1": 2, "col_2": "b"}])
//! );
//!
//! let sql = serialize_sql_dump(&value!([{"id": 1, "name": "O'Brien"}]), "users");
//! assert_eq!(sql, "INSERT INTO users (id, name) VALUES\n(1, 'O''Brien');");
//! ```

use crate::error::{Parsed, Warning, WarningKind};
use crate::sniff::starts_with_ci;
use crate::value::format_number;
use crate::{Error, Record, Result, Value};

const QUOTES: [char; 3] = ['\'', '"', '`'];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Matches `keyword` at `pos` as a whole word, ignoring ASCII case.
fn keyword_at(bytes: &[u8], pos: usize, keyword: &str) -> bool {
    let end = pos + keyword.len();
    starts_with_ci(&bytes[pos..], keyword.as_bytes())
        && (pos == 0 || !is_word_byte(bytes[pos - 1]))
        && bytes.get(end).map_or(true, |b| !is_word_byte(*b))
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).map_or(false, u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

/// Returns the index just past the quoted run opening at `pos`. A doubled closing quote
/// is a literal quote character.
fn skip_quoted(bytes: &[u8], pos: usize, close: u8) -> usize {
    let mut i = pos + 1;
    while i < bytes.len() {
        if bytes[i] == close {
            if close != b']' && bytes.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn closing_quote(b: u8) -> Option<u8> {
    match b {
        b'\'' | b'"' | b'`' => Some(b),
        b'[' => Some(b']'),
        _ => None,
    }
}

/// Returns the index past the `-- ...` or `/* ... */` comment opening at `pos`.
///
/// An unclosed comment runs to end of input.
fn skip_comment(bytes: &[u8], pos: usize) -> Option<usize> {
    match (bytes[pos], bytes.get(pos + 1).copied()) {
        (b'-', Some(b'-')) => Some(
            bytes[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |offset| pos + offset + 1),
        ),
        (b'/', Some(b'*')) => Some(
            bytes[pos + 2..]
                .windows(2)
                .position(|pair| pair == b"*/")
                .map_or(bytes.len(), |offset| pos + offset + 4),
        ),
        _ => None,
    }
}

/// Finds the `;` ending the statement that starts at `pos`, or the end of input.
fn statement_end(bytes: &[u8], mut pos: usize) -> usize {
    let mut depth = 0usize;
    while pos < bytes.len() {
        if let Some(next) = skip_comment(bytes, pos) {
            pos = next;
            continue;
        }
        match bytes[pos] {
            b @ (b'\'' | b'"' | b'`') => {
                pos = skip_quoted(bytes, pos, b);
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => return pos,
            _ => {}
        }
        pos += 1;
    }
    bytes.len()
}

/// One `INSERT INTO` statement, split into its parts.
#[derive(Debug)]
struct InsertStatement<'a> {
    table: &'a str,
    columns: Option<Vec<String>>,
    /// Text after the `VALUES` keyword, or `None` for any other insert body.
    values: Option<&'a str>,
}

/// Reads the table name following `INSERT INTO`: bare or quoted identifiers joined by
/// dots.
fn read_table_name(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut pos = start;
    loop {
        match bytes.get(pos).copied().and_then(closing_quote) {
            Some(close) if pos < end => pos = skip_quoted(bytes, pos, close).min(end),
            _ => {
                while pos < end && (is_word_byte(bytes[pos]) || bytes[pos] == b'$') {
                    pos += 1;
                }
            }
        }
        if pos < end && bytes[pos] == b'.' {
            pos += 1;
        } else {
            return pos;
        }
    }
}

fn strip_identifier_quotes(name: &str) -> String {
    name.trim()
        .trim_matches(|c| QUOTES.contains(&c))
        .trim()
        .to_string()
}

/// Splits the parenthesized column list opening at `open`; returns the names and the
/// index past the closing parenthesis.
fn read_column_list(text: &str, open: usize, end: usize) -> (Vec<String>, usize) {
    let bytes = text.as_bytes();
    let mut columns = Vec::new();
    let mut start = open + 1;
    let mut pos = open + 1;
    while pos < end {
        match bytes[pos] {
            b @ (b'\'' | b'"' | b'`') => {
                pos = skip_quoted(bytes, pos, b).min(end);
                continue;
            }
            b',' => {
                columns.push(strip_identifier_quotes(&text[start..pos]));
                start = pos + 1;
            }
            b')' => {
                columns.push(strip_identifier_quotes(&text[start..pos]));
                return (columns, pos + 1);
            }
            _ => {}
        }
        pos += 1;
    }
    columns.push(strip_identifier_quotes(&text[start..end]));
    (columns, end)
}

/// Parses the statement whose `INSERT` keyword sits at `start` and ends at `end`.
///
/// Returns `None` when `INSERT` is not followed by `INTO`.
fn read_insert(text: &str, start: usize, end: usize) -> Option<InsertStatement<'_>> {
    let bytes = text.as_bytes();
    let into = skip_whitespace(bytes, start + "insert".len());
    if into == start + "insert".len() || into >= end || !keyword_at(bytes, into, "into") {
        return None;
    }
    let table_start = skip_whitespace(bytes, into + "into".len());
    let table_end = read_table_name(bytes, table_start, end);
    let table = &text[table_start..table_end];

    let mut pos = skip_whitespace(bytes, table_end);
    let mut columns = None;
    if pos < end && bytes[pos] == b'(' {
        let (names, after) = read_column_list(text, pos, end);
        columns = Some(names);
        pos = skip_whitespace(bytes, after);
    }

    let values = (pos < end && keyword_at(bytes, pos, "values"))
        .then(|| &text[pos + "values".len()..end]);
    Some(InsertStatement {
        table,
        columns,
        values,
    })
}

/// Finds every `INSERT INTO` statement outside string literals and comments.
fn find_inserts(text: &str) -> Vec<InsertStatement<'_>> {
    let bytes = text.as_bytes();
    let mut statements = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if let Some(next) = skip_comment(bytes, pos) {
            pos = next;
            continue;
        }
        match bytes[pos] {
            b @ (b'\'' | b'"' | b'`') => {
                pos = skip_quoted(bytes, pos, b);
                continue;
            }
            b'i' | b'I' if keyword_at(bytes, pos, "insert") => {
                let end = statement_end(bytes, pos);
                if let Some(statement) = read_insert(text, pos, end) {
                    statements.push(statement);
                    pos = end + 1;
                    continue;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    statements
}

/// Splits a `VALUES` body into tuples of raw scalar text.
///
/// Quote characters stay in the raw text so [`coerce_scalar`] can tell literals from
/// bare words; parentheses nested inside a tuple are ordinary characters. Comments outside
/// literals are dropped.
fn split_tuples(body: &str) -> Vec<Vec<String>> {
    let mut tuples = Vec::new();
    let mut row = Vec::new();
    let mut scalar = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            scalar.push(ch);
            if ch == q {
                if chars.peek() == Some(&q) {
                    chars.next();
                    scalar.push(q);
                } else {
                    quote = None;
                }
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                if depth > 0 {
                    scalar.push(ch);
                }
            }
            '(' => {
                depth += 1;
                if depth == 1 {
                    row.clear();
                    scalar.clear();
                } else {
                    scalar.push(ch);
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ')' if depth == 1 => {
                depth = 0;
                row.push(std::mem::take(&mut scalar));
                tuples.push(std::mem::take(&mut row));
            }
            ')' if depth > 1 => {
                depth -= 1;
                scalar.push(ch);
            }
            ',' if depth == 1 => row.push(std::mem::take(&mut scalar)),
            c if depth > 0 => scalar.push(c),
            _ => {}
        }
    }
    tuples
}

fn parse_decimal(s: &str) -> Option<f64> {
    let decimal_chars = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if s.is_empty() || !decimal_chars {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns the content of `s` if the quote opening it is closed by its last character,
/// collapsing doubled quotes.
fn unwrap_literal(s: &str, quote: char) -> Option<String> {
    let inner = s.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut content = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == quote && chars.next() != Some(quote) {
            return None;
        }
        content.push(ch);
    }
    Some(content)
}

/// Converts one raw tuple scalar to a value.
fn coerce_scalar(raw: &str) -> Value {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Some(n) = parse_decimal(s) {
        return Value::Number(n);
    }
    for quote in QUOTES {
        if let Some(content) = unwrap_literal(s, quote) {
            return Value::String(content);
        }
    }
    Value::String(s.to_string())
}

/// Parses the `INSERT INTO ... VALUES` rows of an SQL dump into a `List` of `Record`s.
///
/// Fails only when the text contains no `INSERT INTO ... VALUES` statement at all; tuples
/// whose arity disagrees with an explicit column list are dropped with a warning.
///
/// # Examples
///
/// ```rust
/// use datacast::sql::parse_sql_dump;
/// use datacast::value;
///
/// let dump = "CREATE TABLE `users` (id INT);\n\
///             INSERT INTO `users` (`id`, `name`) VALUES (1, 'Ada'), (2, NULL);";
/// let parsed = parse_sql_dump(dump).unwrap();
/// assert_eq!(
///     parsed.value,
///     value!([{"id": 1, "name": "Ada"}, {"id": 2, "name": null}])
/// );
///
/// assert!(parse_sql_dump("SELECT 1;").is_err());
/// ```
pub fn parse_sql_dump(text: &str) -> Result<Parsed<Value>> {
    let mut warnings = Vec::new();
    let mut statements = Vec::new();
    for statement in find_inserts(text) {
        match statement.values {
            Some(body) => statements.push((statement.table, statement.columns, body)),
            None => warnings.push(Warning::new(
                WarningKind::SqlUnsupportedStatement,
                None,
                format!(
                    "INSERT INTO {} without a VALUES list was skipped",
                    statement.table
                ),
            )),
        }
    }
    if statements.is_empty() {
        return Err(Error::parse(
            "SQL",
            "no INSERT INTO ... VALUES statement found",
        ));
    }

    let explicit = statements.iter().any(|(_, columns, _)| columns.is_some());
    let mut rows = Vec::new();
    let mut tuple_number = 0;
    for (table, columns, body) in statements {
        if explicit != columns.is_some() {
            continue;
        }
        log::debug!("reading rows inserted into {table}");
        for tuple in split_tuples(body) {
            tuple_number += 1;
            let record: Record = match &columns {
                Some(columns) if columns.len() != tuple.len() => {
                    warnings.push(Warning::new(
                        WarningKind::SqlArityMismatch,
                        Some(tuple_number),
                        format!(
                            "tuple has {} values for {} columns of {table}; dropped",
                            tuple.len(),
                            columns.len()
                        ),
                    ));
                    continue;
                }
                Some(columns) => columns
                    .iter()
                    .cloned()
                    .zip(tuple.iter().map(|raw| coerce_scalar(raw)))
                    .collect(),
                None => tuple
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| (format!("col_{}", i + 1), coerce_scalar(raw)))
                    .collect(),
            };
            rows.push(Value::Record(record));
        }
    }

    log::debug!("parsed {} SQL rows", rows.len());
    Ok(Parsed::new(Value::List(rows), warnings))
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
///
/// # Examples
///
/// ```rust
/// use datacast::sql::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("order items"), "order_items");
/// assert_eq!(sanitize_identifier("user-id"), "user_id");
/// ```
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn sql_literal(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(Value::Number(n)) if n.is_finite() => format_number(*n),
        Some(Value::Number(_)) => "NULL".to_string(),
        Some(other) => format!("'{}'", other.to_text().replace('\'', "''")),
    }
}

/// Serializes a value as a single multi-row `INSERT` statement.
///
/// The columns are the first record's keys; later records contribute `NULL` for missing
/// keys and their extra keys are not written.
///
/// # Examples
///
/// ```rust
/// use datacast::sql::serialize_sql_dump;
/// use datacast::value;
///
/// let rows = value!([{"id": 1, "tags": ["x"]}, {"id": 2.5}]);
/// assert_eq!(
///     serialize_sql_dump(&rows, "my-table"),
///     "INSERT INTO my_table (id, tags) VALUES\n(1, '[\"x\"]'),\n(2.5, NULL);"
/// );
/// ```
pub fn serialize_sql_dump(value: &Value, table_name: &str) -> String {
    let records = value.records();
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let header = format!(
        "INSERT INTO {} ({}) VALUES\n",
        sanitize_identifier(table_name),
        columns
            .iter()
            .map(|name| sanitize_identifier(name))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let tuples: Vec<String> = records
        .iter()
        .map(|record| {
            let literals: Vec<String> = columns
                .iter()
                .map(|name| sql_literal(record.get(name)))
                .collect();
            format!("({})", literals.join(", "))
        })
        .collect();
    format!("{header}{};", tuples.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_explicit_columns_with_quoted_names() {
        let parsed =
            parse_sql_dump("insert into \"public\".\"users\" (`id`, \"name\") values (1, 'x');")
                .unwrap();
        assert_eq!(parsed.value, value!([{"id": 1, "name": "x"}]));
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_explicit_columns_win_over_positional() {
        let dump = "INSERT INTO a VALUES (9);\nINSERT INTO b (x) VALUES (1),(2);";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value, value!([{"x": 1}, {"x": 2}]));
    }

    #[test]
    fn test_arity_mismatch_drops_tuple() {
        let parsed = parse_sql_dump("INSERT INTO t (a, b) VALUES (1, 2), (3), (4, 5);").unwrap();
        assert_eq!(parsed.value, value!([{"a": 1, "b": 2}, {"a": 4, "b": 5}]));
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::SqlArityMismatch);
        assert_eq!(parsed.warnings[0].row, Some(2));
    }

    #[test]
    fn test_literals_keep_delimiters_and_parens() {
        let parsed =
            parse_sql_dump("INSERT INTO t VALUES ('a, (b)', 'it''s', \"q\"\"q\", now(), -1.5e2);")
                .unwrap();
        assert_eq!(
            parsed.value,
            value!([{
                "col_1": "a, (b)",
                "col_2": "it's",
                "col_3": "q\"q",
                "col_4": "now()",
                "col_5": (-150)
            }])
        );
    }

    #[test]
    fn test_semicolon_inside_string_does_not_end_statement() {
        let dump = "INSERT INTO t VALUES ('a;b');\nINSERT INTO t VALUES ('c')";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value, value!([{"col_1": "a;b"}, {"col_1": "c"}]));
    }

    #[test]
    fn test_keywords_inside_literals_ignored() {
        let dump = "INSERT INTO t VALUES ('insert into x values (1)');";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value.as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_non_numeric_spellings_stay_strings() {
        for word in ["inf", "NaN", "1,5", "0x1F", "12abc"] {
            assert_eq!(coerce_scalar(word), Value::String(word.to_string()), "{word}");
        }
        assert_eq!(coerce_scalar(" NuLL "), Value::Null);
        assert_eq!(coerce_scalar("007"), Value::Number(7.0));
    }

    #[test]
    fn test_only_fully_wrapped_literals_unwrap() {
        assert_eq!(coerce_scalar("'a' || 'b'"), Value::from("'a' || 'b'"));
        assert_eq!(coerce_scalar("'it''s'"), Value::from("it's"));
        assert_eq!(coerce_scalar("''"), Value::from(""));
        assert_eq!(coerce_scalar("`x`"), Value::from("x"));
    }

    #[test]
    fn test_apostrophes_in_comments_ignored() {
        let dump = "-- Don't edit this file\nINSERT INTO t VALUES (1,'a'),(2,'b');";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(
            parsed.value,
            value!([{"col_1": 1, "col_2": "a"}, {"col_1": 2, "col_2": "b"}])
        );

        let dump = "/* user's data */\nINSERT INTO t (a) VALUES (1);";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value, value!([{"a": 1}]));
    }

    #[test]
    fn test_commented_out_statements_and_tuple_comments() {
        let dump = "-- INSERT INTO t (z) VALUES (0);\n\
                    INSERT INTO t (a, b) VALUES\n\
                    (1, 'x'), -- first; it's fine\n\
                    /* (9, 'skipped') */ (2, 'y');\n\
                    /* trailing";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value, value!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]));
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_insert_select_skipped_with_warning() {
        let dump = "INSERT INTO t SELECT * FROM u;\nINSERT INTO t VALUES (1);";
        let parsed = parse_sql_dump(dump).unwrap();
        assert_eq!(parsed.value, value!([{"col_1": 1}]));
        assert_eq!(
            parsed.warnings[0].kind,
            WarningKind::SqlUnsupportedStatement
        );
    }

    #[test]
    fn test_no_statements_is_an_error() {
        let err = parse_sql_dump("CREATE TABLE t (id int);").unwrap_err();
        assert!(matches!(err, Error::Parse { format: "SQL", .. }));
        assert!(parse_sql_dump("").is_err());
        assert!(parse_sql_dump("INSERTINTO t VALUES (1);").is_err());
    }

    #[test]
    fn test_serialize_escapes_and_nulls() {
        let rows = value!([
            {"id": 1, "note": "it's", "ok": true},
            {"id": null, "note": {"k": "v"}}
        ]);
        assert_eq!(
            serialize_sql_dump(&rows, "t"),
            "INSERT INTO t (id, note, ok) VALUES\n\
             (1, 'it''s', 'true'),\n\
             (NULL, '{\"k\":\"v\"}', NULL);"
        );
    }

    #[test]
    fn test_serialize_non_finite_as_null() {
        let rows = Value::List(vec![Value::Record(
            std::iter::once(("x".to_string(), Value::Number(f64::INFINITY))).collect(),
        )]);
        assert_eq!(
            serialize_sql_dump(&rows, "t"),
            "INSERT INTO t (x) VALUES\n(NULL);"
        );
    }

    #[test]
    fn test_serialize_empty_list() {
        assert_eq!(serialize_sql_dump(&Value::List(vec![]), "t"), "");
    }

    #[test]
    fn test_round_trip_row_count() {
        let rows = value!([{"a": 1, "b": "x"}, {"a": 2, "b": "y, z"}, {"a": 3, "b": null}]);
        let sql = serialize_sql_dump(&rows, "t");
        let parsed = parse_sql_dump(&sql).unwrap();
        assert_eq!(parsed.value, rows);
    }
}
