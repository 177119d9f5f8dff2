//! Property-based tests for the round-trip guarantees of each codec.

use datacast::delimited::{parse_delimited, serialize_delimited};
use datacast::json::{format_json, to_json, JsonStyle};
use datacast::sql::{parse_sql_dump, serialize_sql_dump};
use datacast::xml::{parse_xml, serialize_xml};
use datacast::{AttributeMode, Delimiter, Record, Value, DEFAULT_MAX_XML_DEPTH};
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1_000_000i64..1_000_000).prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        ".{0,12}".prop_map(Value::String),
    ]
}

/// Records sharing one key set, as tabular formats expect.
fn table() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_set(key(), 1..5).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        prop::collection::vec(
            prop::collection::vec(scalar(), keys.len()).prop_map(move |cells| {
                keys.iter().cloned().zip(cells).collect::<Record>()
            }),
            0..8,
        )
    })
}

fn nested() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec((key(), inner), 0..4)
                .prop_map(|entries| Value::Record(entries.into_iter().collect())),
        ]
    })
}

fn to_rows(records: Vec<Record>) -> Value {
    Value::List(records.into_iter().map(Value::Record).collect())
}

proptest! {
    #[test]
    fn prop_csv_round_trip_keeps_keys_and_text(records in table()) {
        let rows = to_rows(records.clone());
        for delimiter in [Delimiter::Comma, Delimiter::Tab] {
            let text = serialize_delimited(&rows, delimiter).unwrap();
            let parsed = parse_delimited(&text, delimiter);
            prop_assert!(parsed.is_clean());

            let back = parsed.value.as_list().cloned().unwrap_or_default();
            prop_assert_eq!(back.len(), records.len());
            for (original, read) in records.iter().zip(&back) {
                let read = read.as_record().unwrap();
                let keys: Vec<&String> = read.keys().collect();
                prop_assert_eq!(keys, original.keys().collect::<Vec<_>>());
                for (k, v) in original.iter() {
                    prop_assert_eq!(
                        read.get(k).and_then(Value::as_str),
                        Some(&*v.to_text())
                    );
                }
            }
        }
    }

    #[test]
    fn prop_sql_row_count_and_order(records in table()) {
        prop_assume!(!records.is_empty());
        let rows = to_rows(records.clone());
        let sql = serialize_sql_dump(&rows, "t");
        let parsed = parse_sql_dump(&sql).unwrap();
        prop_assert!(parsed.is_clean());
        let back = parsed.value.as_list().cloned().unwrap_or_default();
        prop_assert_eq!(back.len(), records.len());
        for (original, read) in records.iter().zip(&back) {
            let read = read.as_record().unwrap();
            prop_assert_eq!(
                read.keys().collect::<Vec<_>>(),
                original.keys().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn prop_json_format_is_idempotent(value in nested()) {
        for style in [JsonStyle::Pretty, JsonStyle::Minified] {
            let once = to_json(&value, style).unwrap();
            prop_assert_eq!(format_json(&once, style).unwrap(), once);
        }
    }

    #[test]
    fn prop_xml_list_round_trip(items in prop::collection::vec("[a-zA-Z0-9 ,.<>&]{1,10}", 0..6)) {
        let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
        prop_assume!(!items.is_empty());
        let value = Value::List(
            items
                .iter()
                .map(|s| Value::Record(std::iter::once(("v".to_string(), Value::from(s.as_str()))).collect()))
                .collect(),
        );
        let xml = serialize_xml(&value, AttributeMode::Drop);
        prop_assert_eq!(parse_xml(&xml, DEFAULT_MAX_XML_DEPTH).unwrap(), value);
    }
}
