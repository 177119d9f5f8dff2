use datacast::{value, Record, Value};

#[test]
fn test_value_macro_null() {
    let value = value!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_value_macro_booleans() {
    assert_eq!(value!(true), Value::Bool(true));
    assert_eq!(value!(false), Value::Bool(false));
}

#[test]
fn test_value_macro_numbers() {
    assert_eq!(value!(42), Value::Number(42.0));
    assert_eq!(value!(3.5), Value::Number(3.5));
    assert_eq!(value!(-123), Value::Number(-123.0));
    assert_eq!(value!(u64::MAX), Value::Number(u64::MAX as f64));
}

#[test]
fn test_value_macro_strings() {
    assert_eq!(value!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(value!(""), Value::String(String::new()));

    let owned = String::from("owned");
    assert_eq!(value!(owned), Value::String("owned".to_string()));
}

#[test]
fn test_value_macro_lists() {
    assert_eq!(value!([]), Value::List(vec![]));

    let mixed = value!([1, "hello", true, null]);
    assert_eq!(
        mixed,
        Value::List(vec![
            Value::Number(1.0),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
        ])
    );

    let nested = value!([[1, 2], [(-3)]]);
    assert_eq!(nested.as_list().map(Vec::len), Some(2));
    assert_eq!(nested.rows()[1], Value::List(vec![Value::Number(-3.0)]));
}

#[test]
fn test_value_macro_records() {
    assert_eq!(value!({}), Value::Record(Record::new()));

    let user = value!({
        "id": 1,
        "name": "Ada",
        "roles": ["admin"],
        "address": {"city": "London", "zip": null},
    });
    let record = user.as_record().unwrap();
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, ["id", "name", "roles", "address"]);

    let address = record.get("address").and_then(Value::as_record).unwrap();
    assert_eq!(address.get("city").and_then(Value::as_str), Some("London"));
    assert_eq!(address.get("zip"), Some(&Value::Null));
}

#[test]
fn test_value_macro_duplicate_key_overwrites_in_place() {
    let value = value!({"a": 1, "b": 2, "a": 3});
    let record = value.as_record().unwrap();
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(record.get("a"), Some(&Value::Number(3.0)));
}

#[test]
fn test_value_macro_from_expressions() {
    let count = 7_u8;
    let maybe: Option<&str> = None;
    let value = value!({"count": count, "maybe": maybe, "ratio": (1.0 / 4.0)});
    assert_eq!(value, value!({"count": 7, "maybe": null, "ratio": 0.25}));
}
