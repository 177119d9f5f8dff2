/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Negative numbers must be parenthesized when they appear inside a list or record,
/// e.g. `value!([(-1), 2])`.
///
/// ```rust
/// use datacast::{value, Value};
///
/// let row = value!({"name": "Ada", "tags": ["x", "y"], "manager": null});
/// assert_eq!(row.as_record().unwrap().len(), 3);
/// assert_eq!(value!([(-1), 2.5]), Value::List(vec![Value::from(-1), Value::from(2.5)]));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Record($crate::Record::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Record(record)
    }};

    // Any other expression convertible into a Value
    ($s:expr) => {
        $crate::Value::from($s)
    };
}
