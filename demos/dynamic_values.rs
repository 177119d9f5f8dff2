//! Building values by hand and serializing them with the format modules.
//!
//! Run with: cargo run --example dynamic_values

use datacast::delimited::{parse_delimited, serialize_delimited};
use datacast::sql::parse_sql_dump;
use datacast::xml::serialize_xml;
use datacast::{from_value, to_value, value, AttributeMode, Delimiter, Value};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Item {
    sku: String,
    price: f64,
    stock: Option<u32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let rows = value!([
        {"sku": "A-1", "price": 9.5, "stock": 3},
        {"sku": "B-2", "price": 12, "stock": null, "tags": ["new", "sale"]}
    ]);

    // Header is the union of keys; nested values are written as JSON text
    let csv = serialize_delimited(&rows, Delimiter::Comma)?;
    println!("CSV:\n{}\n", csv);

    // Reading it back gives string cells
    let parsed = parse_delimited(&csv, Delimiter::Comma);
    println!("Parsed back:\n{}\n", parsed.value);

    println!("XML:\n{}\n", serialize_xml(&rows, AttributeMode::Drop));

    // SQL keeps numbers and NULLs typed
    let dump = "-- inventory export\n\
                INSERT INTO items (sku, price, stock) VALUES ('A-1', 9.5, 3), ('B-2', 12, NULL);";
    let parsed = parse_sql_dump(dump)?;
    let items: Vec<Item> = from_value(&parsed.value)?;
    println!("Items from SQL: {:?}\n", items);

    // Structs convert to values and back
    let value: Value = to_value(&items)?;
    assert_eq!(from_value::<Vec<Item>>(&value)?, items);
    println!("✓ Round-trip successful");

    Ok(())
}
