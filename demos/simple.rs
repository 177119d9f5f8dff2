//! Converting files between formats with `transcode`.
//!
//! Run with: cargo run --example simple

use datacast::transcode;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let csv = "name,age,city\n\"Jane, A.\",30,Oslo\nBob,25,Lima\n";

    // CSV to pretty JSON
    let out = transcode(csv, "people.csv", "json")?;
    println!("{} ({}):", out.filename, out.mime);
    println!("{}\n", out.content.as_text().unwrap_or_default());

    // The same rows as an SQL dump; the table is named after the file
    let out = transcode(csv, "people.csv", "to-sql")?;
    println!("{}:", out.filename);
    println!("{}\n", out.content.as_text().unwrap_or_default());

    // SQL back to minified JSON
    let dump = out.content.as_text().unwrap_or_default();
    let back = transcode(dump, "people.sql", "json-min")?;
    println!("round trip: {}\n", back.content.as_text().unwrap_or_default());

    // Ragged rows still convert and come back as warnings
    let out = transcode("a,b\n1,2,3\n4", "ragged.csv", "tsv")?;
    println!("{}:", out.filename);
    println!("{}", out.content.as_text().unwrap_or_default());
    for warning in &out.warnings {
        println!("warning: {}", warning);
    }

    Ok(())
}
