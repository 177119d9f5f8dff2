//! Configuring conversions with `TranscodeOptions` and `Codecs`.
//!
//! Run with: cargo run --example custom_options

use datacast::{AttributeMode, Codecs, Error, TranscodeOptions, Transcoder};

const CATALOG: &str = r#"<catalog>
  <book id="b1" lang="en"><title>Dune</title><year>1965</year></book>
  <book id="b2"><title>Solaris</title><year>1961</year></book>
</catalog>"#;

fn main() -> Result<(), Error> {
    // Attributes are captured on parse and dropped on XML output by default
    let default = Transcoder::new();
    let out = default.transcode(CATALOG, "catalog.xml", "xml")?;
    println!("Default XML output:\n{}\n", out.content.as_text().unwrap_or_default());

    let transcoder = Transcoder::with_options(
        TranscodeOptions::new()
            .with_table_name("books")
            .with_xml_attributes(AttributeMode::Emit)
            .with_max_xml_depth(16),
    );

    println!("XML output with attributes:");
    let out = transcoder.transcode(CATALOG, "catalog.xml", "xml")?;
    println!("{}\n", out.content.as_text().unwrap_or_default());

    println!("SQL output with a configured table name:");
    let out = transcoder.transcode(CATALOG, "catalog.xml", "sql")?;
    println!("{}\n", out.content.as_text().unwrap_or_default());

    // Without a YAML codec, YAML targets fail instead of guessing
    let no_yaml = Transcoder::new().with_codecs(Codecs::new().without_yaml());
    match no_yaml.transcode(CATALOG, "catalog.xml", "yaml") {
        Ok(_) => println!("unexpected YAML output"),
        Err(err) => println!("Without YAML codec: {}", err),
    }

    // Unknown target tokens are rejected up front
    if let Err(err) = transcoder.transcode("[]", "empty.json", "parquet") {
        println!("Unknown target: {}", err);
    }

    Ok(())
}
