use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use datacast::delimited::{parse_delimited, serialize_delimited};
use datacast::sql::{parse_sql_dump, serialize_sql_dump};
use datacast::xml::{parse_xml, serialize_xml};
use datacast::{
    to_value, transcode, AttributeMode, Delimiter, Value, DEFAULT_MAX_XML_DEPTH,
};
use serde::Serialize;

#[derive(Serialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Value {
    let products: Vec<Product> = (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product \"{}\", boxed", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect();
    to_value(&products).unwrap()
}

const SIZES: [u32; 4] = [10, 50, 100, 500];

fn benchmark_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv");
    for size in SIZES {
        let rows = products(size);
        let text = serialize_delimited(&rows, Delimiter::Comma).unwrap();

        group.bench_with_input(BenchmarkId::new("serialize", size), &rows, |b, rows| {
            b.iter(|| serialize_delimited(black_box(rows), Delimiter::Comma))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &text, |b, text| {
            b.iter(|| parse_delimited(black_box(text), Delimiter::Comma))
        });
    }
    group.finish();
}

fn benchmark_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql");
    for size in SIZES {
        let rows = products(size);
        let dump = serialize_sql_dump(&rows, "products");

        group.bench_with_input(BenchmarkId::new("serialize", size), &rows, |b, rows| {
            b.iter(|| serialize_sql_dump(black_box(rows), "products"))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &dump, |b, dump| {
            b.iter(|| parse_sql_dump(black_box(dump)))
        });
    }
    group.finish();
}

fn benchmark_xml(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml");
    for size in SIZES {
        let rows = products(size);
        let xml = serialize_xml(&rows, AttributeMode::Drop);

        group.bench_with_input(BenchmarkId::new("serialize", size), &rows, |b, rows| {
            b.iter(|| serialize_xml(black_box(rows), AttributeMode::Drop))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &xml, |b, xml| {
            b.iter(|| parse_xml(black_box(xml), DEFAULT_MAX_XML_DEPTH))
        });
    }
    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let csv = serialize_delimited(&products(100), Delimiter::Comma).unwrap();
    let mut group = c.benchmark_group("transcode_csv");

    for target in ["json", "json-min", "yaml", "xml", "sql", "tsv"] {
        group.bench_with_input(BenchmarkId::from_parameter(target), &csv, |b, csv| {
            b.iter(|| transcode(black_box(csv.as_bytes()), "products.csv", target))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_csv,
    benchmark_sql,
    benchmark_xml,
    benchmark_pipeline
);
criterion_main!(benches);
