//! Loader and value parser benchmarks.
//!
//! Measures loading across file sizes and single-value parsing across the
//! supported value shapes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sifter::input::CsvLoader;
use sifter::schema::TypeKind;
use sifter::ValueParser;
use std::io::Write;
use tempfile::NamedTempFile;

/// Generate synthetic TSV data with the specified number of rows and columns.
fn generate_tsv_data(rows: usize, cols: usize) -> String {
    let mut data = String::new();

    // Header row
    for i in 0..cols {
        if i > 0 {
            data.push('\t');
        }
        data.push_str(&format!("column_{}", i + 1));
    }
    data.push('\n');

    // Data rows
    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                data.push('\t');
            }
            // Mix of data types
            match col % 5 {
                0 => data.push_str(&format!("ID_{:06}", row)),
                1 => data.push_str(&format!("{:.2}", row as f64 * 1.5)),
                2 => data.push_str(&format!("{:02}/{:02}/2023", (row % 28) + 1, (row % 12) + 1)),
                3 => data.push_str(if row % 2 == 0 { "sim" } else { "não" }),
                4 => data.push_str(&format!("Categoria_{}", row % 10)),
                _ => unreachable!(),
            }
        }
        data.push('\n');
    }

    data
}

/// Benchmark loading TSV files of various sizes.
fn bench_load_tsv(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_tsv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_tsv_data(*rows, 10);
        let bytes = data.len();

        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || {
                    let mut temp = NamedTempFile::with_suffix(".tsv").unwrap();
                    temp.write_all(data.as_bytes()).unwrap();
                    temp
                },
                |temp| {
                    let loader = CsvLoader::new();
                    black_box(loader.load_file(temp.path()).unwrap())
                },
            )
        });
    }

    group.finish();
}

/// Benchmark loading in-memory CSV text with varying column counts.
fn bench_load_column_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_column_scaling");

    let rows = 1_000;
    for cols in [5, 10, 20, 50].iter() {
        let data = generate_tsv_data(rows, *cols).replace('\t', ",");

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("cols", cols), &data, |b, data| {
            let loader = CsvLoader::new();
            b.iter(|| black_box(loader.load_text(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark parsing single values of each shape.
fn bench_parse_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_value");
    let parser = ValueParser::new();

    let inputs = [
        ("integer", "123456"),
        ("grouped", "1,234,567"),
        ("decimal_comma", "1.234,56"),
        ("boolean", "verdadeiro"),
        ("iso_date", "2024-01-05T10:30:00"),
        ("dmy_date", "25/12/2023"),
        ("textual_date", "January 5, 2024"),
        ("text", "not a value at all"),
    ];

    for (name, input) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| black_box(parser.parse(input, &TypeKind::CANDIDATES)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_load_tsv,
    bench_load_column_scaling,
    bench_parse_values,
);
criterion_main!(benches);
