//! Benchmarks for TYPE_INFO and parameter value decoding.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mssql_types::{ValueReader, decode_utf16_string, read_type_info, read_value};
use std::hint::black_box;

const LATIN1: [u8; 5] = [0x09, 0x04, 0xD0, 0x00, 0x34];

fn nvarchar_param(text: &str) -> Vec<u8> {
    let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let mut bytes = vec![0xE7, 0x40, 0x1F];
    bytes.extend_from_slice(&LATIN1);
    bytes.extend_from_slice(&(utf16.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&utf16);
    bytes
}

fn nvarchar_max_param(text: &str, chunk: usize) -> Vec<u8> {
    let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let mut bytes = vec![0xE7, 0xFF, 0xFF];
    bytes.extend_from_slice(&LATIN1);
    bytes.extend_from_slice(&(utf16.len() as u64).to_le_bytes());
    for part in utf16.chunks(chunk) {
        bytes.extend_from_slice(&(part.len() as u32).to_le_bytes());
        bytes.extend_from_slice(part);
    }
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

fn decode_param(bytes: &[u8]) {
    let mut reader = ValueReader::new(bytes, bytes.len());
    let info = read_type_info(&mut reader).unwrap();
    black_box(read_value(&mut reader, &info).unwrap());
}

/// Benchmark UTF-16 string decoding (SQL NVARCHAR format → Rust String).
fn bench_utf16_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("utf16_decode");

    for (name, text) in [
        ("short", "sp_executesql"),
        (
            "medium",
            "SELECT TOP (10) * FROM dbo.Orders WHERE CustomerId = @p0",
        ),
    ] {
        let encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| black_box(decode_utf16_string(black_box(&encoded)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark fixed and byte-length parameter values.
fn bench_scalar_params(c: &mut Criterion) {
    let int4 = [0x38u8, 0x2A, 0x00, 0x00, 0x00];
    let intn = [0x26u8, 0x08, 0x08, 1, 2, 3, 4, 5, 6, 7, 8];
    let decimal = [0x6Cu8, 0x11, 0x12, 0x04, 0x09, 0x01, 1, 2, 3, 4, 5, 6, 7, 8];

    let mut group = c.benchmark_group("scalar_params");
    group.bench_function("int4", |b| b.iter(|| decode_param(black_box(&int4))));
    group.bench_function("intn8", |b| b.iter(|| decode_param(black_box(&intn))));
    group.bench_function("numeric", |b| b.iter(|| decode_param(black_box(&decimal))));
    group.finish();
}

/// Benchmark the statement-text parameter in both length encodings.
fn bench_statement_params(c: &mut Criterion) {
    let statement = "SELECT o.Id, o.Total FROM dbo.Orders AS o WHERE o.Region = @region; ".repeat(16);

    let mut group = c.benchmark_group("statement_params");
    let short = nvarchar_param(&statement);
    group.throughput(Throughput::Bytes(short.len() as u64));
    group.bench_function("nvarchar", |b| b.iter(|| decode_param(black_box(&short))));

    for chunk in [64usize, 512, 4096] {
        let plp = nvarchar_max_param(&statement, chunk);
        group.throughput(Throughput::Bytes(plp.len() as u64));
        group.bench_with_input(BenchmarkId::new("nvarchar_max", chunk), &plp, |b, bytes| {
            b.iter(|| decode_param(black_box(bytes)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_utf16_decode,
    bench_scalar_params,
    bench_statement_params,
);
criterion_main!(benches);
