//! Benchmarks for TDS wire primitives.

#![allow(clippy::unwrap_used, missing_docs)]

use bytes::{BufMut, BytesMut};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tds_protocol::{
    ByteCursor, Packet, PacketType, ProcId, ProcName,
    packet::{PACKET_HEADER_SIZE, PacketHeader, PacketStatus},
};

/// Benchmark packet header decoding.
fn bench_packet_header_decode(c: &mut Criterion) {
    let header = PacketHeader::new(PacketType::Rpc, PacketStatus::END_OF_MESSAGE, 1000);
    let mut buf = BytesMut::with_capacity(PACKET_HEADER_SIZE);
    header.encode(&mut buf);
    let encoded = buf.freeze();

    c.bench_function("packet_header_decode", |b| {
        b.iter(|| {
            let mut cursor = ByteCursor::new(black_box(&encoded));
            black_box(PacketHeader::decode(&mut cursor).unwrap())
        })
    });
}

/// Benchmark framing a full packet off the wire.
fn bench_packet_from_wire(c: &mut Criterion) {
    let mut payload = BytesMut::new();
    payload.put_u32_le(4);
    ProcName::Catalog(ProcId::ExecuteSql).encode(&mut payload);
    payload.put_slice(&[0u8; 256]);
    let wire = Packet::new(PacketType::Rpc, payload.freeze()).to_wire();

    let mut group = c.benchmark_group("packet_from_wire");
    group.throughput(Throughput::Bytes(wire.len() as u64));
    group.bench_function("rpc_264b", |b| {
        b.iter(|| black_box(Packet::from_wire(black_box(&wire)).unwrap()))
    });
    group.finish();
}

/// Benchmark procedure identifier decoding for both addressing modes.
fn bench_proc_name_decode(c: &mut Criterion) {
    let mut by_id = BytesMut::new();
    ProcName::Catalog(ProcId::PrepExec).encode(&mut by_id);

    let mut by_name = BytesMut::new();
    ProcName::Named("dbo.usp_GetCustomerOrdersByRegion".into()).encode(&mut by_name);

    let mut group = c.benchmark_group("proc_name_decode");
    group.bench_function("catalog", |b| {
        b.iter(|| {
            let mut cursor = ByteCursor::new(black_box(&by_id));
            black_box(ProcName::decode(&mut cursor).unwrap())
        })
    });
    group.bench_function("named", |b| {
        b.iter(|| {
            let mut cursor = ByteCursor::new(black_box(&by_name));
            black_box(ProcName::decode(&mut cursor).unwrap())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_packet_header_decode,
    bench_packet_from_wire,
    bench_proc_name_decode,
);
criterion_main!(benches);
