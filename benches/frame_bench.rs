//! Response framing and parsing benchmarks.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench frame_bench
//! ```

use bytes::{BufMut, BytesMut};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tagwatch_core::Timestamp;
use tagwatch_protocol::{UhfCodec, crc, validate_and_parse};
use tokio_util::codec::Decoder;

/// Successful inventory response carrying `count` six-byte identifiers.
fn inventory_frame(count: u8) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u8(5 + 1 + count * 7);
    buf.put_slice(&[0x00, 0x01, 0x01, count]);
    for i in 0..count {
        buf.put_u8(6);
        buf.put_slice(&[0xE2, 0x00, 0x34, 0x12, 0x01, i]);
    }
    crc::append(&mut buf);
    buf
}

fn bench_validate_and_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_and_parse");

    for count in [1u8, 5, 15] {
        let frame = inventory_frame(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &frame, |b, frame| {
            b.iter(|| {
                let batch = validate_and_parse(black_box(frame), Timestamp::from_millis(1000));
                black_box(batch).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_decode_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_chunked");
    group.throughput(Throughput::Elements(1));

    let frame = inventory_frame(15);

    group.bench_function("fifteen_tags_8_byte_chunks", |b| {
        b.iter(|| {
            let mut codec = UhfCodec::new();
            let mut buffer = BytesMut::new();
            let mut decoded = None;
            for chunk in frame.chunks(8) {
                buffer.extend_from_slice(chunk);
                if let Some(bytes) = codec.decode(&mut buffer).unwrap() {
                    decoded = Some(bytes);
                }
            }
            black_box(decoded).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_validate_and_parse, bench_decode_chunked);
criterion_main!(benches);
