use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bbuf::varint::{encode_varint, read_varint, write_varint};
use bbuf::ByteBuffer;

const VALUES: [u64; 8] = [0, 1, 127, 128, 300, 1 << 28, u32::MAX as u64, u64::MAX];

fn write_bench(c: &mut Criterion) {
    let mut buf = Vec::with_capacity(VALUES.len() * 10);
    c.bench_function("varint_write", |b| {
        b.iter(|| {
            buf.clear();
            for v in VALUES {
                black_box(write_varint(black_box(v), &mut buf));
            }
        })
    });
}

fn read_bench(c: &mut Criterion) {
    let bytes: Vec<u8> = VALUES.iter().flat_map(|&v| encode_varint(v)).collect();
    let mut bb = ByteBuffer::from(bytes);
    c.bench_function("varint_read", |b| {
        b.iter(|| {
            bb.rewind();
            for _ in VALUES {
                black_box(read_varint(&mut bb).unwrap());
            }
        })
    });
}

criterion_group! {
    name = varint_benches;
    config = Criterion::default();
    targets = write_bench, read_bench
}

criterion_main!(varint_benches);
