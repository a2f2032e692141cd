use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bbuf::prelude::*;

#[derive(Encode, Decode, Clone, PartialEq, Debug)]
struct Point {
    x: i32,
    y: i32,
    label: Option<String>,
}

impl Message for Point {
    const TYPE_TAG: TypeTag = TypeTag::FIRST_USER;
}

fn sample() -> List {
    (0..256)
        .map(|i| {
            if i % 4 == 0 {
                DynObject::absent()
            } else {
                DynObject::new(Point {
                    x: i,
                    y: -i,
                    label: Some(format!("p{}", i)),
                })
            }
        })
        .collect()
}

fn registry() -> Arc<Registry> {
    let mut reg = Registry::with_builtins();
    reg.register::<Point>().unwrap();
    reg.into_shared()
}

fn encode_bench(c: &mut Criterion) {
    let list = sample();
    c.bench_function("list_encode", |b| b.iter(|| black_box(list.to_bytes())));
    c.bench_function("list_enc_len", |b| b.iter(|| black_box(list.enc_len())));
}

fn decode_bench(c: &mut Criterion) {
    let bytes = sample().to_bytes();
    let reg = registry();
    c.bench_function("list_decode", |b| {
        b.iter(|| black_box(List::<DynObject>::try_decode_with(bytes.as_slice(), reg.clone()).unwrap()))
    });
}

criterion_group! {
    name = list_benches;
    config = Criterion::default();
    targets = encode_bench, decode_bench
}

criterion_main!(list_benches);
