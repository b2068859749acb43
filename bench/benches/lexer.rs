use std::hint::black_box;

use cee::{lexer::Lexer, pre};
use criterion::{criterion_group, criterion_main, Criterion};

static INPUT: &[u8] = include_bytes!("../../demos/showcase.c");

fn pipeline(input: &[u8]) -> usize {
    let buf = pre::normalize(input.to_vec()).expect("demo input must normalize");
    let mut lexer = Lexer::new(buf);
    let tokens = lexer.drain();
    assert!(!lexer.failed());
    tokens.len()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| {
            let mut buf = black_box(INPUT.to_vec());
            let len = pre::expand_trigraphs(&mut buf);
            buf.truncate(len);
            black_box(buf);
        });
    });
    c.bench_function("pipeline", |b| {
        b.iter(|| black_box(pipeline(black_box(INPUT))));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
