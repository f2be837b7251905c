use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use quill::buffer::gap::GapBuffer;

fn buffer_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_insertion");

    // Benchmark single byte insertion at the gap
    group.bench_function("insert_char_end", |b| {
        b.iter_batched(
            GapBuffer::new,
            |mut buf| {
                for i in 0..100 {
                    buf.insert(i, black_box(b"a"));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    static TEXT: &str = "The quick brown fox jumps over the lazy dog. ";
    group.throughput(Throughput::Bytes(TEXT.len() as u64));
    group.bench_function("insert_str_small", |b| {
        b.iter_batched(
            GapBuffer::new,
            |mut buf| {
                buf.insert(0, black_box(TEXT.as_bytes()));
            },
            criterion::BatchSize::SmallInput,
        )
    });

    // Far gap moves: alternate between the two ends
    group.bench_function("insert_alternating_ends", |b| {
        b.iter_batched(
            || GapBuffer::from_bytes(&[b'x'; 64 * 1024]),
            |mut buf| {
                for _ in 0..50 {
                    buf.insert(0, black_box(b"a"));
                    let len = buf.len();
                    buf.insert(len, black_box(b"b"));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn buffer_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_deletion");

    let setup_buf = || {
        let mut buf = GapBuffer::new();
        for _ in 0..100 {
            let len = buf.len();
            buf.insert(len, b"Some text to delete. ");
        }
        buf
    };

    group.bench_function("delete_backward", |b| {
        b.iter_batched(
            setup_buf,
            |mut buf| {
                for _ in 0..50 {
                    let len = buf.len();
                    buf.delete(len - 1, 1);
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("delete_range_middle", |b| {
        b.iter_batched(
            setup_buf,
            |mut buf| {
                buf.delete(black_box(500), black_box(400));
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn utf8_stepping(c: &mut Criterion) {
    let mut group = c.benchmark_group("utf8_stepping");
    let text = "héllo wörld — ünïcode ".repeat(200);
    let buf = GapBuffer::from_bytes(text.as_bytes());

    group.bench_function("step_forward_full", |b| {
        b.iter(|| {
            let mut pos = 0;
            while pos < buf.len() {
                pos = buf.step_forward(black_box(pos));
            }
            pos
        })
    });

    group.bench_function("step_backward_full", |b| {
        b.iter(|| {
            let mut pos = buf.len();
            while pos > 0 {
                pos = buf.step_backward(black_box(pos));
            }
            pos
        })
    });

    group.finish();
}

criterion_group!(benches, buffer_insertion, buffer_deletion, utf8_stepping);
criterion_main!(benches);
