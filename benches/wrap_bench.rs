use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use quill::buffer::gap::GapBuffer;
use quill::layout;

fn wrapped_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrapped_layout");

    // Mixed content: short lines, long wrapped lines, blank lines
    let mut text = String::new();
    for i in 0..400 {
        match i % 3 {
            0 => text.push_str("short line\n"),
            1 => text.push_str(&"a long line that will wrap several times ".repeat(4)),
            _ => text.push('\n'),
        }
    }
    let buf = GapBuffer::from_bytes(text.as_bytes());

    group.bench_function("find_location_end", |b| {
        b.iter(|| layout::find_location(&buf, 0, black_box(buf.len()), 78))
    });

    group.bench_function("total_rows", |b| {
        b.iter(|| layout::total_rows(&buf, black_box(78)))
    });

    group.bench_function("pos_plus_rows_50", |b| {
        b.iter(|| layout::pos_plus_rows(&buf, 0, black_box(50), 78))
    });

    group.bench_function("pos_minus_rows_50", |b| {
        let (start, _) = layout::pos_plus_rows(&buf, 0, 200, 78);
        b.iter(|| layout::pos_minus_rows(&buf, start, black_box(50), 78))
    });

    group.bench_function("rewrap_narrow", |b| {
        let (start, _) = layout::pos_plus_rows(&buf, 0, 120, 78);
        b.iter(|| layout::rewrap_start(&buf, black_box(start), 78, 40))
    });

    group.finish();
}

criterion_group!(benches, wrapped_layout);
criterion_main!(benches);
