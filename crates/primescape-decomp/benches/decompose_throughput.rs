use criterion::{black_box, criterion_group, criterion_main, Criterion};
use primescape_decomp::{decompose, decompose_all, DecomposeOpts};

fn bench_decompose(c: &mut Criterion) {
    c.bench_function("decompose_single", |b| {
        b.iter(|| decompose(black_box(9_699_690)).expect("decompose"));
    });

    let values: Vec<u64> = (2..=50_000).collect();
    c.bench_function("decompose_all_50k", |b| {
        b.iter(|| {
            decompose_all(black_box(&values), &DecomposeOpts::default()).expect("batch")
        });
    });
}

criterion_group!(benches, bench_decompose);
criterion_main!(benches);
