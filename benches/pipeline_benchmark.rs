use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skyscan::model::{FilterSet, SortKey};
use skyscan::pipeline;
use skyscan::sample::sample_offers;

// Benchmark the result pipeline over realistic offer counts
pub fn pipeline_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("result_pipeline");

    for size in [100usize, 1_000, 10_000].iter() {
        let offers = sample_offers(*size);

        group.bench_with_input(BenchmarkId::new("sort_by_price", size), size, |b, _| {
            b.iter(|| {
                let mut offers = offers.clone();
                pipeline::sort_offers(black_box(&mut offers), SortKey::Price);
                offers
            })
        });

        let filters = FilterSet {
            price_range: Some((200.0, 600.0)),
            stops: vec![0, 1],
            amenities: vec!["wifi".to_string()],
            ..FilterSet::default()
        };

        group.bench_with_input(BenchmarkId::new("full_pipeline", size), size, |b, _| {
            b.iter(|| {
                pipeline::run(
                    black_box(offers.clone()),
                    SortKey::Duration,
                    black_box(&filters),
                    2,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
