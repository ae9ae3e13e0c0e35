use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use loader::{BatchFn, Loader, LoaderConfig};

struct MapBatch {
    data: HashMap<u32, u64>,
}

#[async_trait]
impl BatchFn<u32, u64> for MapBatch {
    type Error = Infallible;

    async fn load(&self, keys: &[u32]) -> Result<HashMap<u32, u64>, Infallible> {
        Ok(keys
            .iter()
            .filter_map(|k| self.data.get(k).map(|v| (*k, *v)))
            .collect())
    }
}

fn make_loader() -> Loader<u32, u64, MapBatch> {
    let data = (0..1_000).map(|i| (i, u64::from(i) * 7)).collect();
    Loader::new(
        "bench",
        MapBatch { data },
        LoaderConfig::default().wait(Duration::ZERO),
    )
}

fn bench_load_many(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let keys: Vec<u32> = (0..100).collect();

    c.bench_function("loader/load_many_100_distinct", |b| {
        b.iter(|| {
            rt.block_on(async {
                let loader = make_loader();
                loader.load_many(&keys).await.unwrap();
            });
        });
    });
}

fn bench_load_many_duplicates(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    // 100 lookups over 10 distinct keys, like an order page sharing products.
    let keys: Vec<u32> = (0..100).map(|i| i % 10).collect();

    c.bench_function("loader/load_many_100_over_10_keys", |b| {
        b.iter(|| {
            rt.block_on(async {
                let loader = make_loader();
                loader.load_many(&keys).await.unwrap();
            });
        });
    });
}

fn bench_cached_load(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let loader = make_loader();
    rt.block_on(async { loader.load(1).await.unwrap() });

    c.bench_function("loader/cached_load", |b| {
        b.iter(|| {
            rt.block_on(async {
                loader.load(1).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_load_many,
    bench_load_many_duplicates,
    bench_cached_load
);
criterion_main!(benches);
