use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use loon::builder::LruBuilder;
use loon::policy::lru::LruCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(capacity: usize) -> LruCache<u64, u64> {
    let mut cache = LruCache::new(capacity);
    for i in 0..capacity as u64 {
        cache.put(i, i);
    }
    cache
}

fn bench_lru_put_get(c: &mut Criterion) {
    c.bench_function("lru_put_get", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.put(black_box(i + 10_000), i);
                    let _ = black_box(cache.get(&black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_get_hit");
    for capacity in [64usize, 1024, 65_536] {
        group.throughput(Throughput::Elements(capacity as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
            let mut cache = filled(cap);
            b.iter(|| {
                for i in 0..cap as u64 {
                    let _ = black_box(cache.get(&black_box(i)));
                }
            })
        });
    }
    group.finish();
}

fn bench_lru_eviction_churn(c: &mut Criterion) {
    c.bench_function("lru_eviction_churn", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.put(black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_touch_hotset(c: &mut Criterion) {
    c.bench_function("lru_touch_hotset", |b| {
        b.iter_batched(
            || filled(4096),
            |mut cache| {
                for i in 0..4096u64 {
                    let _ = black_box(cache.touch(&black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_skewed_mix(c: &mut Criterion) {
    // 90% of accesses go to 10% of a keyspace four times the capacity.
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let keys: Vec<u64> = (0..16_384)
        .map(|_| {
            if rng.gen_bool(0.9) {
                rng.gen_range(0..409)
            } else {
                rng.gen_range(0..4096)
            }
        })
        .collect();

    c.bench_function("lru_skewed_mix", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for &key in &keys {
                    if cache.get(&key).is_none() {
                        cache.put(key, key);
                    }
                }
                black_box(cache.size())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_shared_caches(c: &mut Criterion) {
    let threads = 4u64;
    let per_thread = 10_000u64;
    let mut group = c.benchmark_group("shared_put_get");
    group.throughput(Throughput::Elements(threads * per_thread * 2));

    group.bench_function("concurrent", |b| {
        b.iter(|| {
            let cache = LruBuilder::new(4096).build_concurrent::<u64, u64>();
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let cache = cache.clone();
                    thread::spawn(move || {
                        for i in 0..per_thread {
                            let key = (t * per_thread + i) % 8192;
                            cache.put(key, i);
                            black_box(cache.get(&key));
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        })
    });

    group.bench_function("sharded", |b| {
        b.iter(|| {
            let cache = Arc::new(LruBuilder::new(4096).shards(16).build_sharded::<u64, u64>());
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..per_thread {
                            let key = (t * per_thread + i) % 8192;
                            cache.put(key, i);
                            black_box(cache.get(&key));
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lru_put_get,
    bench_lru_get_hit,
    bench_lru_eviction_churn,
    bench_lru_touch_hotset,
    bench_lru_skewed_mix,
    bench_shared_caches
);
criterion_main!(benches);
