use bplus_index::{BPlusTree, Config, CursorOptions, Mode, RangeOrder};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;

const N: usize = 10_000;

/// Orders compared in every group: the default and a wide node.
const ORDERS: [usize; 2] = [6, 64];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn build(order: usize, keys: &[i64]) -> BPlusTree<i64, i64> {
    let mut tree = BPlusTree::with_config(Config::new(order).mode(Mode::Unique)).unwrap();
    for &k in keys {
        tree.store(k, k);
    }
    tree
}

// ─── Store ──────────────────────────────────────────────────────────────────

fn bench_store(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    for order in ORDERS {
        group.bench_function(BenchmarkId::new("BPlusTree", order), |b| b.iter(|| build(order, keys)));
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>());
    });

    group.finish();
}

fn bench_store_ordered(c: &mut Criterion) {
    bench_store(c, "store_ordered", &ordered_keys(N));
}

fn bench_store_reverse(c: &mut Criterion) {
    bench_store(c, "store_reverse", &reverse_ordered_keys(N));
}

fn bench_store_random(c: &mut Criterion) {
    bench_store(c, "store_random", &random_keys(N));
}

fn bench_store_multimap(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_multimap");
    // 100 values under each of N / 100 keys.
    let keys: Vec<i64> = random_keys(N).into_iter().map(|k| k % (N as i64 / 100)).collect();

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter(|| {
            let mut tree = BPlusTree::new(6).unwrap();
            for (i, &k) in keys.iter().enumerate() {
                tree.store(k, i);
            }
            tree
        });
    });

    group.finish();
}

// ─── Fetch ──────────────────────────────────────────────────────────────────

fn bench_fetch_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("fetch_random");

    for order in ORDERS {
        let tree = build(order, &keys);
        group.bench_function(BenchmarkId::new("BPlusTree", order), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = tree.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

// ─── Range and cursor ───────────────────────────────────────────────────────

fn bench_fetch_range(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let (lo, hi) = (N as i64 / 4, N as i64 / 2);

    let mut group = c.benchmark_group("fetch_range");

    for order in ORDERS {
        let tree = build(order, &keys);
        group.bench_function(BenchmarkId::new("BPlusTree", order), |b| {
            b.iter(|| tree.fetch_range(&lo, &hi, RangeOrder::Ascending).len());
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.range(lo..=hi).count());
    });

    group.finish();
}

fn bench_cursor_limit(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let mut group = c.benchmark_group("cursor_limit");

    for order in ORDERS {
        let tree = build(order, &keys);
        group.bench_function(BenchmarkId::new("BPlusTree", order), |b| {
            b.iter(|| {
                tree.values(CursorOptions::new().key(N as i64 / 3).limit(1_000))
                    .map(|entry| entry.values.len())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

// ─── Remove ─────────────────────────────────────────────────────────────────

fn bench_remove(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    for order in ORDERS {
        group.bench_function(BenchmarkId::new("BPlusTree", order), |b| {
            b.iter_batched(
                || build(order, keys),
                |mut tree| {
                    for &k in keys {
                        tree.remove(&k);
                    }
                    tree
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in keys {
                    map.remove(&k);
                }
                map
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_remove_ordered(c: &mut Criterion) {
    bench_remove(c, "remove_ordered", &ordered_keys(N));
}

fn bench_remove_random(c: &mut Criterion) {
    bench_remove(c, "remove_random", &random_keys(N));
}

criterion_group!(
    store_benches,
    bench_store_ordered,
    bench_store_reverse,
    bench_store_random,
    bench_store_multimap,
);

criterion_group!(read_benches, bench_fetch_random, bench_fetch_range, bench_cursor_limit);

criterion_group!(remove_benches, bench_remove_ordered, bench_remove_random);

criterion_main!(store_benches, read_benches, remove_benches);
