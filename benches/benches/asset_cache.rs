// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture, ready};
use understory_asset_cache::{AssetCache, AssetStore};

struct Bytes;

impl AssetStore<String> for Bytes {
    type Asset = usize;
    type Error = &'static str;

    fn fetch<'a>(&'a self, key: &'a String) -> LocalBoxFuture<'a, Result<usize, &'static str>> {
        ready(Ok(key.len())).boxed_local()
    }
}

/// Batches that slide over a key space, like the tiles around a panning view.
fn sliding_batches(batches: usize, batch_len: usize, stride: usize) -> Vec<Vec<String>> {
    (0..batches)
        .map(|b| {
            (0..batch_len)
                .map(|i| format!("{}/{}.jpg", b * stride + i, i % 7))
                .collect()
        })
        .collect()
}

fn bench_asset_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_asset_cache");
    group.sample_size(50);

    for (capacity, batch_len, stride) in [(64_usize, 32_usize, 8_usize), (512, 256, 64)] {
        let batches = sliding_batches(64, batch_len, stride);
        group.bench_function(
            format!("sliding_add_batch(cap={capacity},batch={batch_len},stride={stride})"),
            |b| {
                b.iter_batched(
                    || AssetCache::new(capacity),
                    |mut cache| {
                        for batch in &batches {
                            black_box(block_on(cache.add_batch(batch, &Bytes)));
                        }
                        cache
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        let mut warm = AssetCache::new(capacity);
        block_on(warm.add_batch(&batches[0], &Bytes));
        let keys = batches[0].clone();
        group.bench_function(format!("get_promote(cap={capacity})"), |b| {
            b.iter(|| {
                for key in keys.iter().rev() {
                    black_box(warm.get(key));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_asset_cache);
criterion_main!(benches);
