// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture, ready};
use kurbo::{Point, Size, Vec2};
use understory_cluster_view::{
    ClusterEntity, ClusterRepresentatives, ClusterSource, ClusterTile, ClusterViewConfig,
    CoordinateRange, Representative, ViewportController,
};
use understory_tile_grid::{FetchError, TileId};

/// Serves `per_tile` clusters spread over each tile.
struct Grid {
    per_side: u32,
}

impl ClusterSource for Grid {
    fn fetch_clusters(&self, tile: TileId) -> LocalBoxFuture<'_, Result<ClusterTile, FetchError>> {
        let size = 1.0 / f64::from(TileId::tiles_per_side(tile.zoom));
        let step = size / f64::from(self.per_side);
        let base = (u64::from(tile.zoom) << 48) | (u64::from(tile.x) << 24) | u64::from(tile.y);
        let entities = (0..self.per_side)
            .flat_map(|j| (0..self.per_side).map(move |i| (i, j)))
            .map(|(i, j)| ClusterEntity {
                representative: Representative {
                    index: (base << 8) + u64::from(j * self.per_side + i),
                    path: format!("{base}/{i}/{j}.jpg"),
                    width: 64,
                    height: 64,
                    low_dimensional_embedding_x: f64::from(tile.x) * size + f64::from(i) * step,
                    low_dimensional_embedding_y: f64::from(tile.y) * size + f64::from(j) * step,
                    author: None,
                    extra: BTreeMap::new(),
                },
                number_of_entities: 1,
            })
            .collect();
        ready(Ok(ClusterTile {
            tile_coordinate_range: CoordinateRange {
                x_min: 0.0,
                x_max: 1.0,
                y_min: 0.0,
                y_max: 1.0,
            },
            clusters_representatives: ClusterRepresentatives { entities },
        }))
        .boxed_local()
    }
}

fn bench_cluster_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_cluster_view");
    group.sample_size(30);

    let source = Grid { per_side: 8 };
    let config = ClusterViewConfig::default()
        .with_real_window(Size::new(1024.0, 1024.0))
        .with_max_zoom_level(6);

    group.bench_function("zoom_then_drag(pool=1024)", |b| {
        b.iter_batched(
            || {
                let mut controller = ViewportController::new(config);
                let batch = controller.start();
                controller.apply(block_on(batch.resolve(&source)));
                controller
            },
            |mut controller| {
                let mut pending = Vec::new();
                pending.extend(controller.zoom_at(3, Point::new(300.0, 700.0)));
                for step in 0..32 {
                    let delta = if step < 16 {
                        Vec2::new(-90.0, 30.0)
                    } else {
                        Vec2::new(60.0, -75.0)
                    };
                    pending.extend(controller.pan_by(delta));
                    for batch in pending.drain(..) {
                        black_box(controller.apply(block_on(batch.resolve(&source))));
                    }
                    black_box(controller.drain_changes());
                }
                controller
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_cluster_view);
criterion_main!(benches);
