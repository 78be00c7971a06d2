// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture, ready};
use kurbo::{Point, Size, Vec2};
use understory_tile_grid::{
    CellCoord, EffectiveWindow, FetchError, GridConfig, GridViewport, ItemIndex, PathEntry,
    PathLookup, TileData, TileDataSource, TileId, VisibleRegion, map_region, stitch_region,
};

struct Dense {
    cells: u32,
}

impl Dense {
    fn tile(&self, tile: TileId) -> TileData {
        let n = self.cells;
        let base = (u64::from(tile.x) << 32) | (u64::from(tile.y) << 16);
        let placements = (0..n)
            .flat_map(|y| (0..n).map(move |x| CellCoord::new(x, y)))
            .map(|cell| (base + u64::from(cell.y * n + cell.x), cell));
        TileData::new(tile, placements)
    }
}

impl TileDataSource for Dense {
    fn fetch_tile(&self, tile: TileId) -> LocalBoxFuture<'_, Result<TileData, FetchError>> {
        ready(Ok(self.tile(tile))).boxed_local()
    }
}

impl PathLookup for Dense {
    fn lookup_paths<'a>(
        &'a self,
        indexes: &'a [ItemIndex],
    ) -> LocalBoxFuture<'a, Result<Vec<PathEntry>, FetchError>> {
        let entries = indexes
            .iter()
            .map(|index| PathEntry {
                index: *index,
                path: format!("{index}.jpg"),
            })
            .collect();
        ready(Ok(entries)).boxed_local()
    }
}

fn windows(count: u32) -> Vec<EffectiveWindow> {
    (0..count)
        .map(|i| {
            let t = f64::from(i);
            EffectiveWindow::new((t * 37.7) % 3000.0, (t * 53.3) % 3000.0, 1000.0, 1000.0)
        })
        .collect()
}

fn bench_tile_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_tile_grid");
    group.sample_size(50);

    let windows = windows(256);
    for n in [10_u32, 32] {
        group.bench_function(format!("visible_region(n={n})"), |b| {
            b.iter(|| {
                for window in &windows {
                    black_box(VisibleRegion::compute(2, window, n));
                }
            });
        });

        let source = Dense { cells: n };
        let region = VisibleRegion::compute(2, &windows[17], n);
        let tiles: Vec<TileData> = region.iter().map(|share| source.tile(share.tile)).collect();
        group.bench_function(format!("map_region(n={n})"), |b| {
            let refs = [Some(&tiles[0]), Some(&tiles[1]), Some(&tiles[2]), Some(&tiles[3])];
            b.iter(|| black_box(map_region(&region, &refs)));
        });

        group.bench_function(format!("stitch_region(n={n})"), |b| {
            b.iter(|| black_box(block_on(stitch_region(&region, &source))));
        });
    }

    group.bench_function("grid_viewport_pan_zoom", |b| {
        let source = Dense { cells: 10 };
        b.iter(|| {
            let mut vp = GridViewport::new(
                GridConfig::default().with_real_window(Size::new(4000.0, 4000.0)),
            );
            for step in 0..16 {
                let request = if step % 4 == 0 {
                    vp.zoom_at(step / 4 + 1, Point::new(1250.0, 1000.0))
                } else {
                    vp.pan_by(Vec2::new(-120.0, -80.0))
                };
                if let Some(request) = request {
                    let frame = block_on(request.resolve(&source));
                    black_box(vp.apply(frame));
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tile_grid);
criterion_main!(benches);
