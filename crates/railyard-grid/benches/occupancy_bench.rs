//! Criterion benchmarks for grid occupancy reads and writes.

use criterion::{Criterion, criterion_group, criterion_main};
use railyard_grid::{Corner, GridModel, GridPosition};
use std::hint::black_box;

fn bench_occupancy(c: &mut Criterion) {
    let mut group = c.benchmark_group("occupancy");
    group.sample_size(50);

    // Benchmark: fill then clear every tile of a 64x64 grid.
    group.bench_function("fill_clear_64x64", |b| {
        let mut grid = GridModel::new(64, 64).unwrap();
        b.iter(|| {
            for x in 0..64 {
                for y in 0..64 {
                    grid.set_filled(GridPosition::new(x, y)).unwrap();
                }
            }
            for x in 0..64 {
                for y in 0..64 {
                    grid.set_empty(GridPosition::new(x, y)).unwrap();
                }
            }
        });
    });

    // Benchmark: corner queries over a checkerboard of partial tiles.
    group.bench_function("corner_queries_64x64", |b| {
        let mut grid = GridModel::new(64, 64).unwrap();
        for x in 0..64 {
            for y in 0..64 {
                if (x + y) % 2 == 0 {
                    grid.set_corner(GridPosition::new(x, y), Corner::UpLeft)
                        .unwrap();
                }
            }
        }
        b.iter(|| {
            let mut n = 0;
            for x in -1..65 {
                for y in -1..65 {
                    if grid.corner_filled(GridPosition::new(x, y), Corner::UpLeft) {
                        n += 1;
                    }
                }
            }
            black_box(n)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_occupancy);
criterion_main!(benches);
