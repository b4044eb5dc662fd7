//! Point access, population and range query benchmarks against a `HashMap` baseline

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grid2d_core::{Grid, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANGES: [i32; 5] = [10, 100, 300, 1000, 10_000];
const POPULATION: usize = 10_000;

/// Scattered walk over `0..range` on both axes
struct RandomIndex {
    range: i64,
    i: i64,
    j: i64,
}

impl RandomIndex {
    fn new(range: i32) -> Self {
        Self {
            range: range as i64,
            i: 0,
            j: 0,
        }
    }

    fn next(&mut self) -> (i32, i32) {
        self.j = (self.j * 13 + self.i * self.i * 17) % self.range;
        self.i = (self.i * 13 + self.j * self.i * 17) % self.range;
        (self.i as i32, self.j as i32)
    }
}

/// Row-major walk over `0..range` on both axes
struct SequentialIndex {
    range: i32,
    i: i32,
    j: i32,
}

impl SequentialIndex {
    fn new(range: i32) -> Self {
        Self { range, i: 0, j: 0 }
    }

    fn next(&mut self) -> (i32, i32) {
        self.j += 1;
        if self.j == self.range {
            self.j = 0;
            self.i = (self.i + 1) % self.range;
        }
        (self.i, self.j)
    }
}

fn populated(range: i32) -> (Grid<i32>, HashMap<(i32, i32), i32>) {
    let mut rng = StdRng::seed_from_u64(123);
    let mut grid = Grid::new();
    let mut map = HashMap::new();
    for _ in 0..POPULATION {
        let i = rng.gen_range(0..range);
        let j = rng.gen_range(0..range);
        let v = rng.gen::<i32>();
        grid.insert(i, j, v);
        map.insert((i, j), v);
    }
    (grid, map)
}

fn bench_random_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_get");
    for range in RANGES {
        let (grid, map) = populated(range);

        group.bench_with_input(BenchmarkId::new("grid", range), &range, |b, &range| {
            let mut idx = RandomIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                black_box(grid.get(i, j));
            });
        });
        group.bench_with_input(BenchmarkId::new("hashmap", range), &range, |b, &range| {
            let mut idx = RandomIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                black_box(map.get(&(i, j)));
            });
        });
    }
    group.finish();
}

fn bench_sequential_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_get");
    for range in RANGES {
        let (grid, map) = populated(range);

        group.bench_with_input(BenchmarkId::new("grid", range), &range, |b, &range| {
            let mut idx = SequentialIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                black_box(grid.get(i, j));
            });
        });
        group.bench_with_input(BenchmarkId::new("hashmap", range), &range, |b, &range| {
            let mut idx = SequentialIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                black_box(map.get(&(i, j)));
            });
        });
    }
    group.finish();
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");
    group.sample_size(20);
    for range in RANGES {
        group.bench_with_input(BenchmarkId::new("grid", range), &range, |b, &range| {
            b.iter(|| black_box(populated(range).0.len()));
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_10x10");
    for range in RANGES {
        let (grid, map) = populated(range);

        group.bench_with_input(BenchmarkId::new("grid", range), &range, |b, &range| {
            let mut idx = RandomIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                let mut sum = 0i64;
                grid.query(Rect::from_corners(i, j, i + 9, j + 9), |_, _, v| {
                    sum += *v as i64
                });
                black_box(sum)
            });
        });
        group.bench_with_input(BenchmarkId::new("hashmap", range), &range, |b, &range| {
            let mut idx = RandomIndex::new(range);
            b.iter(|| {
                let (i, j) = idx.next();
                let mut sum = 0i64;
                for ii in i..i + 10 {
                    for jj in j..j + 10 {
                        if let Some(v) = map.get(&(ii, jj)) {
                            sum += *v as i64;
                        }
                    }
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_random_get,
    bench_sequential_get,
    bench_populate,
    bench_query
);
criterion_main!(benches);
