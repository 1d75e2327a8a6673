//! Benchmarks for maze generation and BFS goal placement.
//!
//! Run with: cargo bench --bench generation

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mazeforge::{
    bfs_farthest, BfsEngine, EndlessConfig, EndlessMaze, GenerationConfig, MapGenerator,
    Mulberry32, PacmanConfig, Position,
};
use std::collections::HashSet;

fn benchmark_finite_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("finite_maze");

    for side in [41usize, 201, 801] {
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_function(format!("{side}x{side}_with_goals"), |b| {
            b.iter(|| {
                let mut generator = MapGenerator::new(side, side, GenerationConfig::new(42));
                generator.generate_maze().ok();
                black_box(generator.auto_place_goals().ok().copied())
            });
        });
    }

    group.bench_function("201x201_pacmanized", |b| {
        b.iter(|| {
            let mut generator = MapGenerator::new(201, 201, GenerationConfig::new(7));
            generator.generate_maze().ok();
            black_box(generator.pacmanize_map(&PacmanConfig::default()).ok())
        });
    });

    group.finish();
}

fn benchmark_bfs(c: &mut Criterion) {
    let mut generator = MapGenerator::new(401, 401, GenerationConfig::new(3));
    let Ok(grid) = generator.generate_maze().cloned() else {
        return;
    };
    let avoid = HashSet::new();
    let start = Position::new(1, 1);

    let mut group = c.benchmark_group("bfs");
    group.bench_function("dense_reused_engine", |b| {
        let mut engine = BfsEngine::new();
        let mut rng = Mulberry32::new(1);
        b.iter(|| black_box(engine.farthest(&grid, start, &avoid, None, &mut rng)));
    });
    group.bench_function("sparse_capped", |b| {
        let mut rng = Mulberry32::new(1);
        b.iter(|| black_box(bfs_farthest(&grid, start, &avoid, Some(2_000), &mut rng)));
    });
    group.finish();
}

fn benchmark_endless(c: &mut Criterion) {
    let mut group = c.benchmark_group("endless");
    group.bench_function("viewport_128x128_cold", |b| {
        b.iter(|| {
            let mut maze = EndlessMaze::new(EndlessConfig::new(17, 42)).ok();
            black_box(maze.as_mut().map(|maze| maze.viewport(-64, -64, 128, 128)))
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_finite_generation, benchmark_bfs, benchmark_endless);
criterion_main!(benches);
