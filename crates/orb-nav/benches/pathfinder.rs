use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orb_core::{IVec3, Vec3};
use orb_nav::{GridBounds, OccupancyGrid, PathOptions, Pathfinder};

/// Ground plane plus a row of walls with staggered gaps.
fn obstacle_course(size: i32) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(GridBounds::new(
        IVec3::new(0, 0, 0),
        IVec3::new(size, 16, size),
    ));
    for x in 0..size {
        for z in 0..size {
            grid.set_block(x, 0, z);
        }
    }
    for (i, wall_x) in (8..size).step_by(8).enumerate() {
        let gap = if i % 2 == 0 { 2 } else { size - 3 };
        for y in 1..10 {
            for z in 0..size {
                if (z - gap).abs() > 1 {
                    grid.set_block(wall_x, y, z);
                }
            }
        }
    }
    grid
}

fn bench_pathfinder(c: &mut Criterion) {
    let grid = obstacle_course(64);
    let finder = Pathfinder::new(&grid);
    let start = Vec3::new(1.5, 2.5, 1.5);
    let goal = Vec3::new(62.5, 2.5, 62.5);

    let mut group = c.benchmark_group("orb-nav/pathfinder");

    let raw = PathOptions {
        smooth_path: false,
        max_iterations: 50_000,
        ..PathOptions::default()
    };
    group.bench_function("find_path_raw", |b| {
        b.iter(|| {
            let path = finder.find_path(start, goal, &raw);
            black_box(path.len());
        })
    });

    let smoothed = PathOptions {
        max_iterations: 50_000,
        ..PathOptions::default()
    };
    group.bench_function("find_path_smoothed", |b| {
        b.iter(|| {
            let path = finder.find_path(start, goal, &smoothed);
            black_box(path.len());
        })
    });

    let axis_only = PathOptions {
        allow_diagonals: false,
        smooth_path: false,
        max_iterations: 50_000,
        ..PathOptions::default()
    };
    group.bench_function("find_path_axis_only", |b| {
        b.iter(|| {
            let path = finder.find_path(start, goal, &axis_only);
            black_box(path.len());
        })
    });

    group.bench_function("line_of_sight", |b| {
        b.iter(|| black_box(finder.has_line_of_sight(start, goal)))
    });

    group.finish();
}

criterion_group!(benches, bench_pathfinder);
criterion_main!(benches);
