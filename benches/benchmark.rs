//! Benchmarks of the two numerical stages of a run: integrating the
//! equations of motion, and mapping the trajectory to bob positions.
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use double_pendulum::{
    core::ode_solvers::DormandPrince,
    pendulum::{
        geometry::map_trajectory,
        physics::{PendulumState, PhysicalParameters},
        solver::solve_trajectory,
        time_grid::TimeGrid,
    },
};

fn benchmark(c: &mut Criterion) {
    let params = PhysicalParameters::default();
    let initial = PendulumState::default();
    let grid = TimeGrid::new(20.0, 600).unwrap();
    let integrator = DormandPrince::default();

    c.bench_function("solve_trajectory_export_preset", |b| {
        b.iter(|| solve_trajectory(black_box(&params), &initial, &grid, &integrator).unwrap());
    });

    let trajectory = solve_trajectory(&params, &initial, &grid, &integrator).unwrap();
    c.bench_function("map_trajectory_export_preset", |b| {
        b.iter(|| map_trajectory(black_box(&params), &trajectory));
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
