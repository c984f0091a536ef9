//! Benchmarks for the stack solver and sleeve sizing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rotor_stress::prelude::*;

fn create_rotor_stack() -> Stack {
    Stack::from_thicknesses(&[
        ("Shaft", 5e-3, Material::structural_steel()),
        ("Core", 117e-3, Material::electrical_steel()),
        ("Magnets", 3e-3, Material::ndfeb()),
        ("Sleeve", 1e-3, Material::carbon_fiber_sleeve()),
    ])
    .unwrap()
}

fn create_ring_stack(rings: usize) -> Stack {
    let bands: Vec<(&str, f64, Material)> = (0..rings)
        .map(|i| {
            let material = if i % 2 == 0 {
                Material::structural_steel()
            } else {
                Material::electrical_steel()
            };
            ("Ring", 2e-3, material)
        })
        .collect();
    Stack::from_thicknesses(&bands).unwrap()
}

fn create_sleeve_sizer() -> SleeveSizer {
    let inner = Stack::from_thicknesses(&[
        ("Shaft", 5e-3, Material::structural_steel()),
        ("Core", 117e-3, Material::electrical_steel()),
        ("Magnets", 3e-3, Material::ndfeb()),
    ])
    .unwrap();
    let problem = SleeveProblem::new(
        inner,
        Material::carbon_fiber_sleeve(),
        StressLimits::new(-100e6, 1300e6, 0.0, 80e6).unwrap(),
        OperatingPoint::from_rpm(10_000.0, 10.0).unwrap(),
    );
    SleeveSizer::new(problem, SizerOptions::default()).unwrap()
}

fn benchmark_rotor_solve(c: &mut Criterion) {
    let stack = create_rotor_stack();
    let op = OperatingPoint::from_rpm(10_000.0, 10.0).unwrap();
    let solver = StackSolver::default();
    c.bench_function("rotor_4layer_solve", |b| {
        b.iter(|| {
            let solution = solver.solve(black_box(&stack), &op).unwrap();
            black_box(solution);
        })
    });
}

fn benchmark_many_rings(c: &mut Criterion) {
    let stack = create_ring_stack(50);
    let op = OperatingPoint::from_rpm(3_000.0, 40.0).unwrap();
    let solver = StackSolver::default();
    c.bench_function("rings_50layer_solve", |b| {
        b.iter(|| {
            let solution = solver.solve(black_box(&stack), &op).unwrap();
            black_box(solution);
        })
    });
}

fn benchmark_constrained_sizing(c: &mut Criterion) {
    let sizer = create_sleeve_sizer();
    c.bench_function("sleeve_constrained_minimization", |b| {
        b.iter(|| {
            let design = sizer.size(&ConstrainedMinimization).unwrap();
            black_box(design);
        })
    });
}

fn benchmark_staged_sizing(c: &mut Criterion) {
    let sizer = create_sleeve_sizer();
    c.bench_function("sleeve_staged_search", |b| {
        b.iter(|| {
            let design = sizer.size(&StagedSearch).unwrap();
            black_box(design);
        })
    });
}

criterion_group!(
    benches,
    benchmark_rotor_solve,
    benchmark_many_rings,
    benchmark_constrained_sizing,
    benchmark_staged_sizing,
);

criterion_main!(benches);
