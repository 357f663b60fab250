use criterion::{black_box, criterion_group, criterion_main, Criterion};
use peridecomp::comm::LocalCommunicator;
use peridecomp::neighbourhood::{search, Horizon, PointSet};
use peridecomp::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
use peridecomp::{Decomposition, DecompositionOptions};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn random_points(npoints: usize) -> PointSet {
    let mut rng = StdRng::seed_from_u64(0);
    let between = Uniform::from(0.0_f64..1.0_f64);
    let mut points = PointSet::default();
    for id in 0..npoints {
        points.push(
            id,
            [
                between.sample(&mut rng),
                between.sample(&mut rng),
                between.sample(&mut rng),
            ],
        );
    }
    points
}

pub fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    for npoints in [10_000, 100_000] {
        let points = random_points(npoints);
        let horizon = Horizon::new(3.0 / (npoints as f64).cbrt()).unwrap();
        group.bench_function(format!("Neighbour search of {npoints} random points"), |b| {
            b.iter(|| black_box(search(&points, &points, horizon)))
        });
    }
    group.finish();
}

pub fn decomposition_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decomposition");
    group.sample_size(10);

    let spec = Spec1D::new(30, 0.0, 1.0);
    for num_procs in [1, 4] {
        let generator =
            TensorProductGenerator::new(num_procs, [spec, spec, spec], DomainShape::Box).unwrap();
        let options = DecompositionOptions::default();
        group.bench_function(
            format!("Decomposition of 30^3 points over {num_procs} processes"),
            |b| {
                b.iter(|| {
                    black_box(LocalCommunicator::run(num_procs, |comm| {
                        Decomposition::new(&generator, 3.0 * spec.cell_size(), &options, comm)
                            .unwrap()
                            .neighbour_count_total()
                    }))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, search_benchmark, decomposition_benchmark);
criterion_main!(benches);
