use peridecomp::comm::{Communicator, LocalCommunicator};
use peridecomp::neighbourhood::{brute_force, Horizon, NeighbourList, PointSet};
use peridecomp::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
use peridecomp::{Decomposition, DecompositionOptions, Error, Ownership};

fn brick(num_procs: usize) -> TensorProductGenerator {
    TensorProductGenerator::new(
        num_procs,
        [
            Spec1D::new(7, 0.0, 1.0),
            Spec1D::new(5, 0.0, 1.0),
            Spec1D::new(4, 0.0, 2.0),
        ],
        DomainShape::Box,
    )
    .unwrap()
}

fn decompose(generator: &TensorProductGenerator, horizon: f64) -> Vec<Decomposition> {
    LocalCommunicator::run(generator.num_procs(), |comm| {
        Decomposition::new(generator, horizon, &DecompositionOptions::default(), comm).unwrap()
    })
}

fn reference_lists(generator: &TensorProductGenerator, horizon: f64) -> NeighbourList {
    let all = PointSet::new(
        generator.candidates().iter().map(|p| p.id()).collect(),
        generator.candidates().iter().map(|p| *p.coordinate()).collect(),
    );
    brute_force(&all, &all, Horizon::new(horizon).unwrap())
}

#[test]
fn test_every_point_owned_exactly_once() {
    for num_procs in 1..=5 {
        let generator = brick(num_procs);
        let mut seen = vec![0; generator.global_count()];
        for d in decompose(&generator, 0.3) {
            assert_eq!(d.global_count(), 140);
            for local in 0..d.owned_count() {
                assert_eq!(d.ownership(local), Ownership::Owned);
                seen[d.global_id(local)] += 1;
            }
        }
        assert!(seen.iter().all(|s| *s == 1), "{num_procs} processes");
    }
}

#[test]
fn test_balanced_counts() {
    for num_procs in [2, 3, 4, 6, 9] {
        let counts = decompose(&brick(num_procs), 0.3)
            .iter()
            .map(|d| d.owned_count())
            .collect::<Vec<_>>();
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        assert!(max - min <= 1, "{counts:?}");
        assert_eq!(counts.iter().sum::<usize>(), 140);
    }
}

#[test]
fn test_neighbours_match_brute_force() {
    let horizon = 0.3;
    let reference = reference_lists(&brick(1), horizon);
    for num_procs in [1, 2, 4] {
        for d in decompose(&brick(num_procs), horizon) {
            for local in 0..d.owned_count() {
                assert_eq!(
                    d.neighbours(local),
                    reference.neighbours(d.global_id(local)),
                    "{num_procs} processes, point {}",
                    d.global_id(local)
                );
            }
        }
    }
}

#[test]
fn test_neighbours_are_symmetric_across_processes() {
    let results = decompose(&brick(3), 0.3);
    let rows = results
        .iter()
        .flat_map(|d| (0..d.owned_count()).map(move |i| (d.global_id(i), d.neighbours(i).to_vec())))
        .collect::<std::collections::HashMap<_, _>>();
    for (id, row) in &rows {
        assert!(!row.contains(id));
        for n in row {
            assert!(rows[n].contains(id), "{id} sees {n} but not the reverse");
        }
    }
}

#[test]
fn test_deterministic() {
    let generator = brick(4);
    let first = decompose(&generator, 0.25);
    let second = decompose(&generator, 0.25);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.global_ids(), b.global_ids());
        assert_eq!(a.neighbour_lists(), b.neighbour_lists());
    }
}

#[test]
fn test_ghost_coordinates_round_trip() {
    let generator = brick(4);
    for d in decompose(&generator, 0.3) {
        assert!(d.ghost_count() > 0);
        for local in d.owned_count()..d.owned_count() + d.ghost_count() {
            assert!(matches!(d.ownership(local), Ownership::Ghost(owner, _) if owner != d.rank()));
            let generated = generator.candidates()[d.global_id(local)].coordinate();
            let imported = d.coordinate(local);
            for n in 0..3 {
                assert_eq!(imported[n].to_bits(), generated[n].to_bits());
            }
        }
    }
}

#[test]
fn test_single_process_slender_bar() {
    let (nx, lx, lz) = (5, 1.0, 10.0);
    let nz = (lz * nx as f64 / lx) as usize;
    assert_eq!(nz, 50);
    let x = Spec1D::new(nx, -lx / 2.0 / nx as f64, lx);
    let z = Spec1D::new(nz, -lz / 2.0 / nz as f64, lz);
    let generator = TensorProductGenerator::new(1, [x, x, z], DomainShape::Box).unwrap();
    let dx = lx / nx as f64;
    let dz = lz / nz as f64;
    let horizon = 1.5 * (dx * dx + dx * dx + dz * dz).sqrt();

    let d = Decomposition::serial(&generator, horizon).unwrap();
    assert_eq!(d.owned_count(), nx * nx * nz);
    assert_eq!(d.ghost_count(), 0);
    assert_eq!(d.global_ids(), (0..nx * nx * nz).collect::<Vec<_>>());
}

#[test]
fn test_zero_horizon() {
    let results = LocalCommunicator::run(2, |comm| {
        Decomposition::new(&brick(2), 0.0, &DecompositionOptions::default(), comm)
    });
    for result in results {
        assert!(matches!(result, Err(Error::InvalidHorizon(h)) if h == 0.0));
    }
}

#[test]
fn test_more_processes_than_points() {
    let generator = TensorProductGenerator::new(
        4,
        [
            Spec1D::new(3, 0.0, 1.0),
            Spec1D::new(1, 0.0, 1.0),
            Spec1D::new(1, 0.0, 1.0),
        ],
        DomainShape::Box,
    )
    .unwrap();
    let results = LocalCommunicator::run(4, |comm| {
        assert_eq!(comm.size(), 4);
        Decomposition::new(&generator, 1.0, &DecompositionOptions::default(), comm)
    });
    for result in results {
        assert!(matches!(
            result,
            Err(Error::UnderPopulatedPartition {
                processes: 4,
                points: 3
            })
        ));
    }
}

#[test]
fn test_sphere_domain() {
    let spec = Spec1D::new(8, -1.0, 2.0);
    let generator = TensorProductGenerator::new(
        3,
        [spec, spec, spec],
        DomainShape::Sphere {
            center: [0.0; 3],
            radius: 1.0,
        },
    )
    .unwrap();
    let reference = reference_lists(&generator, 0.4);
    let results = decompose(&generator, 0.4);
    assert_eq!(
        results.iter().map(|d| d.owned_count()).sum::<usize>(),
        generator.global_count()
    );
    for d in &results {
        for local in 0..d.owned_count() {
            assert_eq!(d.neighbours(local), reference.neighbours(d.global_id(local)));
        }
    }
}
