//? mpirun -n {{NPROCESSES}} --features "mpi"

#[cfg(feature = "mpi")]
fn parallel_decomposition() {
    use mpi::collective::CommunicatorCollectives;
    use mpi::topology::Communicator;
    use peridecomp::comm::MpiCommunicator;
    use peridecomp::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
    use peridecomp::{Decomposition, DecompositionOptions};

    // Setup an MPI environment
    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let comm = MpiCommunicator::new(&world);

    let spec = Spec1D::new(20, -1.0, 2.0);
    let shape = DomainShape::Sphere {
        center: [0.0, 0.0, 0.0],
        radius: 1.0,
    };
    let generator =
        TensorProductGenerator::new(world.size() as usize, [spec, spec, spec], shape).unwrap();
    let horizon = 3.0 * spec.cell_size();

    match Decomposition::new(&generator, horizon, &DecompositionOptions::default(), &comm) {
        Ok(d) => {
            println!(
                "Rank {}: {} owned points, {} ghosts, {} neighbour entries",
                world.rank(),
                d.owned_count(),
                d.ghost_count(),
                d.neighbour_count_total()
            );
            let mut owned = 0;
            world.all_reduce_into(
                &d.owned_count(),
                &mut owned,
                mpi::collective::SystemOperation::sum(),
            );
            assert_eq!(owned, generator.global_count());
        }
        Err(e) => {
            eprintln!("Rank {}: {e}", world.rank());
            world.abort(1);
        }
    }
}

#[cfg(feature = "mpi")]
fn main() {
    parallel_decomposition()
}
#[cfg(not(feature = "mpi"))]
fn main() {}
