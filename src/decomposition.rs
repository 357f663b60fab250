//! Decomposition of a domain over processes
//!
//! A [Decomposition] is the result of running the four phases on one process: the
//! points it owns after balancing, their neighbour lists, and the ghost points those
//! lists reference. Points are addressed by a local index: owned points come first,
//! sorted by global id, followed by the ghosts, also sorted by global id.

use crate::balance::balance;
use crate::comm::{Communicator, LocalCommunicator};
use crate::discretization::Discretization;
use crate::ghost::{self, GhostSet};
use crate::neighbourhood::{self, Horizon, NeighbourList};
use crate::quick_grid::TensorProductGenerator;
use crate::types::{Error, Ownership, Result};
use log::info;
use std::collections::HashMap;

/// Options for building a decomposition
#[derive(Debug, Clone)]
pub struct DecompositionOptions {
    /// Redistribute the generated points with recursive coordinate bisection
    balance: bool,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        Self { balance: true }
    }
}

impl DecompositionOptions {
    /// Enable or disable load balancing
    pub fn set_balance(&mut self, balance: bool) {
        self.balance = balance;
    }

    /// Is load balancing enabled?
    pub fn balance(&self) -> bool {
        self.balance
    }
}

/// The part of a decomposed domain stored on one process
#[derive(Debug, Clone)]
pub struct Decomposition {
    rank: usize,
    num_procs: usize,
    global_count: usize,
    owned_count: usize,
    horizon: Horizon,
    ids: Vec<usize>,
    coordinates: Vec<f64>,
    volumes: Vec<f64>,
    ownership: Vec<Ownership>,
    local_indices: HashMap<usize, usize>,
    neighbours: NeighbourList,
    local_neighbours: NeighbourList,
}

impl Decomposition {
    /// Generate, balance, and connect the points of a domain.
    ///
    /// Collective. The horizon and the process count are checked before any
    /// communication takes place.
    pub fn new<C: Communicator>(
        generator: &TensorProductGenerator,
        horizon: f64,
        options: &DecompositionOptions,
        comm: &C,
    ) -> Result<Self> {
        let horizon = Horizon::new(horizon)?;
        if generator.num_procs() != comm.size() {
            return Err(Error::InvalidConfiguration(format!(
                "Points generated for {} processes cannot be decomposed over {}",
                generator.num_procs(),
                comm.size()
            )));
        }
        if generator.global_count() < comm.size() {
            return Err(Error::UnderPopulatedPartition {
                processes: comm.size(),
                points: generator.global_count(),
            });
        }
        let owned = generator.discretization(comm.rank())?;
        Self::build(owned, horizon, options, comm)
    }

    /// Balance and connect points that are already distributed over the processes.
    ///
    /// Collective.
    pub fn from_discretization<C: Communicator>(
        owned: Discretization,
        horizon: f64,
        options: &DecompositionOptions,
        comm: &C,
    ) -> Result<Self> {
        let horizon = Horizon::new(horizon)?;
        Self::build(owned, horizon, options, comm)
    }

    /// Decompose a domain on a single process
    pub fn serial(generator: &TensorProductGenerator, horizon: f64) -> Result<Self> {
        Self::new(
            generator,
            horizon,
            &DecompositionOptions::default(),
            &LocalCommunicator::serial(),
        )
    }

    fn build<C: Communicator>(
        owned: Discretization,
        horizon: Horizon,
        options: &DecompositionOptions,
        comm: &C,
    ) -> Result<Self> {
        let rank = comm.rank();
        let owned = if options.balance() {
            balance(&owned, comm)?
        } else {
            owned
        };
        let neighbourhood = neighbourhood::build(&owned, horizon, comm)?;
        let ghosts = ghost::exchange(&owned, &neighbourhood, comm)?;
        let decomposition = Self::assemble(&owned, ghosts, neighbourhood.into_lists(), horizon)?;

        info!(
            "Rank {rank}: decomposition holds {} owned and {} ghost points, {} neighbour entries",
            decomposition.owned_count(),
            decomposition.ghost_count(),
            decomposition.neighbour_count_total()
        );
        Ok(decomposition)
    }

    fn assemble(
        owned: &Discretization,
        ghosts: GhostSet,
        neighbours: NeighbourList,
        horizon: Horizon,
    ) -> Result<Self> {
        let total = owned.owned_count() + ghosts.len();
        let mut ids = Vec::with_capacity(total);
        let mut coordinates = Vec::with_capacity(3 * total);
        let mut volumes = Vec::with_capacity(total);
        let mut ownership = Vec::with_capacity(total);

        for p in owned.points() {
            ids.push(p.id());
            coordinates.extend_from_slice(p.coordinate());
            volumes.push(p.volume());
            ownership.push(Ownership::Owned);
        }
        for (g, id) in ghosts.ids().iter().enumerate() {
            ids.push(*id);
            coordinates.extend_from_slice(&ghosts.coordinates()[g]);
            volumes.push(ghosts.volumes()[g]);
            ownership.push(Ownership::Ghost(ghosts.owner(g), ghosts.remote_index(g)));
        }

        let local_indices = ids
            .iter()
            .enumerate()
            .map(|(local, id)| (*id, local))
            .collect::<HashMap<_, _>>();
        let local_neighbours = neighbours.try_map(|id| {
            local_indices
                .get(&id)
                .copied()
                .ok_or(Error::DanglingReference { id })
        })?;

        Ok(Self {
            rank: owned.rank(),
            num_procs: owned.num_procs(),
            global_count: owned.global_count(),
            owned_count: owned.owned_count(),
            horizon,
            ids,
            coordinates,
            volumes,
            ownership,
            local_indices,
            neighbours,
            local_neighbours,
        })
    }

    /// Rank of this process
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of processes sharing the domain
    pub fn num_procs(&self) -> usize {
        self.num_procs
    }

    /// The horizon
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Number of points owned by this process
    pub fn owned_count(&self) -> usize {
        self.owned_count
    }

    /// Number of ghost points stored on this process
    pub fn ghost_count(&self) -> usize {
        self.ids.len() - self.owned_count
    }

    /// Number of points over all processes
    pub fn global_count(&self) -> usize {
        self.global_count
    }

    /// Coordinates of the owned and ghost points, flattened as `[x0, y0, z0, x1, ...]`
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Coordinate of the point with local index `local`
    pub fn coordinate(&self, local: usize) -> [f64; 3] {
        let x = &self.coordinates[3 * local..3 * local + 3];
        [x[0], x[1], x[2]]
    }

    /// Coordinates of the owned points, flattened
    pub fn owned_coordinates(&self) -> &[f64] {
        &self.coordinates[..3 * self.owned_count]
    }

    /// Cell volumes of the owned and ghost points
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Global ids of the owned and ghost points
    pub fn global_ids(&self) -> &[usize] {
        &self.ids
    }

    /// Global id of the point with local index `local`
    pub fn global_id(&self, local: usize) -> usize {
        self.ids[local]
    }

    /// Local index of the point with global id `id`, if it is stored on this process
    pub fn local_index(&self, id: usize) -> Option<usize> {
        self.local_indices.get(&id).copied()
    }

    /// Ownership of the point with local index `local`
    pub fn ownership(&self, local: usize) -> Ownership {
        self.ownership[local]
    }

    /// Global ids of the neighbours of owned point `local`, sorted
    pub fn neighbours(&self, local: usize) -> &[usize] {
        self.neighbours.neighbours(local)
    }

    /// Local indices of the neighbours of owned point `local`
    pub fn local_neighbours(&self, local: usize) -> &[usize] {
        self.local_neighbours.neighbours(local)
    }

    /// Neighbour lists of all owned points, by global id
    pub fn neighbour_lists(&self) -> &NeighbourList {
        &self.neighbours
    }

    /// Number of neighbour entries over all owned points
    pub fn neighbour_count_total(&self) -> usize {
        self.neighbours.total()
    }
}

#[cfg(test)]
mod test {
    use super::{Decomposition, DecompositionOptions};
    use crate::comm::{Communicator, LocalCommunicator};
    use crate::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
    use crate::types::{Error, Ownership};
    use approx::assert_relative_eq;

    fn cube(num_procs: usize, n: usize) -> TensorProductGenerator {
        let spec = Spec1D::new(n, 0.0, n as f64);
        TensorProductGenerator::new(num_procs, [spec, spec, spec], DomainShape::Box).unwrap()
    }

    #[test]
    fn test_serial() {
        let d = Decomposition::serial(&cube(1, 4), 1.1).unwrap();
        assert_eq!(d.owned_count(), 64);
        assert_eq!(d.ghost_count(), 0);
        assert_eq!(d.global_count(), 64);
        assert_eq!(d.coordinates().len(), 3 * 64);
        assert_eq!(d.coordinate(0), [0.5, 0.5, 0.5]);
        assert_relative_eq!(d.volumes()[5], 1.0);
        // Interior points see six face neighbours
        let centre = d.local_index(1 + 4 * (1 + 4)).unwrap();
        assert_eq!(d.neighbours(centre).len(), 6);
        for n in d.local_neighbours(centre) {
            assert_eq!(d.ownership(*n), Ownership::Owned);
        }
    }

    #[test]
    fn test_local_and_global_neighbours_agree() {
        let results = LocalCommunicator::run(3, |comm| {
            Decomposition::new(&cube(3, 5), 1.5, &DecompositionOptions::default(), comm).unwrap()
        });
        for d in &results {
            assert!(d.ghost_count() > 0);
            for i in 0..d.owned_count() {
                let globals = d
                    .local_neighbours(i)
                    .iter()
                    .map(|l| d.global_id(*l))
                    .collect::<Vec<_>>();
                assert_eq!(globals, d.neighbours(i));
            }
            for local in d.owned_count()..d.owned_count() + d.ghost_count() {
                match d.ownership(local) {
                    Ownership::Ghost(owner, index) => {
                        let remote = &results[owner];
                        assert_ne!(owner, d.rank());
                        assert_eq!(remote.global_id(index), d.global_id(local));
                        assert_eq!(remote.coordinate(index), d.coordinate(local));
                    }
                    Ownership::Owned => panic!("ghost {local} marked as owned"),
                }
            }
        }
    }

    #[test]
    fn test_without_balancing_keeps_slices() {
        let generator = cube(2, 4);
        let mut options = DecompositionOptions::default();
        options.set_balance(false);
        assert!(!options.balance());
        let results = LocalCommunicator::run(2, |comm| {
            Decomposition::new(&generator, 1.0, &options, comm).unwrap()
        });
        for (rank, d) in results.iter().enumerate() {
            let ids = d.global_ids()[..d.owned_count()].to_vec();
            assert_eq!(ids, generator.slice(rank).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Decomposition::serial(&cube(1, 2), 0.0),
            Err(Error::InvalidHorizon(_))
        ));
        assert!(matches!(
            Decomposition::serial(&cube(2, 2), 1.0),
            Err(Error::InvalidConfiguration(_))
        ));
        let results = LocalCommunicator::run(3, |comm| {
            let spec = Spec1D::new(2, 0.0, 2.0);
            let single = Spec1D::new(1, 0.0, 1.0);
            let generator =
                TensorProductGenerator::new(comm.size(), [spec, single, single], DomainShape::Box)
                    .unwrap();
            Decomposition::new(&generator, 1.0, &DecompositionOptions::default(), comm)
        });
        for result in results {
            assert!(matches!(
                result,
                Err(Error::UnderPopulatedPartition {
                    processes: 3,
                    points: 2
                })
            ));
        }
    }
}
