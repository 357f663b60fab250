//! Horizon neighbourhoods
//!
//! For every owned point, find all points within the horizon. Candidates are bucketed in
//! a [CellList] with cells at least one horizon wide, so each query only inspects the
//! few cells around the query point.

mod cell_list;
mod halo;

pub use cell_list::CellList;

use crate::comm::Communicator;
use crate::discretization::Discretization;
use crate::types::{distance_squared, Error, Result};
use log::{info, warn};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use std::collections::HashMap;

/// The interaction radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon(f64);

impl Horizon {
    /// Create a horizon. Fails with [Error::InvalidHorizon] unless `value` is positive and finite.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidHorizon(value))
        }
    }

    /// The radius
    pub fn value(&self) -> f64 {
        self.0
    }

    /// The squared radius
    pub fn squared(&self) -> f64 {
        self.0 * self.0
    }
}

/// Neighbour ids of a sequence of points, stored row by row.
///
/// Each row is sorted by global id and never contains the point itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighbourList {
    offsets: Vec<usize>,
    neighbours: Vec<usize>,
}

impl NeighbourList {
    /// Build from one list per point
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        offsets.push(0);
        let mut neighbours = Vec::with_capacity(rows.iter().map(|r| r.len()).sum());
        for row in rows {
            neighbours.extend(row);
            offsets.push(neighbours.len());
        }
        Self {
            offsets,
            neighbours,
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbours of point `index`
    pub fn neighbours(&self, index: usize) -> &[usize] {
        &self.neighbours[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Number of neighbours of point `index`
    pub fn count(&self, index: usize) -> usize {
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Number of neighbours summed over all points
    pub fn total(&self) -> usize {
        self.neighbours.len()
    }

    /// Iterate over the rows
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets.windows(2).map(|w| &self.neighbours[w[0]..w[1]])
    }

    /// Apply `f` to every neighbour entry, keeping the row structure
    pub fn try_map<F: FnMut(usize) -> Result<usize>>(&self, mut f: F) -> Result<Self> {
        Ok(Self {
            offsets: self.offsets.clone(),
            neighbours: self
                .neighbours
                .iter()
                .map(|n| f(*n))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Points identified by global id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    ids: Vec<usize>,
    coordinates: Vec<[f64; 3]>,
}

impl PointSet {
    /// Create from matching ids and coordinates
    pub fn new(ids: Vec<usize>, coordinates: Vec<[f64; 3]>) -> Self {
        assert_eq!(ids.len(), coordinates.len());
        Self { ids, coordinates }
    }

    /// Add a point
    pub fn push(&mut self, id: usize, coordinate: [f64; 3]) {
        self.ids.push(id);
        self.coordinates.push(coordinate);
    }

    /// Append all points of another set
    pub fn extend(&mut self, other: &PointSet) {
        self.ids.extend_from_slice(&other.ids);
        self.coordinates.extend_from_slice(&other.coordinates);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Global ids
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Coordinates
    pub fn coordinates(&self) -> &[[f64; 3]] {
        &self.coordinates
    }
}

impl From<&Discretization> for PointSet {
    fn from(discretization: &Discretization) -> Self {
        Self::new(discretization.ids(), discretization.coordinates())
    }
}

/// For every target, the ids of all candidates within the horizon.
///
/// A candidate with the same id as the target is never reported. The distance test is
/// `|x - y|^2 <= h^2`, so points exactly one horizon apart are neighbours. Rows are
/// sorted by id. Targets are processed in parallel.
pub fn search(targets: &PointSet, candidates: &PointSet, horizon: Horizon) -> NeighbourList {
    let cells = CellList::new(candidates.coordinates(), horizon.value());
    let h2 = horizon.squared();

    let rows = targets
        .coordinates()
        .par_iter()
        .zip(targets.ids().par_iter())
        .map(|(x, id)| {
            let mut row = vec![];
            cells.for_each_candidate(x, horizon.value(), |j| {
                let candidate = candidates.ids()[j];
                if candidate != *id && distance_squared(x, &candidates.coordinates()[j]) <= h2 {
                    row.push(candidate);
                }
            });
            row.sort_unstable();
            row.dedup();
            row
        })
        .collect::<Vec<_>>();

    NeighbourList::from_rows(rows)
}

/// Reference implementation of [search] comparing every target with every candidate
pub fn brute_force(targets: &PointSet, candidates: &PointSet, horizon: Horizon) -> NeighbourList {
    let h2 = horizon.squared();
    let rows = targets
        .coordinates()
        .iter()
        .zip(targets.ids())
        .map(|(x, id)| {
            let mut row = candidates
                .coordinates()
                .iter()
                .zip(candidates.ids())
                .filter(|(y, candidate)| *candidate != id && distance_squared(x, y) <= h2)
                .map(|(_, candidate)| *candidate)
                .collect::<Vec<_>>();
            row.sort_unstable();
            row.dedup();
            row
        })
        .collect();
    NeighbourList::from_rows(rows)
}

/// Neighbour lists of the owned points of one process
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbourhood {
    horizon: Horizon,
    lists: NeighbourList,
    remote_owners: HashMap<usize, usize>,
}

impl Neighbourhood {
    /// Create from neighbour lists and the owning process of every remote id they reference
    pub fn new(horizon: Horizon, lists: NeighbourList, remote_owners: HashMap<usize, usize>) -> Self {
        Self {
            horizon,
            lists,
            remote_owners,
        }
    }

    /// The horizon used for the search
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Neighbour lists, one row per owned point in local order
    pub fn lists(&self) -> &NeighbourList {
        &self.lists
    }

    /// The process owning a remote neighbour, if known
    pub fn owner(&self, id: usize) -> Option<usize> {
        self.remote_owners.get(&id).copied()
    }

    /// Consume into the neighbour lists
    pub fn into_lists(self) -> NeighbourList {
        self.lists
    }
}

/// Build the neighbour lists of the owned points of every process.
///
/// Collective. Each process receives from the others the points lying within one horizon
/// of its bounding box, searches its owned points against owned plus received points, and
/// remembers which process sent each remote point that ended up in a list. The received
/// coordinates are dropped; the ghost exchange imports the authoritative ones.
pub fn build<C: Communicator>(
    discretization: &Discretization,
    horizon: Horizon,
    comm: &C,
) -> Result<Neighbourhood> {
    let rank = comm.rank();
    let owned = PointSet::from(discretization);
    let (halo, halo_owners) = halo::exchange_candidates(discretization, horizon, comm);

    let mut candidates = owned.clone();
    candidates.extend(&halo);
    let lists = search(&owned, &candidates, horizon);

    let mut remote_owners = HashMap::new();
    for id in lists.iter().flatten() {
        if discretization.find(*id).is_none() {
            if let Some(owner) = halo_owners.get(id) {
                remote_owners.insert(*id, *owner);
            }
        }
    }

    info!(
        "Rank {rank}: {} neighbour entries for {} owned points ({} halo candidates, {} remote neighbours)",
        lists.total(),
        lists.len(),
        halo.len(),
        remote_owners.len()
    );
    if lists.total() == 0 && discretization.global_count() > 1 {
        warn!(
            "Rank {rank}: horizon {} is smaller than the point spacing; all neighbourhoods are empty",
            horizon.value()
        );
    }

    Ok(Neighbourhood::new(horizon, lists, remote_owners))
}
