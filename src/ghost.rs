//! Ghost points
//!
//! A ghost is a point referenced by a local neighbour list but owned by another process.
//! [exchange] imports the ghosts' coordinates from their owners in a single
//! request/response round: each process sends every owner the ids it needs, and each
//! owner answers with the data of the requested points it holds.

use crate::comm::Communicator;
use crate::discretization::Discretization;
use crate::neighbourhood::{NeighbourList, Neighbourhood};
use crate::types::{Error, Result};
use itertools::{izip, Itertools};
use log::info;

// found, index, x, y, z, volume
const RECORD_LENGTH: usize = 6;

/// Remote points imported to the local process, sorted by global id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GhostSet {
    ids: Vec<usize>,
    owners: Vec<usize>,
    remote_indices: Vec<usize>,
    coordinates: Vec<[f64; 3]>,
    volumes: Vec<f64>,
}

impl GhostSet {
    /// Number of ghost points
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Are there no ghost points?
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Global ids
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Owning process of ghost `index`
    pub fn owner(&self, index: usize) -> usize {
        self.owners[index]
    }

    /// Local index of ghost `index` on its owning process
    pub fn remote_index(&self, index: usize) -> usize {
        self.remote_indices[index]
    }

    /// Coordinates, bit-identical to the owner's
    pub fn coordinates(&self) -> &[[f64; 3]] {
        &self.coordinates
    }

    /// Cell volumes
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Position of the ghost with global id `id`
    pub fn find(&self, id: usize) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }
}

/// The ids referenced by `lists` that `discretization` does not own, sorted and unique
pub fn required_ids(lists: &NeighbourList, discretization: &Discretization) -> Vec<usize> {
    lists
        .iter()
        .flatten()
        .filter(|id| discretization.find(**id).is_none())
        .copied()
        .sorted_unstable()
        .dedup()
        .collect()
}

/// Import the coordinates of every remote neighbour.
///
/// Collective. Fails with [Error::DanglingReference] on every process if any process
/// references an id whose owner is unknown or whose owner does not hold it.
pub fn exchange<C: Communicator>(
    discretization: &Discretization,
    neighbourhood: &Neighbourhood,
    comm: &C,
) -> Result<GhostSet> {
    let rank = comm.rank();
    let size = comm.size();

    let mut dangling = None;
    let mut requests = vec![vec![]; size];
    for id in required_ids(neighbourhood.lists(), discretization) {
        match neighbourhood.owner(id) {
            Some(owner) if owner < size && owner != rank => requests[owner].push(id),
            _ => {
                dangling.get_or_insert(id);
            }
        }
    }

    let incoming = comm.all_to_all(requests.clone());

    // One record per request: found flag, local index, and the bits of x, y, z, volume
    let mut responses = vec![vec![]; size];
    for (source, ids) in incoming.iter().enumerate() {
        for id in ids {
            let record = match discretization.find(*id) {
                Some(index) => {
                    let p = &discretization.points()[index];
                    let [x, y, z] = *p.coordinate();
                    [
                        1,
                        index as u64,
                        x.to_bits(),
                        y.to_bits(),
                        z.to_bits(),
                        p.volume().to_bits(),
                    ]
                }
                None => [0; RECORD_LENGTH],
            };
            responses[source].extend_from_slice(&record);
        }
    }

    let responses = comm.all_to_all(responses);

    let mut entries = vec![];
    for (owner, (ids, records)) in izip!(&requests, &responses).enumerate() {
        assert_eq!(ids.len() * RECORD_LENGTH, records.len());
        for (id, r) in izip!(ids, records.chunks_exact(RECORD_LENGTH)) {
            if r[0] == 1 {
                let x = [
                    f64::from_bits(r[2]),
                    f64::from_bits(r[3]),
                    f64::from_bits(r[4]),
                ];
                entries.push((*id, owner, r[1] as usize, x, f64::from_bits(r[5])));
            } else {
                dangling.get_or_insert(*id);
            }
        }
    }

    // Every process fails together so that none is left waiting in a later collective
    let reported = comm
        .all_gather(&[dangling.unwrap_or(usize::MAX)])
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(usize::MAX);
    if reported != usize::MAX {
        return Err(Error::DanglingReference {
            id: dangling.unwrap_or(reported),
        });
    }

    entries.sort_unstable_by_key(|e| e.0);
    let mut ghosts = GhostSet::default();
    for (id, owner, index, x, volume) in entries {
        ghosts.ids.push(id);
        ghosts.owners.push(owner);
        ghosts.remote_indices.push(index);
        ghosts.coordinates.push(x);
        ghosts.volumes.push(volume);
    }

    info!(
        "Rank {rank}: imported {} ghost points from {} processes",
        ghosts.len(),
        requests.iter().filter(|r| !r.is_empty()).count()
    );

    Ok(ghosts)
}
