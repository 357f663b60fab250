//! Load balancing
//!
//! Points are redistributed with recursive coordinate bisection ([rcb::partition]). The
//! partition is computed as a pure function of the global point set, so every process
//! derives the same assignment without further communication.

pub mod rcb;

use crate::comm::Communicator;
use crate::discretization::Discretization;
use crate::types::{Error, Point, Result};
use itertools::izip;
use log::{debug, info};

// id, x, y, z, volume
const VALUES_PER_POINT: usize = 4;

/// Redistribute the points so that every process owns a near-equal share.
///
/// Collective. Each process returns the points it owns after balancing, sorted by id.
/// Fails with [Error::UnderPopulatedPartition] if there are more processes than points.
pub fn balance<C: Communicator>(discretization: &Discretization, comm: &C) -> Result<Discretization> {
    let rank = comm.rank();
    let size = comm.size();
    if discretization.num_procs() != size || discretization.rank() != rank {
        return Err(Error::InvalidConfiguration(format!(
            "Discretization of rank {} of {} used on rank {rank} of {size}",
            discretization.rank(),
            discretization.num_procs()
        )));
    }

    let global_count = comm.all_reduce_sum(discretization.owned_count());
    if size > global_count {
        return Err(Error::UnderPopulatedPartition {
            processes: size,
            points: global_count,
        });
    }

    let points = gather_points(discretization, comm);
    debug!("Rank {rank}: gathered {} points for bisection", points.len());

    let owners = rcb::partition(&points, size)?;
    let owned = points
        .iter()
        .zip(&owners)
        .filter(|(_, owner)| **owner == rank)
        .map(|(p, _)| p.with_owner(rank))
        .collect::<Vec<_>>();

    info!(
        "Rank {rank}: owns {} of {global_count} points after balancing (was {})",
        owned.len(),
        discretization.owned_count()
    );

    Discretization::new(rank, size, global_count, owned)
}

/// Collect the points of every process, ordered by id
fn gather_points<C: Communicator>(discretization: &Discretization, comm: &C) -> Vec<Point> {
    let ids = discretization.ids();
    let values = discretization
        .points()
        .iter()
        .flat_map(|p| {
            let [x, y, z] = *p.coordinate();
            [x, y, z, p.volume()]
        })
        .collect::<Vec<_>>();

    let all_ids = comm.all_gather(&ids);
    let all_values = comm.all_gather(&values);

    let mut points = Vec::new();
    for (owner, (ids, values)) in izip!(all_ids, all_values).enumerate() {
        assert_eq!(ids.len() * VALUES_PER_POINT, values.len());
        for (id, v) in ids.iter().zip(values.chunks_exact(VALUES_PER_POINT)) {
            points.push(Point::new(*id, [v[0], v[1], v[2]], v[3], owner));
        }
    }
    points.sort_by_key(|p| p.id());
    points
}
