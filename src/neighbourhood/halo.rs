//! Exchange of halo candidates between processes

use super::{Horizon, PointSet};
use crate::comm::Communicator;
use crate::discretization::Discretization;
use crate::types::BoundingBox;
use log::debug;
use std::collections::HashMap;

// id, x, y, z
const RECORD_LENGTH: usize = 4;

/// Send every process the owned points that lie within one horizon of its bounding box.
///
/// Returns the received points and, for each received id, the process that sent it.
pub(super) fn exchange_candidates<C: Communicator>(
    discretization: &Discretization,
    horizon: Horizon,
    comm: &C,
) -> (PointSet, HashMap<usize, usize>) {
    let rank = comm.rank();
    let size = comm.size();
    let h2 = horizon.squared();

    let boxes = comm
        .all_gather(&discretization.bounding_box().to_array())
        .iter()
        .map(|b| BoundingBox::from_slice(b))
        .collect::<Vec<_>>();

    // One record per point: the id and the bits of x, y, z
    let mut packets = vec![vec![]; size];
    let mut sent = 0;
    for p in discretization.points() {
        for (other, bounds) in boxes.iter().enumerate() {
            if other != rank && bounds.distance_squared(p.coordinate()) <= h2 {
                let [x, y, z] = *p.coordinate();
                packets[other].extend_from_slice(&[
                    p.id() as u64,
                    x.to_bits(),
                    y.to_bits(),
                    z.to_bits(),
                ]);
                sent += 1;
            }
        }
    }
    debug!("Rank {rank}: sending {sent} halo candidates");

    let received = comm.all_to_all(packets);

    let mut halo = PointSet::default();
    let mut owners = HashMap::new();
    for (source, records) in received.iter().enumerate() {
        assert_eq!(records.len() % RECORD_LENGTH, 0);
        for r in records.chunks_exact(RECORD_LENGTH) {
            let id = r[0] as usize;
            halo.push(
                id,
                [f64::from_bits(r[1]), f64::from_bits(r[2]), f64::from_bits(r[3])],
            );
            owners.insert(id, source);
        }
    }
    (halo, owners)
}
