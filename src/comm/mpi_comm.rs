//! MPI communicator

use super::{displacements, Communicator, Payload};
use mpi::collective::CommunicatorCollectives;
use mpi::datatype::{Partition, PartitionMut};
use mpi::Count;

/// Adapter running the decomposition collectives over an MPI communicator
pub struct MpiCommunicator<'a, C: mpi::topology::Communicator> {
    comm: &'a C,
}

impl<'a, C: mpi::topology::Communicator> MpiCommunicator<'a, C> {
    /// Wrap an MPI communicator
    pub fn new(comm: &'a C) -> Self {
        Self { comm }
    }

    /// The wrapped MPI communicator
    pub fn comm(&self) -> &'a C {
        self.comm
    }
}

impl<'a, C: mpi::topology::Communicator> Communicator for MpiCommunicator<'a, C> {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn barrier(&self) {
        self.comm.barrier();
    }

    fn all_to_all<T: Payload>(&self, packets: Vec<Vec<T>>) -> Vec<Vec<T>> {
        let size = self.size();
        assert_eq!(packets.len(), size);

        // Exchange packet sizes first so that every process can allocate its receive buffer
        let send_counts = packets.iter().map(|p| p.len() as Count).collect::<Vec<_>>();
        let mut recv_counts = vec![0 as Count; size];
        self.comm
            .all_to_all_into(&send_counts[..], &mut recv_counts[..]);

        let send_lengths = send_counts.iter().map(|c| *c as usize).collect::<Vec<_>>();
        let recv_lengths = recv_counts.iter().map(|c| *c as usize).collect::<Vec<_>>();
        let send_displs = displacements(&send_lengths)
            .into_iter()
            .map(|d| d as Count)
            .collect::<Vec<_>>();
        let recv_displs = displacements(&recv_lengths)
            .into_iter()
            .map(|d| d as Count)
            .collect::<Vec<_>>();

        let send_buffer = packets.into_iter().flatten().collect::<Vec<T>>();
        let mut recv_buffer = vec![T::default(); recv_lengths.iter().sum()];

        {
            let send_partition = Partition::new(&send_buffer[..], &send_counts[..], &send_displs[..]);
            let mut recv_partition =
                PartitionMut::new(&mut recv_buffer[..], &recv_counts[..], &recv_displs[..]);
            self.comm
                .all_to_all_varcount_into(&send_partition, &mut recv_partition);
        }

        let mut received = Vec::with_capacity(size);
        let mut remaining = recv_buffer.as_slice();
        for length in recv_lengths {
            let (packet, rest) = remaining.split_at(length);
            received.push(packet.to_vec());
            remaining = rest;
        }
        received
    }
}
