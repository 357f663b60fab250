//! Communication between processes
//!
//! Every phase of a decomposition talks to other processes through the [Communicator]
//! trait. [LocalCommunicator] runs all ranks inside one process (one thread per rank);
//! with the `mpi` feature, [MpiCommunicator] wraps an MPI communicator.

mod local;
#[cfg(feature = "mpi")]
mod mpi_comm;

pub use local::LocalCommunicator;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiCommunicator;

/// Plain data that can be sent between processes
#[cfg(not(feature = "mpi"))]
pub trait Payload: Copy + Default + Send + 'static {}

/// Plain data that can be sent between processes
#[cfg(feature = "mpi")]
pub trait Payload: Copy + Default + Send + 'static + mpi::datatype::Equivalence {}

impl Payload for u8 {}
impl Payload for u32 {}
impl Payload for u64 {}
impl Payload for usize {}
impl Payload for f64 {}

/// Collective communication used by the decomposition phases.
///
/// All methods are collective: every rank of the communicator must call them in the
/// same order.
pub trait Communicator {
    /// Rank of this process
    fn rank(&self) -> usize;

    /// Number of processes
    fn size(&self) -> usize;

    /// Block until every process reaches the barrier
    fn barrier(&self);

    /// Send `packets[p]` to process `p`; returns the packet received from each process.
    ///
    /// `packets` must have one entry per process. Packets may be empty.
    fn all_to_all<T: Payload>(&self, packets: Vec<Vec<T>>) -> Vec<Vec<T>>;

    /// Gather `data` from every process on every process
    fn all_gather<T: Payload>(&self, data: &[T]) -> Vec<Vec<T>> {
        self.all_to_all(vec![data.to_vec(); self.size()])
    }

    /// Sum of a value over all processes
    fn all_reduce_sum(&self, value: usize) -> usize {
        self.all_gather(&[value]).into_iter().flatten().sum()
    }

    /// Maximum of a value over all processes
    fn all_reduce_max(&self, value: usize) -> usize {
        self.all_gather(&[value])
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(value)
    }
}

/// Offsets of consecutive blocks with the given lengths
#[cfg_attr(not(feature = "mpi"), allow(dead_code))]
pub(crate) fn displacements(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .scan(0, |offset, count| {
            let start = *offset;
            *offset += count;
            Some(start)
        })
        .collect()
}
