//! In-process communicator

use super::{Communicator, Payload};
use std::any::Any;
use std::panic;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

type Mailbox = Mutex<Vec<Option<Box<dyn Any + Send>>>>;

struct World {
    size: usize,
    sync: Mutex<SyncState>,
    released: Condvar,
    // mailboxes[destination][source]
    mailboxes: Vec<Mailbox>,
}

#[derive(Default)]
struct SyncState {
    arrived: usize,
    generation: usize,
    aborted: bool,
}

/// Panic payload of ranks released from a barrier because another rank panicked
struct Aborted;

/// Aborts the world if its rank unwinds
struct AbortOnPanic<'a>(&'a World);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// A communicator whose ranks are threads of the current process.
///
/// Packets are moved between threads without copying. [LocalCommunicator::serial] is a
/// world with a single rank, so every collective is a local no-op.
pub struct LocalCommunicator {
    rank: usize,
    world: Arc<World>,
}

impl LocalCommunicator {
    /// A communicator with one rank
    pub fn serial() -> Self {
        Self {
            rank: 0,
            world: Arc::new(World::new(1)),
        }
    }

    /// Create the communicators for all ranks of a world of `size` processes
    pub fn world(size: usize) -> Vec<Self> {
        assert!(size > 0, "A communicator needs at least one rank");
        let world = Arc::new(World::new(size));
        (0..size)
            .map(|rank| Self {
                rank,
                world: Arc::clone(&world),
            })
            .collect()
    }

    /// Run `f` on `size` ranks, each on its own thread, and return the results in rank order.
    ///
    /// `f` must call the collectives in the same order on every rank, as it would under MPI.
    pub fn run<R, F>(size: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&LocalCommunicator) -> R + Sync,
    {
        let comms = Self::world(size);
        let f = &f;
        thread::scope(|scope| {
            let handles = comms
                .iter()
                .map(|comm| {
                    scope.spawn(move || {
                        let _guard = AbortOnPanic(&comm.world);
                        f(comm)
                    })
                })
                .collect::<Vec<_>>();

            // Report the panic that aborted the world, not the ranks it released
            let mut results = Vec::with_capacity(size);
            let mut failure: Option<Box<dyn Any + Send>> = None;
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(payload) => {
                        if failure.as_ref().map_or(true, |first| first.is::<Aborted>()) {
                            failure = Some(payload);
                        }
                    }
                }
            }
            if let Some(payload) = failure {
                panic::resume_unwind(payload);
            }
            results
        })
    }
}

impl World {
    fn new(size: usize) -> Self {
        Self {
            size,
            sync: Mutex::new(SyncState::default()),
            released: Condvar::new(),
            mailboxes: (0..size)
                .map(|_| Mutex::new((0..size).map(|_| None).collect()))
                .collect(),
        }
    }

    /// Block until all ranks arrive. Unwinds with [Aborted] if the world is aborted.
    fn wait(&self) {
        let mut state = self.sync.lock().unwrap_or_else(PoisonError::into_inner);
        if state.aborted {
            drop(state);
            panic::panic_any(Aborted);
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return;
        }
        while state.generation == generation && !state.aborted {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation == generation {
            drop(state);
            panic::panic_any(Aborted);
        }
    }

    fn abort(&self) {
        let mut state = self.sync.lock().unwrap_or_else(PoisonError::into_inner);
        state.aborted = true;
        self.released.notify_all();
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.world.size
    }

    fn barrier(&self) {
        self.world.wait();
    }

    fn all_to_all<T: Payload>(&self, packets: Vec<Vec<T>>) -> Vec<Vec<T>> {
        assert_eq!(packets.len(), self.size());

        for (destination, packet) in packets.into_iter().enumerate() {
            let mut mailbox = self.world.mailboxes[destination]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            mailbox[self.rank] = Some(Box::new(packet));
        }

        self.barrier();

        let received = {
            let mut mailbox = self.world.mailboxes[self.rank]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            mailbox
                .iter_mut()
                .map(|slot| match slot.take().map(|packet| packet.downcast::<Vec<T>>()) {
                    Some(Ok(packet)) => *packet,
                    Some(Err(_)) => panic!("Ranks called all_to_all with different payload types"),
                    None => panic!("Missing packet in all_to_all"),
                })
                .collect()
        };

        // Nobody may post the next round until every rank has emptied its mailbox
        self.barrier();

        received
    }
}
