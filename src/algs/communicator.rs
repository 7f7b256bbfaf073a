//! Thin façade over serial, intra-process (Rayon) or inter-process (MPI) collectives.
//!
//! Payloads are *contiguous byte slices*; typed wrappers live in
//! [`collective`](crate::algs::collective). Every call is a synchronous
//! collective: all ranks of the communicator must enter the same operation in
//! the same relative order, and ordering between collectives is call order.
//! Receive layouts (`counts`, `displs`, in bytes) are only significant on the
//! root.

use crate::gather_error::GatherError;
use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Synchronous collective interface (minimal by design).
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Copy `buf` on `root` into `buf` on every other rank.
    fn broadcast_bytes(&self, root: usize, buf: &mut [u8]) -> Result<(), GatherError>;

    /// Variable-count gather: rank `r`'s `send` lands in
    /// `recv[displs[r]..displs[r] + counts[r]]` on `root`.
    fn gatherv_bytes(
        &self,
        root: usize,
        send: &[u8],
        recv: &mut [u8],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<(), GatherError>;

    /// Terminate every rank of the run after an unrecoverable error.
    fn abort(&self, err: &GatherError) -> ! {
        log::error!("rank {}/{}: aborting: {err}", self.rank(), self.size());
        std::process::abort()
    }
}

/// Root-side validation shared by all backends.
pub(crate) fn validate_root_layout(
    size: usize,
    recv_len: usize,
    counts: &[usize],
    displs: &[usize],
) -> Result<(), GatherError> {
    if counts.len() != size || displs.len() != size {
        return Err(GatherError::LayoutMismatch {
            ranks: size,
            counts: counts.len(),
            displs: displs.len(),
        });
    }
    let needed = counts
        .iter()
        .zip(displs)
        .map(|(&c, &d)| c + d)
        .max()
        .unwrap_or(0);
    if needed > recv_len {
        return Err(GatherError::DestinationTooSmall {
            what: "gather receive buffer",
            needed,
            found: recv_len,
        });
    }
    Ok(())
}

fn check_root(root: usize, size: usize) -> Result<(), GatherError> {
    if root >= size {
        Err(GatherError::InvalidRank { rank: root, size })
    } else {
        Ok(())
    }
}

/// Single-process communicator: broadcast is a no-op and gather is a direct copy.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }

    fn broadcast_bytes(&self, root: usize, _buf: &mut [u8]) -> Result<(), GatherError> {
        check_root(root, 1)
    }

    fn gatherv_bytes(
        &self,
        root: usize,
        send: &[u8],
        recv: &mut [u8],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<(), GatherError> {
        check_root(root, 1)?;
        validate_root_layout(1, recv.len(), counts, displs)?;
        if counts[0] != send.len() {
            return Err(GatherError::TopologyMismatch {
                rank: 0,
                expected: counts[0],
                found: send.len(),
            });
        }
        recv[displs[0]..displs[0] + send.len()].copy_from_slice(send);
        Ok(())
    }
}

// --- RayonComm: intra-process, one rank per thread ---
type Key = (u64, u64, usize, usize); // (group, epoch, src, dst)

static MAILBOX: Lazy<DashMap<Key, Bytes>> = Lazy::new(DashMap::new);
static NEXT_GROUP: AtomicU64 = AtomicU64::new(0);

/// One rank of an in-process group. Ranks exchange through a shared mailbox
/// keyed by group and collective epoch, so independent groups never collide.
#[derive(Debug)]
pub struct RayonComm {
    group: u64,
    rank: usize,
    size: usize,
    epoch: AtomicU64,
}

impl RayonComm {
    /// Create the `size` ranks of a fresh group.
    pub fn group(size: usize) -> Vec<RayonComm> {
        let group = NEXT_GROUP.fetch_add(1, Relaxed);
        (0..size)
            .map(|rank| RayonComm {
                group,
                rank,
                size,
                epoch: AtomicU64::new(0),
            })
            .collect()
    }

    /// Run `op` once per rank, each on its own thread of a dedicated pool,
    /// and return the per-rank results in rank order.
    pub fn run<F, R>(size: usize, op: F) -> Result<Vec<R>, GatherError>
    where
        F: Fn(&RayonComm) -> R + Sync,
        R: Send,
    {
        if size == 0 {
            return Err(GatherError::InvalidRank { rank: 0, size: 0 });
        }
        let comms = Self::group(size);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("rank-{i}"))
            .build()
            .map_err(|_| GatherError::Communication {
                op: "spawn ranks",
                code: -1,
            })?;
        Ok(pool.broadcast(|ctx| op(&comms[ctx.index()])))
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Relaxed)
    }

    fn post(&self, epoch: u64, dst: usize, payload: &[u8]) {
        MAILBOX.insert(
            (self.group, epoch, self.rank, dst),
            Bytes::copy_from_slice(payload),
        );
    }

    fn take(&self, epoch: u64, src: usize) -> Bytes {
        let key = (self.group, epoch, src, self.rank);
        loop {
            if let Some((_, bytes)) = MAILBOX.remove(&key) {
                return bytes;
            }
            std::thread::yield_now();
        }
    }
}

impl Communicator for RayonComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn broadcast_bytes(&self, root: usize, buf: &mut [u8]) -> Result<(), GatherError> {
        check_root(root, self.size)?;
        let epoch = self.next_epoch();
        log::trace!("rank {} broadcast epoch {epoch}: {} bytes", self.rank, buf.len());
        if self.rank == root {
            for dst in (0..self.size).filter(|&r| r != root) {
                self.post(epoch, dst, buf);
            }
            return Ok(());
        }
        let data = self.take(epoch, root);
        if data.len() != buf.len() {
            return Err(GatherError::TopologyMismatch {
                rank: root,
                expected: buf.len(),
                found: data.len(),
            });
        }
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn gatherv_bytes(
        &self,
        root: usize,
        send: &[u8],
        recv: &mut [u8],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<(), GatherError> {
        check_root(root, self.size)?;
        let epoch = self.next_epoch();
        log::trace!("rank {} gatherv epoch {epoch}: {} bytes", self.rank, send.len());
        if self.rank != root {
            self.post(epoch, root, send);
            return Ok(());
        }

        // drain every contribution even after an error so the group stays in step
        let mut maybe_err = validate_root_layout(self.size, recv.len(), counts, displs).err();
        for src in 0..self.size {
            let data = if src == root {
                Bytes::copy_from_slice(send)
            } else {
                self.take(epoch, src)
            };
            if maybe_err.is_some() {
                continue;
            }
            if data.len() != counts[src] {
                maybe_err = Some(GatherError::TopologyMismatch {
                    rank: src,
                    expected: counts[src],
                    found: data.len(),
                });
                continue;
            }
            recv[displs[src]..displs[src] + data.len()].copy_from_slice(&data);
        }
        match maybe_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, GatherError, check_root, validate_root_layout};
    use mpi::Count;
    use mpi::datatype::PartitionMut;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Root as _};

    /// `MPI_COMM_WORLD`. The default MPI error handler is fatal, so a failing
    /// collective never returns here; errors surface from local validation only.
    pub struct MpiComm {
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, GatherError> {
            let universe = mpi::initialize().ok_or(GatherError::Communication {
                op: "initialize",
                code: -1,
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }
    }

    fn to_counts(v: &[usize]) -> Vec<Count> {
        v.iter().map(|&x| x as Count).collect()
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }

        fn broadcast_bytes(&self, root: usize, buf: &mut [u8]) -> Result<(), GatherError> {
            check_root(root, self.size)?;
            self.world
                .process_at_rank(root as i32)
                .broadcast_into(buf);
            Ok(())
        }

        fn gatherv_bytes(
            &self,
            root: usize,
            send: &[u8],
            recv: &mut [u8],
            counts: &[usize],
            displs: &[usize],
        ) -> Result<(), GatherError> {
            check_root(root, self.size)?;
            let root_process = self.world.process_at_rank(root as i32);
            if self.rank == root {
                validate_root_layout(self.size, recv.len(), counts, displs)?;
                let counts = to_counts(counts);
                let displs = to_counts(displs);
                let mut partition = PartitionMut::new(recv, &counts[..], &displs[..]);
                root_process.gather_varcount_into_root(send, &mut partition);
            } else {
                root_process.gather_varcount_into(send);
            }
            Ok(())
        }

        fn abort(&self, err: &GatherError) -> ! {
            log::error!("rank {}/{}: aborting: {err}", self.rank, self.size);
            self.world.abort(err.exit_code())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comm_gather_is_direct_copy() {
        let comm = NoComm;
        let mut recv = [0u8; 6];
        comm.gatherv_bytes(0, &[1, 2, 3], &mut recv, &[3], &[2])
            .unwrap();
        assert_eq!(recv, [0, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn no_comm_rejects_foreign_root() {
        let mut buf = [0u8; 2];
        assert_eq!(
            NoComm.broadcast_bytes(1, &mut buf),
            Err(GatherError::InvalidRank { rank: 1, size: 1 })
        );
    }

    #[test]
    fn rayon_broadcast_reaches_every_rank() {
        let got = RayonComm::run(3, |comm| {
            let mut buf = if comm.rank() == 0 { [7u8, 8, 9] } else { [0u8; 3] };
            comm.broadcast_bytes(0, &mut buf).unwrap();
            buf
        })
        .unwrap();
        assert!(got.iter().all(|b| *b == [7, 8, 9]));
    }

    #[test]
    fn rayon_gatherv_places_by_displacement() {
        let got = RayonComm::run(3, |comm| {
            let me = comm.rank() as u8;
            let send = vec![me; comm.rank() + 1];
            let mut recv = vec![0u8; 6];
            comm.gatherv_bytes(0, &send, &mut recv, &[1, 2, 3], &[0, 1, 3])
                .unwrap();
            recv
        })
        .unwrap();
        assert_eq!(got[0], vec![0, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn rayon_root_reports_short_contribution() {
        let got = RayonComm::run(2, |comm| {
            let send = vec![1u8; 2 - comm.rank()];
            let mut recv = vec![0u8; 4];
            comm.gatherv_bytes(0, &send, &mut recv, &[2, 2], &[0, 2])
        })
        .unwrap();
        assert_eq!(
            got[0],
            Err(GatherError::TopologyMismatch {
                rank: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(got[1], Ok(()));
    }
}
