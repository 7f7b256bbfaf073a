#![allow(dead_code)]
use cfd_gather::prelude::*;

/// Run `op` on `n` in-process ranks and return the per-rank results.
pub fn on_ranks<R, F>(n: usize, op: F) -> Vec<R>
where
    F: Fn(&RayonComm) -> R + Sync,
    R: Send,
{
    RayonComm::run(n, op).expect("rank pool")
}

/// Distinguishable value reported by `rank` for `slot`.
pub fn sentinel(rank: usize, slot: usize) -> f64 {
    1000.0 * (rank as f64 + 1.0) + slot as f64
}

/// This rank's decomposition of the run described by `params`.
pub fn decompose<C: Communicator>(comm: &C, params: &RunParameters) -> DomainDecomposition {
    DomainDecomposition::from_run_parameters(params, ProcessTopology::of(comm))
        .expect("decomposition")
}
