//! Typed collectives over the byte-level [`Communicator`].
//!
//! Rank [`ROOT`] is the coordinator for every operation in this crate. Counts
//! and displacements are expressed in elements here and scaled to bytes
//! before they reach the backend; errors are scaled back.

use crate::algs::communicator::Communicator;
use crate::algs::wire::{cast_slice, cast_slice_mut};
use crate::gather_error::GatherError;
use bytemuck::Pod;
use std::mem::size_of;

/// The coordinating rank.
pub const ROOT: usize = 0;

fn in_elements(err: GatherError, elem: usize) -> GatherError {
    match err {
        GatherError::TopologyMismatch {
            rank,
            expected,
            found,
        } => GatherError::TopologyMismatch {
            rank,
            expected: expected / elem,
            found: found / elem,
        },
        GatherError::DestinationTooSmall {
            what,
            needed,
            found,
        } => GatherError::DestinationTooSmall {
            what,
            needed: needed / elem,
            found: found / elem,
        },
        other => other,
    }
}

/// Broadcast `data` from the coordinator to every rank.
pub fn broadcast<T, C>(comm: &C, data: &mut [T]) -> Result<(), GatherError>
where
    T: Pod,
    C: Communicator + ?Sized,
{
    comm.broadcast_bytes(ROOT, cast_slice_mut(data))
        .map_err(|e| in_elements(e, size_of::<T>()))
}

/// Fixed-count gather: every rank sends `send.len()` elements, stored on the
/// coordinator in rank order.
pub fn gather<T, C>(comm: &C, send: &[T], recv: &mut [T]) -> Result<(), GatherError>
where
    T: Pod,
    C: Communicator + ?Sized,
{
    let (counts, displs) = if comm.rank() == ROOT {
        let n = send.len();
        (
            vec![n; comm.size()],
            (0..comm.size()).map(|r| r * n).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    gatherv(comm, send, recv, &counts, &displs)
}

/// Variable-count gather: rank `r`'s `send` lands at `recv[displs[r]..]` on
/// the coordinator. `counts`/`displs` are ignored on other ranks.
pub fn gatherv<T, C>(
    comm: &C,
    send: &[T],
    recv: &mut [T],
    counts: &[usize],
    displs: &[usize],
) -> Result<(), GatherError>
where
    T: Pod,
    C: Communicator + ?Sized,
{
    let elem = size_of::<T>();
    let (counts, displs): (Vec<usize>, Vec<usize>) = if comm.rank() == ROOT {
        (
            counts.iter().map(|c| c * elem).collect(),
            displs.iter().map(|d| d * elem).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    comm.gatherv_bytes(
        ROOT,
        cast_slice(send),
        cast_slice_mut(recv),
        &counts,
        &displs,
    )
    .map_err(|e| in_elements(e, elem))
}
