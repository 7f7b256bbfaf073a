//! GatherError: unified error type for cfd-gather public APIs
//!
//! Every collective in this crate is all-or-nothing: once any rank sees one of
//! these errors the run cannot continue consistently, so callers are expected
//! to hand the error to [`Communicator::abort`](crate::algs::communicator::Communicator::abort).

use thiserror::Error;

/// Unified error type for cfd-gather operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatherError {
    /// A collective reported a non-success status.
    #[error("collective `{op}` failed with status {code}")]
    Communication { op: &'static str, code: i32 },
    /// Scratch or plan storage could not be reserved.
    #[error("failed to allocate {len} elements for {what}")]
    Allocation { what: &'static str, len: usize },
    /// A rank contributed a different number of elements than the plan expects.
    #[error("rank {rank} contributed {found} elements, plan expects {expected}")]
    TopologyMismatch {
        rank: usize,
        expected: usize,
        found: usize,
    },
    /// Root-side counts/displacements do not cover every rank.
    #[error("gather layout has {counts} counts and {displs} displacements for {ranks} ranks")]
    LayoutMismatch {
        ranks: usize,
        counts: usize,
        displs: usize,
    },
    /// An aggregator ran without the gather plan it depends on.
    #[error("operation `{op}` requires a {needed} gather plan")]
    PlanMissing {
        op: &'static str,
        needed: &'static str,
    },
    /// The operation is not defined for this number of active axes.
    #[error("operation `{op}` is not defined for {dims}D runs")]
    UnsupportedDimensionality { op: &'static str, dims: usize },
    /// A coordinator-side destination buffer is shorter than the gathered data.
    #[error("destination `{what}` holds {found} elements, {needed} required")]
    DestinationTooSmall {
        what: &'static str,
        needed: usize,
        found: usize,
    },
    /// A coordinator-side extents table has the wrong shape.
    #[error("extents table is {found_slots}x{found_ranks}, expected {slots}x{ranks}")]
    TableShape {
        slots: usize,
        ranks: usize,
        found_slots: usize,
        found_ranks: usize,
    },
    /// Extrema were requested over an empty local array.
    #[error("local `{0}` array is empty")]
    EmptyLocalData(&'static str),
    /// A fixed-capacity text parameter does not fit.
    #[error("parameter `{name}` is {len} bytes, capacity is {capacity}")]
    ParameterTooLong {
        name: &'static str,
        len: usize,
        capacity: usize,
    },
    /// A text parameter holds a NUL byte, which would truncate it on the wire.
    #[error("parameter `{name}` contains a NUL byte at offset {offset}")]
    ParameterContainsNul { name: &'static str, offset: usize },
    /// The global grid cannot be split over the requested ranks.
    #[error("cannot decompose {cells} cells over {ranks} ranks")]
    Decomposition { cells: usize, ranks: usize },
    /// A run parameter holds a value outside its documented range.
    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: i64 },
    /// The rank passed to a collective is outside the communicator.
    #[error("rank {rank} is outside a communicator of size {size}")]
    InvalidRank { rank: usize, size: usize },
}

impl GatherError {
    /// Status code handed to the runtime when aborting on this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            GatherError::Communication { code, .. } if *code != 0 => *code,
            GatherError::Communication { .. } => 1,
            GatherError::Allocation { .. } => 2,
            GatherError::TopologyMismatch { .. } => 3,
            _ => 4,
        }
    }
}
