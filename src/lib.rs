#![cfg_attr(docsrs, feature(doc_cfg))]
//! # cfd-gather
//!
//! cfd-gather is the aggregation layer of a distributed structured-grid CFD
//! post-processor. Every rank owns a contiguous slab of the grid; before an
//! output writer runs, run parameters must be identical everywhere and the
//! coordinator (rank 0) must hold per-rank extents tables or, for 1D runs, the
//! fully reassembled grid and field arrays.
//!
//! ## Features
//! - Run-parameter replication driven by a single field table
//! - Halo buffer sizing for 1D, 2D and 3D slabs
//! - Gather plans (receive counts and displacements) built once per run
//! - Spatial and field extents tables with cylindrical axis reordering
//! - 1D grid and field defragmentation
//! - Pluggable communication backends (serial, in-process threads, MPI)
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! cfd-gather = "0.1"
//! # features = ["mpi-support"]
//! ```
//!
//! ```rust
//! use cfd_gather::prelude::*;
//!
//! let comm = NoComm;
//! let mut params = RunParameters { m: 9, ..RunParameters::default() };
//! replicate_run_parameters(&comm, &mut params)?;
//! let decomp = DomainDecomposition::from_run_parameters(&params, ProcessTopology::of(&comm))?;
//! let ctx = GatherContext::initialize(&comm, decomp)?;
//!
//! let local: Vec<f64> = (0..10).map(f64::from).collect();
//! let mut global = vec![0.0; ctx.global_field_len()];
//! ctx.defragment_field(&local, &mut global)?;
//! assert_eq!(global, local);
//! ctx.finalize();
//! # Ok::<(), cfd_gather::gather_error::GatherError>(())
//! ```
//!
//! ## Errors
//! Collectives are all-or-nothing. Any [`GatherError`](gather_error::GatherError)
//! leaves the ranks out of step, so drivers should pass it to
//! [`Communicator::abort`](algs::communicator::Communicator::abort).

pub mod algs;
pub mod context;
pub mod data;
pub mod debug_invariants;
pub mod gather_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::collective::ROOT;
    pub use crate::algs::communicator::{Communicator, NoComm, RayonComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::defragment::GridLocation;
    pub use crate::algs::extents::AxisCoordinates;
    pub use crate::algs::replicate::replicate_run_parameters;
    pub use crate::context::GatherContext;
    pub use crate::data::extents_table::ExtentsTable;
    pub use crate::data::gather_plan::{GatherPlan, PlanKind};
    pub use crate::data::halo::HaloBuffers;
    pub use crate::data::run_parameters::{OutputFormat, RunParameters};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::gather_error::GatherError;
    pub use crate::topology::axis::{Axis, AxisOrder, GridGeometry};
    pub use crate::topology::decomposition::{DomainDecomposition, ProcessTopology};
}
