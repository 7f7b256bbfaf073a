//! Communication backends and the collective algorithms built on them.

pub mod collective;
pub mod communicator;
pub mod defragment;
pub mod extents;
pub mod replicate;
pub mod wire;

pub use defragment::{defragment_field, defragment_grid};
pub use extents::{gather_data_extents, gather_spatial_extents};
pub use replicate::replicate_run_parameters;
