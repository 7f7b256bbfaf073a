//! Run configuration and the buffers and tables the aggregators fill.

pub mod extents_table;
pub mod gather_plan;
pub mod halo;
pub mod run_parameters;
