//! Per-rank extrema gathered into a coordinator-held [`ExtentsTable`].
//!
//! Each slot is one collective contributing a single double per rank. The
//! uniform plan places rank `r` at `displs[r]`, and scaling by the table's
//! stride turns that into the row-of-rank layout.

use crate::algs::collective::{ROOT, gatherv};
use crate::algs::communicator::Communicator;
use crate::data::extents_table::ExtentsTable;
use crate::data::gather_plan::{GatherPlan, PlanKind};
use crate::debug_invariants::DebugInvariants;
use crate::gather_error::GatherError;
use crate::topology::axis::{Axis, AxisOrder};
use itertools::Itertools;

/// Local cell-boundary coordinates along each native axis. Absent axes are
/// empty slices.
#[derive(Copy, Clone, Debug, Default)]
pub struct AxisCoordinates<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl<'a> AxisCoordinates<'a> {
    pub fn axis(&self, axis: Axis) -> &'a [f64] {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x coordinate",
        Axis::Y => "y coordinate",
        Axis::Z => "z coordinate",
    }
}

/// Minimum and maximum of `values`.
pub fn local_extrema(what: &'static str, values: &[f64]) -> Result<(f64, f64), GatherError> {
    values
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()
        .ok_or(GatherError::EmptyLocalData(what))
}

/// Gather spatial extents of every active axis.
///
/// Slots are `(min of each slot axis, max of each slot axis)` where the slot
/// axes come from `order`: native `(x, y, z)` or cylindrical `(y, z, x)`.
/// Only multi-axis runs have a table; 1D runs reassemble the grid instead.
pub fn gather_spatial_extents<C>(
    comm: &C,
    plan: &GatherPlan,
    active_axes: usize,
    order: AxisOrder,
    coords: &AxisCoordinates<'_>,
    table: &mut ExtentsTable,
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    const OP: &str = "gather_spatial_extents";
    plan.require(OP, PlanKind::Uniform)?;
    if !(2..=3).contains(&active_axes) {
        return Err(GatherError::UnsupportedDimensionality {
            op: OP,
            dims: active_axes,
        });
    }

    let extrema = order
        .axes(active_axes)
        .iter()
        .map(|&a| local_extrema(axis_name(a), coords.axis(a)))
        .collect::<Result<Vec<_>, _>>()?;
    let slot_values: Vec<f64> = extrema
        .iter()
        .map(|&(lo, _)| lo)
        .chain(extrema.iter().map(|&(_, hi)| hi))
        .collect();

    gather_slots(comm, plan, &slot_values, table)
}

/// Gather one field's value range: slot 0 holds minima, slot 1 maxima.
pub fn gather_data_extents<C>(
    comm: &C,
    plan: &GatherPlan,
    field: &[f64],
    table: &mut ExtentsTable,
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    plan.require("gather_data_extents", PlanKind::Uniform)?;
    let (lo, hi) = local_extrema("field", field)?;
    gather_slots(comm, plan, &[lo, hi], table)
}

fn gather_slots<C>(
    comm: &C,
    plan: &GatherPlan,
    slot_values: &[f64],
    table: &mut ExtentsTable,
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    let stride = slot_values.len();
    let is_root = comm.rank() == ROOT;
    if is_root && (table.slots() != stride || table.ranks() != comm.size()) {
        return Err(GatherError::TableShape {
            slots: stride,
            ranks: comm.size(),
            found_slots: table.slots(),
            found_ranks: table.ranks(),
        });
    }

    let displs = plan.strided_displs(stride);
    let mut none: [f64; 0] = [];
    for (k, value) in slot_values.iter().enumerate() {
        let recv = if is_root {
            &mut table.as_mut_slice()[k..]
        } else {
            &mut none[..]
        };
        gatherv(
            comm,
            std::slice::from_ref(value),
            recv,
            plan.recvcounts(),
            &displs,
        )?;
    }
    if is_root {
        table.debug_assert_invariants();
    }
    Ok(())
}
