//! 1D reassembly of grid and field arrays on the coordinator.
//!
//! Rank `r` contributes its `m + 1` local values, which land at `displs[r]`
//! of the coordinator's global array (shifted by one for cell boundaries,
//! whose global index 0 is the lower domain boundary).

use crate::algs::collective::{ROOT, gatherv};
use crate::algs::communicator::Communicator;
use crate::data::gather_plan::{GatherPlan, PlanKind};
use crate::data::run_parameters::OutputFormat;
use crate::gather_error::GatherError;

/// Which coordinate convention is reassembled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridLocation {
    /// Cell centroids, `m + 1` per rank.
    CellCenters,
    /// Cell faces: the local array holds the lower boundary at index 0
    /// followed by the `m + 1` upper faces.
    CellBoundaries,
}

impl GridLocation {
    /// Silo output is written at cell centers; binary output at cell boundaries.
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Silo => GridLocation::CellCenters,
            OutputFormat::Binary => GridLocation::CellBoundaries,
        }
    }

    /// Local array length for a rank owning `cells` cells.
    pub fn local_len(self, cells: usize) -> usize {
        match self {
            GridLocation::CellCenters => cells,
            GridLocation::CellBoundaries => cells + 1,
        }
    }

    /// Global array length for `m_glb + 1` cells.
    pub fn global_len(self, m_glb: usize) -> usize {
        self.local_len(m_glb + 1)
    }
}

/// Reassemble the global 1D coordinate array.
pub fn defragment_grid<C>(
    comm: &C,
    plan: &GatherPlan,
    cells: usize,
    location: GridLocation,
    local: &[f64],
    global: &mut [f64],
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    plan.require("defragment_grid", PlanKind::VariableLength)?;
    check_local_len(comm, location.local_len(cells), local.len())?;
    match location {
        GridLocation::CellCenters => {
            check_global_len(comm, "global cell-center array", plan.total(), global.len())?;
            gatherv(comm, local, global, plan.recvcounts(), plan.displs())
        }
        GridLocation::CellBoundaries => {
            check_global_len(
                comm,
                "global cell-boundary array",
                plan.total() + 1,
                global.len(),
            )?;
            let recv = if comm.rank() == ROOT {
                &mut global[1..]
            } else {
                &mut global[..]
            };
            gatherv(comm, &local[1..], recv, plan.recvcounts(), plan.displs())?;
            // the lower domain boundary is not part of any rank's contribution
            if comm.rank() == ROOT {
                global[0] = local[0];
            }
            Ok(())
        }
    }
}

/// Reassemble one global 1D field array.
pub fn defragment_field<C>(
    comm: &C,
    plan: &GatherPlan,
    cells: usize,
    local: &[f64],
    global: &mut [f64],
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    plan.require("defragment_field", PlanKind::VariableLength)?;
    check_local_len(comm, cells, local.len())?;
    check_global_len(comm, "global field array", plan.total(), global.len())?;
    gatherv(comm, local, global, plan.recvcounts(), plan.displs())
}

fn check_local_len<C>(comm: &C, expected: usize, found: usize) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    if expected == found {
        Ok(())
    } else {
        Err(GatherError::TopologyMismatch {
            rank: comm.rank(),
            expected,
            found,
        })
    }
}

fn check_global_len<C>(
    comm: &C,
    what: &'static str,
    needed: usize,
    found: usize,
) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    if comm.rank() != ROOT || found >= needed {
        Ok(())
    } else {
        Err(GatherError::DestinationTooSmall {
            what,
            needed,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;

    #[test]
    fn serial_boundaries_keep_sentinel_first() {
        let plan = GatherPlan::variable_length(&NoComm, 3).unwrap();
        let local = [-0.5, 0.5, 1.5, 2.5];
        let mut global = vec![f64::NAN; GridLocation::CellBoundaries.global_len(2)];
        defragment_grid(
            &NoComm,
            &plan,
            3,
            GridLocation::CellBoundaries,
            &local,
            &mut global,
        )
        .unwrap();
        assert_eq!(global, local);
    }

    #[test]
    fn wrong_local_length_is_a_topology_mismatch() {
        let plan = GatherPlan::variable_length(&NoComm, 3).unwrap();
        let mut global = [0.0; 3];
        assert_eq!(
            defragment_field(&NoComm, &plan, 3, &[1.0, 2.0], &mut global),
            Err(GatherError::TopologyMismatch {
                rank: 0,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn short_destination_is_rejected_on_root() {
        let plan = GatherPlan::variable_length(&NoComm, 2).unwrap();
        let mut global = [0.0; 1];
        assert_eq!(
            defragment_field(&NoComm, &plan, 2, &[1.0, 2.0], &mut global),
            Err(GatherError::DestinationTooSmall {
                what: "global field array",
                needed: 2,
                found: 1
            })
        );
    }

    #[test]
    fn extents_plan_cannot_defragment() {
        let plan = GatherPlan::uniform(&NoComm).unwrap();
        let mut global = [0.0; 1];
        assert!(matches!(
            defragment_field(&NoComm, &plan, 1, &[1.0], &mut global),
            Err(GatherError::PlanMissing { .. })
        ));
    }
}
