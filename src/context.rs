//! The communication context: halo buffers and gather plan for one run.
//!
//! Every rank creates exactly one [`GatherContext`] after replicating the run
//! parameters, calls the aggregators in the same order as every other rank,
//! and finally consumes it with [`GatherContext::finalize`].

use crate::algs::communicator::Communicator;
use crate::algs::defragment::{self, GridLocation};
use crate::algs::extents::{self, AxisCoordinates};
use crate::data::extents_table::ExtentsTable;
use crate::data::gather_plan::{GatherPlan, PlanKind};
use crate::data::halo::HaloBuffers;
use crate::gather_error::GatherError;
use crate::topology::decomposition::{DomainDecomposition, ProcessTopology};

pub struct GatherContext<'c, C: Communicator + ?Sized> {
    comm: &'c C,
    decomp: DomainDecomposition,
    halo: HaloBuffers,
    plan: Option<GatherPlan>,
}

impl<'c, C: Communicator + ?Sized> GatherContext<'c, C> {
    /// Size the halo buffers and build whichever gather plan the run needs.
    ///
    /// Collective: 1D runs gather every rank's local cell count.
    pub fn initialize(comm: &'c C, decomp: DomainDecomposition) -> Result<Self, GatherError> {
        let halo = HaloBuffers::allocate(&decomp)?;
        let plan = if decomp.is_1d() {
            Some(GatherPlan::variable_length(comm, decomp.local_cells())?)
        } else if decomp.needs_gather_plan() {
            Some(GatherPlan::uniform(comm)?)
        } else {
            None
        };
        log::debug!(
            "rank {}/{}: context ready ({}D, halo {} elements, plan {:?})",
            comm.rank(),
            comm.size(),
            decomp.active_axes(),
            halo.len(),
            plan.as_ref().map(GatherPlan::kind)
        );
        Ok(Self {
            comm,
            decomp,
            halo,
            plan,
        })
    }

    pub fn topology(&self) -> ProcessTopology {
        ProcessTopology::of(self.comm)
    }

    pub fn decomposition(&self) -> &DomainDecomposition {
        &self.decomp
    }

    pub fn halo_buffers(&self) -> &HaloBuffers {
        &self.halo
    }

    pub fn halo_buffers_mut(&mut self) -> &mut HaloBuffers {
        &mut self.halo
    }

    pub fn plan(&self) -> Option<&GatherPlan> {
        self.plan.as_ref()
    }

    fn plan_for(&self, op: &'static str, kind: PlanKind) -> Result<&GatherPlan, GatherError> {
        let plan = self.plan.as_ref().ok_or(GatherError::PlanMissing {
            op,
            needed: kind.describe(),
        })?;
        plan.require(op, kind)?;
        Ok(plan)
    }

    /// A correctly shaped spatial extents table on the coordinator, empty elsewhere.
    pub fn new_spatial_table(&self) -> ExtentsTable {
        if self.topology().is_root() {
            ExtentsTable::spatial(self.decomp.active_axes(), self.comm.size())
        } else {
            ExtentsTable::empty()
        }
    }

    /// A correctly shaped field extents table on the coordinator, empty elsewhere.
    pub fn new_field_table(&self) -> ExtentsTable {
        if self.topology().is_root() {
            ExtentsTable::field(self.comm.size())
        } else {
            ExtentsTable::empty()
        }
    }

    /// Coordinate convention used for 1D grid reassembly with this run's format.
    pub fn grid_location(&self) -> GridLocation {
        GridLocation::for_format(self.decomp.format)
    }

    /// Length of the coordinator's global 1D coordinate array.
    pub fn global_grid_len(&self) -> usize {
        self.grid_location().global_len(self.decomp.m_glb)
    }

    /// Length of the coordinator's global 1D field array.
    pub fn global_field_len(&self) -> usize {
        self.decomp.m_glb + 1
    }

    pub fn gather_spatial_extents(
        &self,
        coords: &AxisCoordinates<'_>,
        table: &mut ExtentsTable,
    ) -> Result<(), GatherError> {
        let plan = self.plan_for("gather_spatial_extents", PlanKind::Uniform)?;
        extents::gather_spatial_extents(
            self.comm,
            plan,
            self.decomp.active_axes(),
            self.decomp.axis_order(),
            coords,
            table,
        )
    }

    /// Reassemble the 1D grid: cell centers for Silo output, cell boundaries
    /// (with the leading lower-boundary sentinel) for binary output.
    pub fn defragment_grid(&self, local: &[f64], global: &mut [f64]) -> Result<(), GatherError> {
        let plan = self.plan_for("defragment_grid", PlanKind::VariableLength)?;
        defragment::defragment_grid(
            self.comm,
            plan,
            self.decomp.local_cells(),
            self.grid_location(),
            local,
            global,
        )
    }

    pub fn gather_data_extents(
        &self,
        field: &[f64],
        table: &mut ExtentsTable,
    ) -> Result<(), GatherError> {
        let plan = self.plan_for("gather_data_extents", PlanKind::Uniform)?;
        extents::gather_data_extents(self.comm, plan, field, table)
    }

    pub fn defragment_field(&self, local: &[f64], global: &mut [f64]) -> Result<(), GatherError> {
        let plan = self.plan_for("defragment_field", PlanKind::VariableLength)?;
        defragment::defragment_field(self.comm, plan, self.decomp.local_cells(), local, global)
    }

    /// Release the halo buffers and the plan.
    pub fn finalize(self) {
        log::debug!(
            "rank {}: releasing halo buffers ({} elements) and {} gather plan",
            self.comm.rank(),
            self.halo.len(),
            self.plan.as_ref().map_or("no", |p| p.kind().describe())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::data::run_parameters::OutputFormat;
    use crate::topology::axis::GridGeometry;

    fn decomp(n: usize, p: usize, format: OutputFormat) -> DomainDecomposition {
        DomainDecomposition {
            m: 9,
            n,
            p,
            m_glb: 9,
            n_glb: n,
            p_glb: p,
            start_idx: 0,
            buff_size: 1,
            sys_size: 3,
            geometry: GridGeometry::Cartesian,
            format,
        }
    }

    #[test]
    fn binary_multi_axis_runs_build_no_plan() {
        let ctx = GatherContext::initialize(&NoComm, decomp(4, 0, OutputFormat::Binary)).unwrap();
        assert!(ctx.plan().is_none());
        assert_eq!(ctx.halo_buffers().len(), 3 * (9 + 3));
        let mut table = ExtentsTable::field(1);
        assert_eq!(
            ctx.gather_data_extents(&[1.0], &mut table),
            Err(GatherError::PlanMissing {
                op: "gather_data_extents",
                needed: "uniform"
            })
        );
        ctx.finalize();
    }

    #[test]
    fn one_dimensional_runs_get_a_variable_plan() {
        let ctx = GatherContext::initialize(&NoComm, decomp(0, 0, OutputFormat::Silo)).unwrap();
        assert_eq!(ctx.plan().map(GatherPlan::kind), Some(PlanKind::VariableLength));
        assert_eq!(ctx.global_grid_len(), 10);
        let local: Vec<f64> = (0..10).map(f64::from).collect();
        let mut global = vec![0.0; ctx.global_field_len()];
        ctx.defragment_field(&local, &mut global).unwrap();
        assert_eq!(global, local);
    }
}
