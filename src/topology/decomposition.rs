//! Process topology and the per-rank decomposition of the structured grid.
//!
//! Extents follow the solver's convention: an axis with `k + 1` cells has
//! extent `k`, and an absent axis has extent `0`. A run's dimensionality is
//! therefore decided by which of `n`/`p` are nonzero, never by `m`.

use crate::algs::communicator::Communicator;
use crate::data::run_parameters::{OutputFormat, RunParameters};
use crate::gather_error::GatherError;
use crate::topology::axis::{AxisOrder, GridGeometry};

/// A process's identity within the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProcessTopology {
    pub rank: usize,
    pub size: usize,
}

impl ProcessTopology {
    pub fn of<C: Communicator + ?Sized>(comm: &C) -> Self {
        Self {
            rank: comm.rank(),
            size: comm.size(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.rank == crate::algs::collective::ROOT
    }
}

/// Local share of a one-axis slab decomposition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slab {
    /// Local extent (cells - 1).
    pub m: usize,
    /// Global index of the first local cell.
    pub start: usize,
}

/// Split `m_glb + 1` cells over `size` ranks as evenly as possible; the first
/// `(m_glb + 1) % size` ranks own one extra cell.
pub fn decompose_1d(m_glb: usize, rank: usize, size: usize) -> Result<Slab, GatherError> {
    let cells = m_glb + 1;
    if size == 0 || size > cells {
        return Err(GatherError::Decomposition { cells, ranks: size });
    }
    if rank >= size {
        return Err(GatherError::InvalidRank { rank, size });
    }
    let base = cells / size;
    let rem = cells % size;
    let local = base + usize::from(rank < rem);
    Ok(Slab {
        m: local - 1,
        start: rank * base + rank.min(rem),
    })
}

/// Local and global grid extents plus the run settings the aggregators consult.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainDecomposition {
    pub m: usize,
    pub n: usize,
    pub p: usize,
    pub m_glb: usize,
    pub n_glb: usize,
    pub p_glb: usize,
    /// Global index of this rank's first cell along the first axis.
    pub start_idx: usize,
    /// Halo width in cells.
    pub buff_size: usize,
    /// Number of tracked system variables.
    pub sys_size: usize,
    pub geometry: GridGeometry,
    pub format: OutputFormat,
}

impl DomainDecomposition {
    /// Decompose the global grid described by `params` along its first axis.
    ///
    /// Second and third axes are not split: every rank keeps their global
    /// extents.
    pub fn from_run_parameters(
        params: &RunParameters,
        topology: ProcessTopology,
    ) -> Result<Self, GatherError> {
        let m_glb = non_negative("m", params.m)?;
        let n_glb = non_negative("n", params.n)?;
        let p_glb = non_negative("p", params.p)?;
        let slab = decompose_1d(m_glb, topology.rank, topology.size)?;
        Ok(Self {
            m: slab.m,
            n: n_glb,
            p: p_glb,
            m_glb,
            n_glb,
            p_glb,
            start_idx: slab.start,
            buff_size: non_negative("buff_size", params.buff_size)?,
            sys_size: params.sys_size()?,
            geometry: params.geometry(),
            format: params.output_format()?,
        })
    }

    /// Number of active axes (1, 2 or 3).
    pub fn active_axes(&self) -> usize {
        match (self.n, self.p) {
            (0, _) => 1,
            (_, 0) => 2,
            _ => 3,
        }
    }

    #[inline]
    pub fn is_1d(&self) -> bool {
        self.active_axes() == 1
    }

    /// Cells this rank owns along the first axis.
    #[inline]
    pub fn local_cells(&self) -> usize {
        self.m + 1
    }

    pub fn axis_order(&self) -> AxisOrder {
        AxisOrder::select(self.geometry, self.active_axes())
    }

    /// Whether any gather plan is needed for this configuration.
    pub fn needs_gather_plan(&self) -> bool {
        self.is_1d() || (self.format == OutputFormat::Silo && self.active_axes() > 1)
    }
}

fn non_negative(name: &'static str, value: i32) -> Result<usize, GatherError> {
    usize::try_from(value).map_err(|_| GatherError::InvalidParameter {
        name,
        value: value as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slabs_cover_the_axis_contiguously() {
        let m_glb = 10;
        let size = 4;
        let mut next = 0;
        let mut sum_m = 0;
        for rank in 0..size {
            let slab = decompose_1d(m_glb, rank, size).unwrap();
            assert_eq!(slab.start, next);
            next += slab.m + 1;
            sum_m += slab.m;
        }
        assert_eq!(next, m_glb + 1);
        assert_eq!(sum_m + size, m_glb + 1);
    }

    #[test]
    fn remainder_goes_to_leading_ranks() {
        let cells: Vec<_> = (0..3)
            .map(|r| decompose_1d(7, r, 3).unwrap().m + 1)
            .collect();
        assert_eq!(cells, vec![3, 3, 2]);
    }

    #[test]
    fn more_ranks_than_cells_is_rejected() {
        assert_eq!(
            decompose_1d(2, 0, 4),
            Err(GatherError::Decomposition { cells: 3, ranks: 4 })
        );
    }

    #[test]
    fn dimensionality_follows_absent_axes() {
        let params = RunParameters {
            m: 9,
            n: 4,
            p: 0,
            ..RunParameters::default()
        };
        let d = DomainDecomposition::from_run_parameters(
            &params,
            ProcessTopology { rank: 1, size: 2 },
        )
        .unwrap();
        assert_eq!(d.active_axes(), 2);
        assert_eq!((d.m, d.start_idx), (4, 5));
        assert!(d.needs_gather_plan());
    }
}
