//! Receive counts and displacements for coordinator-bound gathers.
//!
//! A plan is built once per run and only the coordinator holds populated
//! tables; other ranks keep an empty plan of the same kind so every rank
//! agrees on which aggregators are legal.

use crate::algs::collective::{ROOT, gather};
use crate::algs::communicator::Communicator;
use crate::algs::wire::WireCount;
use crate::debug_invariants::DebugInvariants;
use crate::gather_error::GatherError;

/// Which sizing mode a plan was built with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanKind {
    /// One variable-length slice per rank (1D reassembly).
    VariableLength,
    /// Exactly one element per rank (extents tables).
    Uniform,
}

impl PlanKind {
    pub fn describe(self) -> &'static str {
        match self {
            PlanKind::VariableLength => "variable-length",
            PlanKind::Uniform => "uniform",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatherPlan {
    kind: PlanKind,
    recvcounts: Vec<usize>,
    displs: Vec<usize>,
}

impl GatherPlan {
    /// Collective: gather every rank's `local_len` to the coordinator, which
    /// derives displacements by prefix sum.
    pub fn variable_length<C>(comm: &C, local_len: usize) -> Result<Self, GatherError>
    where
        C: Communicator + ?Sized,
    {
        let mut wire: Vec<WireCount> = if comm.rank() == ROOT {
            alloc_table(comm.size())?
        } else {
            Vec::new()
        };
        gather(comm, &[WireCount::new(local_len)], &mut wire)?;
        if comm.rank() != ROOT {
            return Ok(Self::unpopulated(PlanKind::VariableLength));
        }
        let counts: Vec<usize> = wire.iter().map(WireCount::get).collect();
        let plan = Self::from_counts(PlanKind::VariableLength, counts)?;
        log::debug!(
            "variable-length gather plan over {} ranks, {} elements",
            plan.recvcounts.len(),
            plan.total()
        );
        Ok(plan)
    }

    /// One element per rank; computed on the coordinator without communication.
    pub fn uniform<C>(comm: &C) -> Result<Self, GatherError>
    where
        C: Communicator + ?Sized,
    {
        if comm.rank() != ROOT {
            return Ok(Self::unpopulated(PlanKind::Uniform));
        }
        let mut counts: Vec<usize> = alloc_table(comm.size())?;
        counts.fill(1);
        Self::from_counts(PlanKind::Uniform, counts)
    }

    /// Build a plan from known per-rank counts.
    pub fn from_counts(kind: PlanKind, recvcounts: Vec<usize>) -> Result<Self, GatherError> {
        let mut displs: Vec<usize> = alloc_table(recvcounts.len())?;
        let mut acc = 0;
        for (d, &c) in displs.iter_mut().zip(&recvcounts) {
            *d = acc;
            acc += c;
        }
        let plan = Self {
            kind,
            recvcounts,
            displs,
        };
        crate::debug_invariants!(plan.validate_invariants(), "GatherPlan::from_counts");
        Ok(plan)
    }

    fn unpopulated(kind: PlanKind) -> Self {
        Self {
            kind,
            recvcounts: Vec::new(),
            displs: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Populated only on the coordinator.
    #[inline]
    pub fn recvcounts(&self) -> &[usize] {
        &self.recvcounts
    }

    /// Populated only on the coordinator.
    #[inline]
    pub fn displs(&self) -> &[usize] {
        &self.displs
    }

    #[inline]
    pub fn is_populated(&self) -> bool {
        !self.recvcounts.is_empty()
    }

    /// Total number of gathered elements.
    pub fn total(&self) -> usize {
        self.recvcounts.iter().sum()
    }

    /// Displacements for a row-of-rank table with `stride` columns.
    pub fn strided_displs(&self, stride: usize) -> Vec<usize> {
        self.displs.iter().map(|d| d * stride).collect()
    }

    /// Fail unless this plan is of kind `needed`.
    pub fn require(&self, op: &'static str, needed: PlanKind) -> Result<(), GatherError> {
        if self.kind == needed {
            Ok(())
        } else {
            Err(GatherError::PlanMissing {
                op,
                needed: needed.describe(),
            })
        }
    }
}

impl DebugInvariants for GatherPlan {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "GatherPlan");
    }

    fn validate_invariants(&self) -> Result<(), GatherError> {
        if self.recvcounts.len() != self.displs.len() {
            return Err(GatherError::LayoutMismatch {
                ranks: self.recvcounts.len(),
                counts: self.recvcounts.len(),
                displs: self.displs.len(),
            });
        }
        let mut expected = 0;
        for (rank, (&c, &d)) in self.recvcounts.iter().zip(&self.displs).enumerate() {
            if d != expected {
                return Err(GatherError::TopologyMismatch {
                    rank,
                    expected,
                    found: d,
                });
            }
            expected += c;
        }
        Ok(())
    }
}

fn alloc_table<T: Clone + Default>(len: usize) -> Result<Vec<T>, GatherError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| GatherError::Allocation {
            what: "gather plan table",
            len,
        })?;
    v.resize(len, T::default());
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, RayonComm};

    #[test]
    fn prefix_sum_from_counts() {
        let plan = GatherPlan::from_counts(PlanKind::VariableLength, vec![3, 0, 5, 2]).unwrap();
        assert_eq!(plan.displs(), &[0, 3, 3, 8]);
        assert_eq!(plan.total(), 10);
        assert!(plan.validate_invariants().is_ok());
    }

    #[test]
    fn uniform_plan_has_unit_spacing() {
        let got = RayonComm::run(3, |comm| GatherPlan::uniform(comm).unwrap()).unwrap();
        assert_eq!(got[0].recvcounts(), &[1, 1, 1]);
        assert_eq!(got[0].displs(), &[0, 1, 2]);
        assert_eq!(got[0].strided_displs(6), vec![0, 6, 12]);
        assert!(!got[1].is_populated());
        assert_eq!(got[2].kind(), PlanKind::Uniform);
    }

    #[test]
    fn variable_plan_collects_local_lengths() {
        let got = RayonComm::run(4, |comm| {
            GatherPlan::variable_length(comm, comm.rank() + 2).unwrap()
        })
        .unwrap();
        assert_eq!(got[0].recvcounts(), &[2, 3, 4, 5]);
        assert_eq!(got[0].displs(), &[0, 2, 5, 9]);
        assert!(got[1..].iter().all(|p| !p.is_populated()));
    }

    #[test]
    fn serial_variable_plan() {
        let plan = GatherPlan::variable_length(&NoComm, 7).unwrap();
        assert_eq!(plan.recvcounts(), &[7]);
        assert_eq!(plan.displs(), &[0]);
    }

    #[test]
    fn corrupted_displacements_fail_validation() {
        let plan = GatherPlan {
            kind: PlanKind::VariableLength,
            recvcounts: vec![2, 2],
            displs: vec![0, 1],
        };
        assert_eq!(
            plan.validate_invariants(),
            Err(GatherError::TopologyMismatch {
                rank: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn wrong_kind_is_reported() {
        let plan = GatherPlan::uniform(&NoComm).unwrap();
        assert_eq!(
            plan.require("defragment", PlanKind::VariableLength),
            Err(GatherError::PlanMissing {
                op: "defragment",
                needed: "variable-length"
            })
        );
    }
}
