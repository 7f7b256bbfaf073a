//! Properties of gather plans and slab decompositions.

mod util;

use cfd_gather::prelude::*;
use cfd_gather::topology::decomposition::decompose_1d;
use proptest::prelude::*;

proptest! {
    #[test]
    fn displacements_are_prefix_sums(counts in prop::collection::vec(0usize..1000, 1..64)) {
        let plan = GatherPlan::from_counts(PlanKind::VariableLength, counts.clone()).unwrap();
        prop_assert_eq!(plan.displs()[0], 0);
        for r in 1..counts.len() {
            prop_assert_eq!(plan.displs()[r], plan.displs()[r - 1] + counts[r - 1]);
        }
        prop_assert_eq!(plan.total(), counts.iter().sum::<usize>());
        prop_assert!(plan.validate_invariants().is_ok());
    }

    #[test]
    fn slabs_tile_the_first_axis(m_glb in 0usize..500, size in 1usize..32) {
        prop_assume!(size <= m_glb + 1);
        let slabs: Vec<_> = (0..size)
            .map(|r| decompose_1d(m_glb, r, size).unwrap())
            .collect();
        let mut next = 0;
        for slab in &slabs {
            prop_assert_eq!(slab.start, next);
            next += slab.m + 1;
        }
        prop_assert_eq!(next, m_glb + 1);
        let sizes: Vec<_> = slabs.iter().map(|s| s.m).collect();
        prop_assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn gathered_plan_matches_decomposition(m_glb in 7usize..120, size in 1usize..8) {
        let plans = util::on_ranks(size, |comm| {
            let slab = decompose_1d(m_glb, comm.rank(), comm.size()).unwrap();
            GatherPlan::variable_length(comm, slab.m + 1).unwrap()
        });
        let root = &plans[0];
        prop_assert_eq!(root.recvcounts().len(), size);
        for r in 0..size {
            let slab = decompose_1d(m_glb, r, size).unwrap();
            prop_assert_eq!(root.recvcounts()[r], slab.m + 1);
            prop_assert_eq!(root.displs()[r], slab.start);
        }
        prop_assert_eq!(root.total(), m_glb + 1);
        for plan in &plans[1..] {
            prop_assert!(!plan.is_populated());
            prop_assert_eq!(plan.kind(), PlanKind::VariableLength);
        }
    }
}

#[test]
fn uniform_plan_is_one_per_rank() {
    let plans = util::on_ranks(5, |comm| GatherPlan::uniform(comm).unwrap());
    assert_eq!(plans[0].recvcounts(), &[1, 1, 1, 1, 1]);
    assert_eq!(plans[0].displs(), &[0, 1, 2, 3, 4]);
    assert_eq!(plans[0].strided_displs(6), vec![0, 6, 12, 18, 24]);
    assert!(plans[1..].iter().all(|p| !p.is_populated()));
}

#[test]
fn more_ranks_than_cells_is_rejected() {
    assert_eq!(
        decompose_1d(2, 0, 4),
        Err(GatherError::Decomposition { cells: 3, ranks: 4 })
    );
}
