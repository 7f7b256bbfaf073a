//! Coordinator-side table of per-rank extrema.
//!
//! Storage is row-of-rank: rank `r`'s slots are contiguous, so slot `k` of
//! rank `r` lives at `r * slots + k`. The first half of the slots hold
//! minima and the second half the matching maxima.

use crate::debug_invariants::DebugInvariants;
use crate::gather_error::GatherError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtentsTable {
    slots: usize,
    ranks: usize,
    values: Vec<f64>,
}

impl ExtentsTable {
    /// Zero-filled table of `slots` columns for `ranks` ranks.
    pub fn new(slots: usize, ranks: usize) -> Self {
        Self {
            slots,
            ranks,
            values: vec![0.0; slots * ranks],
        }
    }

    /// Placeholder for ranks that never read gathered results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table for spatial extents of a run with `active_axes` dimensions.
    pub fn spatial(active_axes: usize, ranks: usize) -> Self {
        Self::new(2 * active_axes, ranks)
    }

    /// Table for one field's value range.
    pub fn field(ranks: usize) -> Self {
        Self::new(2, ranks)
    }

    #[inline]
    pub fn slots(&self) -> usize {
        self.slots
    }

    #[inline]
    pub fn ranks(&self) -> usize {
        self.ranks
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, slot: usize, rank: usize) -> Option<f64> {
        if slot >= self.slots || rank >= self.ranks {
            return None;
        }
        self.values.get(rank * self.slots + slot).copied()
    }

    /// All slots reported by `rank`.
    pub fn rank_row(&self, rank: usize) -> &[f64] {
        let start = (rank * self.slots).min(self.values.len());
        let end = (start + self.slots).min(self.values.len());
        &self.values[start..end]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Global `(min, max)` per slot pair, reduced over every rank.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        let half = self.slots / 2;
        (0..half)
            .map(|k| {
                (0..self.ranks).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                    let row = self.rank_row(r);
                    (lo.min(row[k]), hi.max(row[half + k]))
                })
            })
            .collect()
    }
}

impl DebugInvariants for ExtentsTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ExtentsTable");
    }

    fn validate_invariants(&self) -> Result<(), GatherError> {
        // minima and maxima come in pairs
        if self.slots % 2 != 0 || self.values.len() != self.slots * self.ranks {
            return Err(GatherError::TableShape {
                slots: self.slots + self.slots % 2,
                ranks: self.ranks,
                found_slots: self.slots,
                found_ranks: self.values.len().checked_div(self.slots).unwrap_or(0),
            });
        }
        Ok(())
    }
}
