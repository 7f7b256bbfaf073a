//! Fixed, little-endian wire types for collective payloads.
//!
//! Collectives move contiguous bytes. Doubles travel in native layout (every
//! rank of a run shares one architecture); counts and flags use the explicit
//! records below so their width never depends on the host's `usize`.

use bytemuck::{Pod, Zeroable};

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// A per-rank element count (u32) carried on the wire. Counts beyond
/// `u32::MAX` saturate, so the receiver sees a length mismatch rather than a
/// wrapped value.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
pub struct WireCount {
    pub n_le: u32,
}

impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            n_le: u32::try_from(n).unwrap_or(u32::MAX).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u32::from_le(self.n_le) as usize
    }
}

/// A boolean carried as one byte; any nonzero value decodes as `true`.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
pub struct WireFlag(pub u8);

impl WireFlag {
    pub fn of(b: bool) -> Self {
        Self(b as u8)
    }
    pub fn get(self) -> bool {
        self.0 != 0
    }
}
