//! Scratch storage for neighbor-exchange payloads.

use crate::gather_error::GatherError;
use crate::topology::decomposition::DomainDecomposition;
use num_traits::Zero;

/// Number of elements each halo buffer needs for halo width `b`, `s` system
/// variables and local extents `(m, n, p)`, or `None` when the length does
/// not fit in `usize`.
///
/// The three-axis branch is an upper bound on the largest ghost-augmented
/// face (the full ghost-augmented volume divided by its thinnest extent); it
/// is not an exact per-face count. Integer arithmetic runs left to right and
/// truncates, matching the layout the exchange routines expect.
pub fn halo_buffer_len(b: usize, s: usize, m: usize, n: usize, p: usize) -> Option<usize> {
    if b == 0 {
        return Some(0);
    }
    let pad = b.checked_mul(2)?.checked_add(1)?;
    let bs = b.checked_mul(s)?;
    match (n, p) {
        (0, _) => Some(bs),
        (_, 0) => bs.checked_mul(m.max(n).checked_add(pad)?),
        _ => {
            let volume = bs
                .checked_mul(m.checked_add(pad)?)?
                .checked_mul(n.checked_add(pad)?)?
                .checked_mul(p.checked_add(pad)?)?;
            volume.checked_div(m.min(n).min(p).checked_add(pad)?)
        }
    }
}

/// Inbound and outbound exchange buffers of equal, zero-filled length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HaloBuffers<T = f64> {
    inbound: Vec<T>,
    outbound: Vec<T>,
}

impl<T: Zero + Clone> HaloBuffers<T> {
    /// Size both buffers for `decomp`. Without a halo nothing is allocated.
    pub fn allocate(decomp: &DomainDecomposition) -> Result<Self, GatherError> {
        let len = halo_buffer_len(
            decomp.buff_size,
            decomp.sys_size,
            decomp.m,
            decomp.n,
            decomp.p,
        )
        .ok_or(GatherError::Allocation {
            what: "halo buffer",
            len: usize::MAX,
        })?;
        if len == 0 {
            return Ok(Self::empty());
        }
        if decomp.active_axes() == 3 && !(decomp.m == decomp.n && decomp.n == decomp.p) {
            log::warn!(
                "halo buffers for non-cubic extents ({}, {}, {}) use the volume/thinnest-axis bound",
                decomp.m,
                decomp.n,
                decomp.p
            );
        }
        let buffers = Self {
            inbound: zeroed(len)?,
            outbound: zeroed(len)?,
        };
        log::debug!("allocated halo buffers of {len} elements");
        Ok(buffers)
    }

    pub fn empty() -> Self {
        Self {
            inbound: Vec::new(),
            outbound: Vec::new(),
        }
    }
}

impl<T> HaloBuffers<T> {
    /// Length of each buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.inbound.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty()
    }

    pub fn inbound(&self) -> &[T] {
        &self.inbound
    }

    pub fn outbound(&self) -> &[T] {
        &self.outbound
    }

    /// Both buffers at once, for packing one while reading the other.
    pub fn split_mut(&mut self) -> (&mut [T], &mut [T]) {
        (&mut self.inbound, &mut self.outbound)
    }
}

fn zeroed<T: Zero + Clone>(len: usize) -> Result<Vec<T>, GatherError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| GatherError::Allocation {
            what: "halo buffer",
            len,
        })?;
    v.resize(len, T::zero());
    Ok(v)
}
