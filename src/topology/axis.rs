//! Grid axes, geometry tags and the slot-order policy for extents tables.

use serde::{Deserialize, Serialize};

/// One of the grid's three native storage axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Coordinate system of the structured grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridGeometry {
    #[default]
    Cartesian,
    /// Native axes store (axial, radial, angular) coordinates.
    Cylindrical,
}

/// Order in which native axes fill the extents-table slots.
///
/// Cylindrical runs report (radial, angular, axial), which live in the
/// native (y, z, x) arrays. The permutation is applied identically to the
/// minimum and maximum slot groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrder {
    Native,
    Cylindrical,
}

impl AxisOrder {
    /// Select the policy for a run with `active_axes` dimensions.
    ///
    /// Remapping only exists for three-dimensional cylindrical grids.
    pub fn select(geometry: GridGeometry, active_axes: usize) -> Self {
        match (geometry, active_axes) {
            (GridGeometry::Cylindrical, 3) => AxisOrder::Cylindrical,
            _ => AxisOrder::Native,
        }
    }

    /// The native axis backing each slot position, for the first
    /// `active_axes` positions.
    pub fn axes(self, active_axes: usize) -> &'static [Axis] {
        const NATIVE: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
        const CYLINDRICAL: [Axis; 3] = [Axis::Y, Axis::Z, Axis::X];
        let all = match self {
            AxisOrder::Native => &NATIVE,
            AxisOrder::Cylindrical => &CYLINDRICAL,
        };
        &all[..active_axes.min(3)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylindrical_only_remaps_in_three_dimensions() {
        assert_eq!(
            AxisOrder::select(GridGeometry::Cylindrical, 2),
            AxisOrder::Native
        );
        assert_eq!(
            AxisOrder::select(GridGeometry::Cylindrical, 3).axes(3),
            &[Axis::Y, Axis::Z, Axis::X]
        );
        assert_eq!(
            AxisOrder::select(GridGeometry::Cartesian, 3).axes(2),
            &[Axis::X, Axis::Y]
        );
    }
}
