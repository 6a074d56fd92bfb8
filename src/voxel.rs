//! Occupancy grid and the structural grids derived from it.
//!
//! Axes follow Bevy's convention: x is width, y is height (storeys), z is depth.

use bevy::math::UVec3;

use crate::error::{FrameError, FrameResult};

/// Dense 3D boolean grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoolGrid {
    dims: UVec3,
    cells: Vec<bool>,
}

impl BoolGrid {
    /// All-false grid of the given dimensions.
    pub fn new(dims: UVec3) -> Self {
        let len = dims.x as usize * dims.y as usize * dims.z as usize;
        Self { dims, cells: vec![false; len] }
    }

    pub fn dims(&self) -> UVec3 { self.dims }

    pub fn contains(&self, p: UVec3) -> bool {
        p.x < self.dims.x && p.y < self.dims.y && p.z < self.dims.z
    }

    /// Out-of-range cells read as empty.
    pub fn get(&self, p: UVec3) -> bool {
        self.index(p).map(|i| self.cells[i]).unwrap_or(false)
    }

    fn set(&mut self, p: UVec3) {
        if let Some(i) = self.index(p) {
            self.cells[i] = true;
        }
    }

    /// Number of set cells.
    pub fn count(&self) -> usize { self.cells.iter().filter(|c| **c).count() }

    pub fn is_empty(&self) -> bool { !self.cells.iter().any(|c| *c) }

    /// Set cells in x, y, z order.
    pub fn iter(&self) -> impl Iterator<Item = UVec3> + '_ {
        let dims = self.dims;
        (0..dims.x).flat_map(move |x| {
            (0..dims.y).flat_map(move |y| (0..dims.z).map(move |z| UVec3::new(x, y, z)))
        })
        .filter(|p| self.get(*p))
    }

    fn index(&self, p: UVec3) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        let (h, d) = (self.dims.y as usize, self.dims.z as usize);
        Some((p.x as usize * h + p.y as usize) * d + p.z as usize)
    }
}

/// Occupancy plus the column and beam grids flagged from it.
///
/// Derived grids are only ever written by [`FrameGrids::flag_voxel`], so they
/// are always a function of the occupancy grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameGrids {
    occupancy: BoolGrid,
    columns: BoolGrid,
    beams_along_width: BoolGrid,
    beams_along_depth: BoolGrid,
}

impl FrameGrids {
    /// Fresh, empty grids for a `dims` voxel frame.
    pub fn allocate(dims: UVec3) -> FrameResult<Self> {
        if dims.cmpeq(UVec3::ZERO).any() {
            return Err(FrameError::InvalidDimensions(dims));
        }
        Ok(Self {
            occupancy: BoolGrid::new(dims),
            columns: BoolGrid::new(UVec3::new(dims.x + 1, dims.y, dims.z + 1)),
            beams_along_width: BoolGrid::new(UVec3::new(dims.x, dims.y, dims.z + 1)),
            beams_along_depth: BoolGrid::new(UVec3::new(dims.x + 1, dims.y, dims.z)),
        })
    }

    /// Rebuilds the derived grids from an occupancy grid alone.
    pub fn from_occupancy(occupancy: &BoolGrid) -> FrameResult<Self> {
        let mut grids = Self::allocate(occupancy.dims())?;
        for p in occupancy.iter() {
            grids.flag_voxel(p.x, p.y, p.z)?;
        }
        Ok(grids)
    }

    pub fn dims(&self) -> UVec3 { self.occupancy.dims() }

    /// Marks a voxel filled together with its four corner columns and the
    /// four beams around its footprint.
    pub fn flag_voxel(&mut self, x: u32, y: u32, z: u32) -> FrameResult<()> {
        let p = UVec3::new(x, y, z);
        if !self.occupancy.contains(p) {
            return Err(FrameError::OutOfBounds { x, y, z, dims: self.dims() });
        }
        self.occupancy.set(p);
        self.columns.set(p);
        self.columns.set(UVec3::new(x + 1, y, z));
        self.columns.set(UVec3::new(x, y, z + 1));
        self.columns.set(UVec3::new(x + 1, y, z + 1));
        self.beams_along_width.set(p);
        self.beams_along_width.set(UVec3::new(x, y, z + 1));
        self.beams_along_depth.set(p);
        self.beams_along_depth.set(UVec3::new(x + 1, y, z));
        Ok(())
    }

    pub fn is_filled(&self, x: u32, y: u32, z: u32) -> bool {
        self.occupancy.get(UVec3::new(x, y, z))
    }

    pub fn filled_count(&self) -> usize { self.occupancy.count() }

    pub fn occupancy(&self) -> &BoolGrid { &self.occupancy }
    pub fn columns(&self) -> &BoolGrid { &self.columns }
    pub fn beams_along_width(&self) -> &BoolGrid { &self.beams_along_width }
    pub fn beams_along_depth(&self) -> &BoolGrid { &self.beams_along_depth }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sizes_derived_grids() {
        let grids = FrameGrids::allocate(UVec3::new(3, 4, 5)).unwrap();
        assert_eq!(grids.occupancy().dims(), UVec3::new(3, 4, 5));
        assert_eq!(grids.columns().dims(), UVec3::new(4, 4, 6));
        assert_eq!(grids.beams_along_width().dims(), UVec3::new(3, 4, 6));
        assert_eq!(grids.beams_along_depth().dims(), UVec3::new(4, 4, 5));
        assert_eq!(grids.filled_count(), 0);
        assert!(grids.columns().is_empty());
    }

    #[test]
    fn allocate_rejects_zero_axis() {
        let err = FrameGrids::allocate(UVec3::new(3, 0, 5)).unwrap_err();
        assert_eq!(err, FrameError::InvalidDimensions(UVec3::new(3, 0, 5)));
    }

    #[test]
    fn flagging_one_voxel_sets_corners_and_edges() {
        let mut grids = FrameGrids::allocate(UVec3::new(4, 3, 4)).unwrap();
        grids.flag_voxel(1, 2, 2).unwrap();

        assert_eq!(grids.filled_count(), 1);
        let columns: Vec<_> = grids.columns().iter().collect();
        assert_eq!(columns, vec![
            UVec3::new(1, 2, 2), UVec3::new(1, 2, 3),
            UVec3::new(2, 2, 2), UVec3::new(2, 2, 3),
        ]);
        let along_width: Vec<_> = grids.beams_along_width().iter().collect();
        assert_eq!(along_width, vec![UVec3::new(1, 2, 2), UVec3::new(1, 2, 3)]);
        let along_depth: Vec<_> = grids.beams_along_depth().iter().collect();
        assert_eq!(along_depth, vec![UVec3::new(1, 2, 2), UVec3::new(2, 2, 2)]);
    }

    #[test]
    fn flagging_far_corner_stays_in_derived_bounds() {
        let mut grids = FrameGrids::allocate(UVec3::new(2, 2, 2)).unwrap();
        grids.flag_voxel(1, 1, 1).unwrap();
        assert!(grids.columns().get(UVec3::new(2, 1, 2)));
        assert!(grids.beams_along_width().get(UVec3::new(1, 1, 2)));
        assert!(grids.beams_along_depth().get(UVec3::new(2, 1, 1)));
    }

    #[test]
    fn out_of_range_voxel_is_rejected_without_side_effects() {
        let mut grids = FrameGrids::allocate(UVec3::new(2, 2, 2)).unwrap();
        let err = grids.flag_voxel(2, 0, 0).unwrap_err();
        assert!(matches!(err, FrameError::OutOfBounds { x: 2, y: 0, z: 0, .. }));
        assert!(grids.columns().is_empty());
        assert!(grids.beams_along_depth().is_empty());
    }

    #[test]
    fn derived_grids_are_a_function_of_occupancy() {
        let mut grids = FrameGrids::allocate(UVec3::new(5, 3, 4)).unwrap();
        for (x, y, z) in [(0, 0, 0), (1, 0, 0), (4, 2, 3), (2, 1, 1), (1, 0, 0)] {
            grids.flag_voxel(x, y, z).unwrap();
        }
        let rebuilt = FrameGrids::from_occupancy(grids.occupancy()).unwrap();
        assert_eq!(rebuilt, grids);
    }
}
