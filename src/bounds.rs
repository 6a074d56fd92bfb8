//! Bounding box of the occupied volume and the camera placement derived from it.

use bevy::prelude::*;

use crate::constants::{CAMERA_DISTANCE_FACTOR, CAMERA_MIN_DISTANCE};
use crate::voxel::BoolGrid;

/// World-space box around the occupied voxels. Starts empty (min > max).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for FrameBounds {
    fn default() -> Self { Self::EMPTY }
}

impl FrameBounds {
    pub const EMPTY: Self = Self { min: Vec3::INFINITY, max: Vec3::NEG_INFINITY };

    pub fn is_empty(&self) -> bool {
        self.max.cmplt(self.min).any()
    }

    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Zero for an empty box.
    pub fn center(&self) -> Vec3 {
        if self.is_empty() { Vec3::ZERO } else { (self.min + self.max) * 0.5 }
    }

    /// Zero for an empty box.
    pub fn size(&self) -> Vec3 {
        if self.is_empty() { Vec3::ZERO } else { self.max - self.min }
    }
}

/// Expands a box over every filled voxel.
///
/// Each voxel contributes `(i + 0.5, j, k + 0.5)` and `(i - 0.5, j - 1, k - 0.5)`
/// scaled by the unit size.
pub fn compute_bounding_box(occupancy: &BoolGrid, unit: Vec3) -> FrameBounds {
    let mut bounds = FrameBounds::EMPTY;
    for p in occupancy.iter() {
        let (i, j, k) = (p.x as f32, p.y as f32, p.z as f32);
        bounds.expand_by_point(Vec3::new(i + 0.5, j, k + 0.5) * unit);
        bounds.expand_by_point(Vec3::new(i - 0.5, j - 1.0, k - 0.5) * unit);
    }
    bounds
}

/// Where the camera sits relative to the pivot after framing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPlacement {
    /// Horizontal distance along +z.
    pub distance: f32,
    pub height: f32,
}

impl CameraPlacement {
    pub fn for_bounds(bounds: &FrameBounds) -> Self {
        let size = bounds.size();
        let max_dim = size.x.max(size.y).max(size.z);
        Self {
            distance: (max_dim * CAMERA_DISTANCE_FACTOR).max(CAMERA_MIN_DISTANCE),
            height: size.y,
        }
    }

    pub fn translation(&self) -> Vec3 { Vec3::new(0.0, self.height, self.distance) }

    /// Orbit radius and pitch for a camera looking at the origin from here.
    pub fn orbit(&self) -> (f32, f32) {
        (self.translation().length(), self.height.atan2(self.distance))
    }
}

/// Offset applied to the structure and base containers so the box centre
/// lands on the pivot.
pub fn centering_offset(bounds: &FrameBounds) -> Vec3 { -bounds.center() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::FrameGrids;
    use bevy::math::UVec3;

    const UNIT: Vec3 = Vec3::new(7.0, 3.5, 7.0);

    #[test]
    fn empty_grid_yields_empty_box() {
        let grids = FrameGrids::allocate(UVec3::splat(4)).unwrap();
        let bounds = compute_bounding_box(grids.occupancy(), UNIT);
        assert!(bounds.is_empty());
        assert_eq!(bounds.size(), Vec3::ZERO);
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn full_grid_spans_whole_extent() {
        let mut grids = FrameGrids::allocate(UVec3::new(2, 3, 4)).unwrap();
        for x in 0..2 {
            for y in 0..3 {
                for z in 0..4 {
                    grids.flag_voxel(x, y, z).unwrap();
                }
            }
        }
        let bounds = compute_bounding_box(grids.occupancy(), UNIT);
        assert_eq!(bounds.min, Vec3::new(-3.5, -3.5, -3.5));
        assert_eq!(bounds.max, Vec3::new(10.5, 7.0, 24.5));
        assert_eq!(bounds.size(), Vec3::new(14.0, 10.5, 28.0));
    }

    #[test]
    fn single_voxel_box_is_asymmetric_vertically() {
        let mut grids = FrameGrids::allocate(UVec3::splat(3)).unwrap();
        grids.flag_voxel(1, 1, 1).unwrap();
        let bounds = compute_bounding_box(grids.occupancy(), Vec3::ONE);
        assert_eq!(bounds.min, Vec3::new(0.5, 0.0, 0.5));
        assert_eq!(bounds.max, Vec3::new(1.5, 1.0, 1.5));
        assert_eq!(centering_offset(&bounds), Vec3::new(-1.0, -0.5, -1.0));
    }

    #[test]
    fn camera_distance_has_a_floor() {
        let placement = CameraPlacement::for_bounds(&FrameBounds::EMPTY);
        assert_eq!(placement.distance, 1.5);
        assert_eq!(placement.height, 0.0);

        let bounds = FrameBounds { min: Vec3::ZERO, max: Vec3::new(10.0, 4.0, 20.0) };
        let placement = CameraPlacement::for_bounds(&bounds);
        assert!((placement.distance - 24.0).abs() < 1e-4);
        assert_eq!(placement.height, 4.0);
        let (radius, pitch) = placement.orbit();
        assert!((radius - (24.0f32 * 24.0 + 16.0).sqrt()).abs() < 1e-4);
        assert!(pitch > 0.0);
    }
}
