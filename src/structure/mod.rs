//! Structure styles: pure functions from frame grids to box batches.

pub mod mesh;
pub mod rigid;
pub mod timber;

pub use mesh::batch_mesh;
pub use rigid::RigidFrame;
pub use timber::TimberFrame;

use bevy::prelude::*;

use crate::voxel::FrameGrids;

/// Axis-aligned box in frame-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub center: Vec3,
    pub size: Vec3,
}

impl BoxSpec {
    pub fn new(size: Vec3, center: Vec3) -> Self { Self { center, size } }

    pub fn min(&self) -> Vec3 { self.center - self.size * 0.5 }
    pub fn max(&self) -> Vec3 { self.center + self.size * 0.5 }
}

/// Material slot of a batch; resolved to a `StandardMaterial` by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameMaterial {
    Concrete,
    Timber,
    TimberSlab,
    GroundSlab,
}

impl FrameMaterial {
    pub const ALL: [FrameMaterial; 4] = [
        FrameMaterial::Concrete,
        FrameMaterial::Timber,
        FrameMaterial::TimberSlab,
        FrameMaterial::GroundSlab,
    ];

    pub fn color(self) -> Color {
        match self {
            FrameMaterial::Concrete | FrameMaterial::GroundSlab => Color::srgb_u8(0xcc, 0xcc, 0xcc),
            FrameMaterial::Timber => Color::srgb_u8(0xfa, 0xd6, 0xa5),
            FrameMaterial::TimberSlab => Color::srgb_u8(0xff, 0xe4, 0xc4),
        }
    }
}

/// Boxes drawn as one renderable element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBatch {
    pub material: FrameMaterial,
    pub boxes: Vec<BoxSpec>,
}

impl ElementBatch {
    pub fn single(material: FrameMaterial, cuboid: BoxSpec) -> Self {
        Self { material, boxes: vec![cuboid] }
    }

    /// Vertical extent `(min_y, max_y)` over all boxes.
    pub fn vertical_extent(&self) -> (f32, f32) {
        self.boxes.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.min().y), hi.max(b.max().y))
        })
    }
}

/// Output of a structure style: load-bearing elements and the ground slab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureBatches {
    pub structure: Vec<ElementBatch>,
    pub base: Vec<ElementBatch>,
}

impl StructureBatches {
    pub fn box_count(&self) -> usize {
        self.structure.iter().chain(&self.base).map(|b| b.boxes.len()).sum()
    }
}

/// A structural style. Implementations must not touch grid state.
pub trait StructureStyle: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Emits geometry for the grids at the given voxel size.
    fn draw_structure(&self, grids: &FrameGrids, unit: Vec3) -> StructureBatches;
}

/// Centre of a column at corner `(i, k)` on storey `j`.
pub(crate) fn column_center(p: UVec3, unit: Vec3) -> Vec3 {
    Vec3::new(p.x as f32 - 0.5, p.y as f32 - 0.5, p.z as f32 - 0.5) * unit
}
