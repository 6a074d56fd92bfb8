use bevy::prelude::*;

use super::{column_center, BoxSpec, ElementBatch, FrameMaterial, StructureBatches, StructureStyle};
use crate::voxel::FrameGrids;

/// Reinforced-concrete frame: merged slabs per storey and square columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidFrame {
    /// Slab thickness as a share of the storey height.
    pub slab_depth_relative: f32,
    /// Column width as a share of the bay size; slabs overhang by the same.
    pub column_width_relative: f32,
}

impl Default for RigidFrame {
    fn default() -> Self {
        Self { slab_depth_relative: 0.2, column_width_relative: 0.1 }
    }
}

impl StructureStyle for RigidFrame {
    fn name(&self) -> &'static str { "rigid frame" }

    fn draw_structure(&self, grids: &FrameGrids, unit: Vec3) -> StructureBatches {
        let dims = grids.dims();
        let cw = self.column_width_relative;
        let mut out = StructureBatches::default();

        let slab = Vec3::new(unit.x * (1.0 + cw), unit.y * self.slab_depth_relative, unit.z * (1.0 + cw));
        for j in 0..dims.y {
            let boxes: Vec<BoxSpec> = grids
                .occupancy()
                .iter()
                .filter(|p| p.y == j)
                .map(|p| BoxSpec::new(slab, p.as_vec3() * unit))
                .collect();
            if !boxes.is_empty() {
                out.structure.push(ElementBatch { material: FrameMaterial::Concrete, boxes });
            }
        }

        let ground = Vec3::new(unit.x * (1.0 + cw * 2.0), unit.y * self.slab_depth_relative, unit.z * (1.0 + cw * 2.0));
        for p in grids.occupancy().iter().filter(|p| p.y == 0) {
            let center = Vec3::new(p.x as f32 * unit.x, -unit.y, p.z as f32 * unit.z);
            out.base.push(ElementBatch::single(FrameMaterial::Concrete, BoxSpec::new(ground, center)));
        }

        let column = Vec3::new(unit.x * cw, unit.y, unit.z * cw);
        for p in grids.columns().iter() {
            out.structure.push(ElementBatch::single(FrameMaterial::Concrete, BoxSpec::new(column, column_center(p, unit))));
        }

        out
    }
}
