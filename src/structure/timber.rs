use bevy::prelude::*;

use super::{column_center, BoxSpec, ElementBatch, FrameMaterial, StructureBatches, StructureStyle};
use crate::voxel::FrameGrids;

/// Timber post-and-beam frame with inset floor panels.
#[derive(Debug, Clone, PartialEq)]
pub struct TimberFrame {
    pub slab_depth_relative: f32,
    pub gf_slab_depth_relative: f32,
    pub beam_depth_relative: f32,
    pub column_width_relative: f32,
}

impl Default for TimberFrame {
    fn default() -> Self {
        Self {
            slab_depth_relative: 0.1,
            gf_slab_depth_relative: 0.2,
            beam_depth_relative: 0.22,
            column_width_relative: 0.1,
        }
    }
}

impl StructureStyle for TimberFrame {
    fn name(&self) -> &'static str { "timber frame" }

    fn draw_structure(&self, grids: &FrameGrids, unit: Vec3) -> StructureBatches {
        let cw = self.column_width_relative;
        let mut out = StructureBatches::default();

        // floor panels sit between the beams, top face flush with the storey line
        let slab = Vec3::new(unit.x * (1.0 - cw), unit.y * self.slab_depth_relative, unit.z * (1.0 - cw));
        for p in grids.occupancy().iter() {
            let center = Vec3::new(
                p.x as f32 * unit.x,
                (p.y as f32 - self.slab_depth_relative / 2.0) * unit.y,
                p.z as f32 * unit.z,
            );
            out.structure.push(ElementBatch::single(FrameMaterial::TimberSlab, BoxSpec::new(slab, center)));
        }

        let ground = Vec3::new(
            unit.x * (1.0 + cw * 2.0),
            unit.y * self.gf_slab_depth_relative,
            unit.z * (1.0 + cw * 2.0),
        );
        for p in grids.occupancy().iter().filter(|p| p.y == 0) {
            let center = Vec3::new(p.x as f32 * unit.x, -unit.y - self.gf_slab_depth_relative, p.z as f32 * unit.z);
            out.base.push(ElementBatch::single(FrameMaterial::GroundSlab, BoxSpec::new(ground, center)));
        }

        let column = Vec3::new(unit.x * cw, unit.y, unit.z * cw);
        for p in grids.columns().iter() {
            out.structure.push(ElementBatch::single(FrameMaterial::Timber, BoxSpec::new(column, column_center(p, unit))));
        }

        let beam_y = |j: u32| (j as f32 - self.beam_depth_relative / 2.0) * unit.y;

        let along_width = Vec3::new(unit.x * (1.0 - cw), unit.y * self.beam_depth_relative, unit.z * cw);
        for p in grids.beams_along_width().iter() {
            let center = Vec3::new(p.x as f32 * unit.x, beam_y(p.y), (p.z as f32 - 0.5) * unit.z);
            out.structure.push(ElementBatch::single(FrameMaterial::Timber, BoxSpec::new(along_width, center)));
        }

        let along_depth = Vec3::new(unit.x * cw, unit.y * self.beam_depth_relative, unit.z * (1.0 - cw));
        for p in grids.beams_along_depth().iter() {
            let center = Vec3::new((p.x as f32 - 0.5) * unit.x, beam_y(p.y), p.z as f32 * unit.z);
            out.structure.push(ElementBatch::single(FrameMaterial::Timber, BoxSpec::new(along_depth, center)));
        }

        out
    }
}
