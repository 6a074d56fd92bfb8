use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use super::{BoxSpec, ElementBatch};

const VERTS_PER_BOX: usize = 24;
const INDICES_PER_BOX: usize = 36;

/// (normal, tangent u, tangent v) for each face; u x v == normal.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Merges every box of a batch into one triangle-list mesh.
pub fn batch_mesh(batch: &ElementBatch) -> Mesh {
    let n = batch.boxes.len();
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n * VERTS_PER_BOX);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n * VERTS_PER_BOX);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n * VERTS_PER_BOX);
    let mut indices: Vec<u32> = Vec::with_capacity(n * INDICES_PER_BOX);

    for cuboid in &batch.boxes {
        push_box(cuboid, &mut positions, &mut normals, &mut uvs, &mut indices);
    }

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

fn push_box(
    cuboid: &BoxSpec,
    positions: &mut Vec<[f32; 3]>,
    normals: &mut Vec<[f32; 3]>,
    uvs: &mut Vec<[f32; 2]>,
    indices: &mut Vec<u32>,
) {
    let half = cuboid.size * 0.5;
    for (normal, u, v) in FACES {
        let base = positions.len() as u32;
        let face_center = cuboid.center + normal * half;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = face_center + u * half * su + v * half * sv;
            positions.push(p.to_array());
            normals.push(normal.to_array());
            uvs.push([(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::FrameMaterial;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn merged_mesh_holds_every_box() {
        let batch = ElementBatch {
            material: FrameMaterial::Concrete,
            boxes: vec![
                BoxSpec::new(Vec3::ONE, Vec3::ZERO),
                BoxSpec::new(Vec3::new(2.0, 1.0, 4.0), Vec3::new(10.0, 0.0, 0.0)),
            ],
        };
        let mesh = batch_mesh(&batch);
        assert_eq!(mesh.count_vertices(), 48);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(72));

        let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
            panic!("missing positions");
        };
        let max_x = positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        let min_z = positions.iter().map(|p| p[2]).fold(f32::MAX, f32::min);
        assert_eq!(max_x, 11.0);
        assert_eq!(min_z, -2.0);
    }

    #[test]
    fn faces_wind_outwards() {
        let batch = ElementBatch::single(FrameMaterial::Timber, BoxSpec::new(Vec3::ONE, Vec3::ZERO));
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();
        push_box(&batch.boxes[0], &mut positions, &mut normals, &mut uvs, &mut indices);
        for tri in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(positions[tri[i] as usize]));
            let n = Vec3::from_array(normals[tri[0] as usize]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
