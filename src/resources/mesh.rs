use anyhow::Context;

use crate::scene::{Corner, Face, MaterialId, MemoryScene, MeshId};

/**
 * glTF splits a mesh into primitives, one per material. They are merged back into
 * a single mesh definition whose material slots are the primitives, in order, so the
 * exporter can partition them again.
 *
 * UV sets become channels named `TEXCOORD_<n>`. glTF puts the texture origin at the
 * top left, the runtime expects it at the bottom left, so `v` is flipped.
 */
pub fn load_mesh(
    scene: &mut MemoryScene,
    mesh: gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
    materials: &[MaterialId],
) -> anyhow::Result<MeshId> {
    let name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Mesh.{}", mesh.index()));

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut faces = Vec::new();
    let mut slots = Vec::new();
    // Per primitive: first vertex and its UV sets.
    let mut uv_sets: Vec<Vec<Vec<[f32; 2]>>> = Vec::new();
    let mut face_ranges = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Primitive {} of mesh {} is not made of triangles ({:?}), skipping it",
                primitive.index(),
                name,
                primitive.mode()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
        let base = positions.len() as u32;
        let prim_positions: Vec<[f32; 3]> = reader
            .read_positions()
            .with_context(|| format!("Primitive {} of mesh {} has no positions", primitive.index(), name))?
            .collect();
        let count = prim_positions.len();
        match reader.read_normals() {
            Some(prim_normals) => normals.extend(prim_normals),
            None => normals.extend(std::iter::repeat_n([0.0, 0.0, 0.0], count)),
        }
        positions.extend(prim_positions);

        let mut sets = Vec::new();
        while let Some(coords) = reader.read_tex_coords(sets.len() as u32) {
            sets.push(coords.into_f32().map(|[u, v]| [u, 1.0 - v]).collect::<Vec<_>>());
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        let slot = slots.len();
        slots.push(
            primitive
                .material()
                .index()
                .and_then(|idx| materials.get(idx).copied()),
        );
        let first_face = faces.len();
        for triangle in indices.chunks_exact(3) {
            let corners = triangle.iter().map(|&i| Corner::new(base + i)).collect();
            faces.push(Face::new(corners, slot));
        }
        face_ranges.push((first_face..faces.len(), base));
        uv_sets.push(sets);
    }

    // Every corner carries one UV per channel; primitives missing a set get zeros.
    let channels = uv_sets.iter().map(Vec::len).max().unwrap_or(0);
    for ((range, base), sets) in face_ranges.into_iter().zip(&uv_sets) {
        for face in &mut faces[range] {
            for corner in &mut face.corners {
                let local = (corner.vertex - base) as usize;
                corner.uv = (0..channels)
                    .map(|set| {
                        sets.get(set)
                            .and_then(|coords| coords.get(local))
                            .copied()
                            .unwrap_or([0.0, 0.0])
                    })
                    .collect();
            }
        }
    }

    let definition = scene.add_mesh(&name);
    definition.positions = positions;
    definition.normals = normals;
    definition.uv_channels = (0..channels).map(|set| format!("TEXCOORD_{}", set)).collect();
    definition.faces = faces;
    definition.materials = slots;
    definition.validate()?;
    Ok(definition.id)
}
