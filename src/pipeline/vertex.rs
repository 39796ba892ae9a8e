//! Vertex buffer construction.
//!
//! Each submesh gets its own attribute set (`position`, `normal`, `texCoordK`) and a
//! flat index buffer. UV channel numbers come from a [`UvChannelList`] shared by the
//! whole hierarchy, so `texCoordK` names the same channel in every submesh of a file.

use serde::Deserialize;

use crate::{
    document::{Aabb, Mesh, VertexAttribute, VertexSet},
    scene::MeshDefinition,
};

use super::{partition::Submesh, triangulate::TriangleList};

/// How attribute arrays relate to the source vertex numbering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexLayout {
    /// Arrays keep one slot per source vertex. Slots of vertices no retained face uses
    /// are written as `null`; indices are source vertex indices.
    #[default]
    Padded,
    /// Only retained vertices are written, renumbered in source order, and the index
    /// buffer is remapped to match.
    Compact,
}

/// Ordered distinct UV channel names of one hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UvChannelList {
    names: Vec<String>,
}

impl UvChannelList {
    /// Collects channel names in first-seen order over `meshes`.
    pub fn collect<'a>(meshes: impl IntoIterator<Item = &'a MeshDefinition>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for mesh in meshes {
            for name in &mesh.uv_channels {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        Self { names }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub struct VertexBufferBuilder<'a> {
    channels: &'a UvChannelList,
    layout: VertexLayout,
}

impl<'a> VertexBufferBuilder<'a> {
    pub fn new(channels: &'a UvChannelList, layout: VertexLayout) -> Self {
        Self { channels, layout }
    }

    /// Builds the mesh record and attribute set of `submesh`. The mesh record points
    /// at `vertex_set`, the slot the caller will store the attribute set in.
    pub fn build(&self, submesh: &Submesh<'_>, triangles: &TriangleList, vertex_set: usize) -> (Mesh, VertexSet) {
        let source = submesh.mesh;

        // Source vertex -> output slot.
        let slots: Vec<Option<u32>> = match self.layout {
            VertexLayout::Padded => (0..source.vertex_count() as u32).map(Some).collect(),
            VertexLayout::Compact => {
                let mut next = 0u32;
                submesh
                    .retained
                    .iter()
                    .map(|&kept| {
                        kept.then(|| {
                            next += 1;
                            next - 1
                        })
                    })
                    .collect()
            }
        };
        let len = match self.layout {
            VertexLayout::Padded => source.vertex_count(),
            VertexLayout::Compact => submesh.retained_vertex_count(),
        };

        let mut positions = vec![None; len * 3];
        let mut normals = vec![None; len * 3];
        for (vertex, &kept) in submesh.retained.iter().enumerate() {
            let Some(slot) = slots[vertex].filter(|_| kept) else {
                continue;
            };
            let slot = slot as usize;
            let position = source.positions[vertex];
            let normal = source.normal(vertex as u32);
            for axis in 0..3 {
                positions[slot * 3 + axis] = Some(position[axis]);
                normals[slot * 3 + axis] = Some(normal[axis]);
            }
        }

        let mut attributes = VertexSet::new();
        attributes.insert("position".to_string(), VertexAttribute::float32(3, positions));
        attributes.insert("normal".to_string(), VertexAttribute::float32(3, normals));

        for (local, name) in source.uv_channels.iter().enumerate() {
            let Some(global) = self.channels.index_of(name) else {
                log::warn!("UV channel {} of {} is not in the channel list", name, source.name);
                continue;
            };
            let mut data = vec![None; len * 2];
            // Corners sharing a vertex overwrite each other; the last one wins.
            for &face in &submesh.faces {
                for corner in &source.faces[face].corners {
                    if let Some(slot) = slots[corner.vertex as usize] {
                        let [u, v] = corner.uv[local];
                        data[slot as usize * 2] = Some(u);
                        data[slot as usize * 2 + 1] = Some(v);
                    }
                }
            }
            attributes.insert(format!("texCoord{}", global), VertexAttribute::float32(2, data));
        }

        let indices: Vec<u32> = triangles
            .vertex_indices(submesh)
            .filter_map(|vertex| slots[vertex as usize])
            .collect();

        let mesh = Mesh {
            aabb: bounding_box(submesh),
            base: 0,
            count: indices.len(),
            indices,
            primitive: "triangles".to_string(),
            vertices: vertex_set,
        };
        (mesh, attributes)
    }
}

/// Bounds of every vertex on a retained face. All zero for an empty submesh.
pub fn bounding_box(submesh: &Submesh<'_>) -> Aabb {
    let mut retained = submesh
        .retained
        .iter()
        .enumerate()
        .filter(|(_, kept)| **kept)
        .map(|(vertex, _)| submesh.mesh.positions[vertex]);
    let Some(first) = retained.next() else {
        return Aabb {
            max: [0.0; 3],
            min: [0.0; 3],
        };
    };
    let (mut min, mut max) = (first, first);
    for p in retained {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    Aabb { max, min }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::triangulate::Triangulator,
        scene::{Corner, Face, FanTriangulator, MeshId, ObjectId},
    };

    /// A unit quad (slot 0) plus a far away triangle (slot 1), with one UV channel.
    fn mesh() -> MeshDefinition {
        let uv = |u: f32, v: f32| vec![[u, v]];
        MeshDefinition {
            id: MeshId(0),
            name: "Sign".to_string(),
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 2.0, -1.0],
                [0.0, 2.0, 0.0],
                [5.0, 5.0, 5.0],
                [6.0, 5.0, 5.0],
                [6.0, 6.0, 5.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 7],
            uv_channels: vec!["UVMap2".to_string()],
            faces: vec![
                Face::new(
                    vec![
                        Corner::with_uv(0, uv(0.0, 0.0)),
                        Corner::with_uv(1, uv(1.0, 0.0)),
                        Corner::with_uv(2, uv(1.0, 1.0)),
                        Corner::with_uv(3, uv(0.0, 1.0)),
                    ],
                    0,
                ),
                Face::new(
                    vec![
                        Corner::with_uv(4, uv(0.5, 0.5)),
                        Corner::with_uv(5, uv(0.5, 0.5)),
                        Corner::with_uv(6, uv(0.5, 0.5)),
                    ],
                    1,
                ),
            ],
            materials: vec![None, None],
        }
    }

    fn quad_submesh(mesh: &MeshDefinition) -> Submesh<'_> {
        Submesh {
            name: "Sign.A".to_string(),
            mesh,
            material_slot: Some(0),
            faces: vec![0],
            retained: vec![true, true, true, true, false, false, false],
            instances: vec![ObjectId(0)],
        }
    }

    fn channels() -> UvChannelList {
        UvChannelList {
            names: vec!["UVMap".to_string(), "UVMap2".to_string()],
        }
    }

    #[test]
    fn channel_list_is_first_seen_and_distinct() {
        let mut first = mesh();
        first.uv_channels = vec!["UVMap".to_string(), "UVMap2".to_string()];
        let mut second = mesh();
        second.uv_channels = vec!["Lightmap".to_string(), "UVMap".to_string()];
        let list = UvChannelList::collect([&first, &second]);
        assert_eq!(list.names(), ["UVMap", "UVMap2", "Lightmap"]);
        assert_eq!(list.index_of("Lightmap"), Some(2));
        assert_eq!(list.index_of("missing"), None);
    }

    #[test]
    fn padded_layout_keeps_source_numbering() {
        let mesh = mesh();
        let submesh = quad_submesh(&mesh);
        let triangles = Triangulator::triangulate(&submesh, &FanTriangulator);
        let channels = channels();
        let (record, attributes) = VertexBufferBuilder::new(&channels, VertexLayout::Padded).build(&submesh, &triangles, 4);

        assert_eq!(record.vertices, 4);
        assert_eq!(record.primitive, "triangles");
        assert_eq!(record.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(record.count, 3 * triangles.len());

        let position = &attributes["position"];
        assert_eq!(position.components, 3);
        assert_eq!(position.data.len(), 7 * 3);
        assert_eq!(position.data[6..9], [Some(1.0), Some(2.0), Some(-1.0)]);
        assert!(position.data[12..].iter().all(Option::is_none));

        // Channel "UVMap2" is global channel 1 even though it is this mesh's only channel.
        assert!(!attributes.contains_key("texCoord0"));
        let uv = &attributes["texCoord1"];
        assert_eq!(uv.data.len(), 7 * 2);
        assert_eq!(uv.data[4..6], [Some(1.0), Some(1.0)]);
    }

    #[test]
    fn compact_layout_renumbers_retained_vertices() {
        let mesh = mesh();
        let submesh = Submesh {
            faces: vec![1],
            retained: vec![false, false, false, false, true, true, true],
            ..quad_submesh(&mesh)
        };
        let triangles = Triangulator::triangulate(&submesh, &FanTriangulator);
        let channels = channels();
        let (record, attributes) = VertexBufferBuilder::new(&channels, VertexLayout::Compact).build(&submesh, &triangles, 0);

        assert_eq!(record.indices, vec![0, 1, 2]);
        assert_eq!(attributes["position"].data.len(), 9);
        assert!(attributes["normal"].data.iter().all(Option::is_some));
        assert_eq!(attributes["position"].data[0], Some(5.0));
    }

    #[test]
    fn bounds_track_min_and_max_separately() {
        let mesh = mesh();
        let aabb = bounding_box(&quad_submesh(&mesh));
        assert_eq!(aabb.min, [0.0, 0.0, -1.0]);
        assert_eq!(aabb.max, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn empty_submesh_has_zero_bounds_and_no_indices() {
        let mesh = mesh();
        let submesh = Submesh {
            faces: vec![],
            retained: vec![false; 7],
            ..quad_submesh(&mesh)
        };
        let triangles = Triangulator::triangulate(&submesh, &FanTriangulator);
        let channels = channels();
        let (record, _) = VertexBufferBuilder::new(&channels, VertexLayout::Padded).build(&submesh, &triangles, 0);
        assert_eq!(record.count, 0);
        assert_eq!(record.aabb.min, [0.0; 3]);
        assert_eq!(record.aabb.max, [0.0; 3]);
    }
}
