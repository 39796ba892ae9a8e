//! Per-submesh triangulation.
//!
//! Triangulation runs after partitioning, on each submesh's own faces, using the
//! rule the scene source offers. Vertex indices are never renumbered here.

use crate::scene::Triangulate;

use super::partition::Submesh;

/// A triangle as three corners of one source face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub face: usize,
    pub corners: [usize; 3],
}

/// A submesh's retained faces as triangles, in face order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleList {
    pub triangles: Vec<Triangle>,
}

impl TriangleList {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Source vertex indices of every triangle corner, three per triangle.
    pub fn vertex_indices<'a>(&'a self, submesh: &'a Submesh<'_>) -> impl Iterator<Item = u32> + 'a {
        self.triangles.iter().flat_map(move |triangle| {
            let face = &submesh.mesh.faces[triangle.face];
            triangle.corners.map(|corner| face.corners[corner].vertex)
        })
    }
}

pub struct Triangulator;

impl Triangulator {
    pub fn triangulate(submesh: &Submesh<'_>, rule: &dyn Triangulate) -> TriangleList {
        let mut triangles = Vec::new();
        for &face_idx in &submesh.faces {
            let face = &submesh.mesh.faces[face_idx];
            let split = rule.triangulate(face, &submesh.mesh.positions);
            if split.is_empty() {
                log::debug!("Dropping degenerate face {} of {}", face_idx, submesh.name);
            }
            triangles.extend(split.into_iter().map(|corners| Triangle {
                face: face_idx,
                corners,
            }));
        }
        TriangleList { triangles }
    }
}
