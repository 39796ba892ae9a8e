use crate::error::ExportError;

use super::{MaterialId, MeshId};

/// One polygon corner ("loop"): the vertex it uses and one UV per channel of the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Corner {
    pub vertex: u32,
    pub uv: Vec<[f32; 2]>,
}

impl Corner {
    pub fn new(vertex: u32) -> Self {
        Self {
            vertex,
            uv: Vec::new(),
        }
    }

    pub fn with_uv(vertex: u32, uv: Vec<[f32; 2]>) -> Self {
        Self { vertex, uv }
    }
}

/// An arbitrary polygon with its material slot index.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub corners: Vec<Corner>,
    pub material_index: usize,
}

impl Face {
    pub fn new(corners: Vec<Corner>, material_index: usize) -> Self {
        Self {
            corners,
            material_index,
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.corners.iter().map(|corner| corner.vertex)
    }
}

/// Shared geometry template referenced by one or more mesh objects.
///
/// Positions and normals are per vertex, UVs are per corner. `uv_channels` names the
/// channels in the order corners store them. `materials` is the ordered list of
/// material slots faces index into; a slot may be empty.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshDefinition {
    pub id: MeshId,
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uv_channels: Vec<String>,
    pub faces: Vec<Face>,
    pub materials: Vec<Option<MaterialId>>,
}

impl MeshDefinition {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn normal(&self, vertex: u32) -> [f32; 3] {
        self.normals
            .get(vertex as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0])
    }

    /// Checks that every face only references existing vertices and carries one UV
    /// per channel on each corner.
    pub fn validate(&self) -> Result<(), ExportError> {
        let count = self.positions.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            for corner in &face.corners {
                if corner.vertex as usize >= count {
                    return Err(ExportError::VertexOutOfRange {
                        mesh: self.name.clone(),
                        face: face_idx,
                        vertex: corner.vertex,
                        count,
                    });
                }
                if corner.uv.len() != self.uv_channels.len() {
                    return Err(ExportError::UvChannelMismatch {
                        mesh: self.name.clone(),
                        face: face_idx,
                        found: corner.uv.len(),
                        expected: self.uv_channels.len(),
                    });
                }
            }
        }
        Ok(())
    }
}
