use std::path::PathBuf;

use thiserror::Error;

use crate::scene::{ImageId, MaterialId, MeshId, ObjectId};

/// Failures reading from a scene source.
///
/// These abort the hierarchy currently being exported; sibling hierarchies of the
/// same batch still run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("object {0:?} is not part of the scene")]
    UnknownObject(ObjectId),
    #[error("mesh definition {0:?} is not part of the scene")]
    UnknownMesh(MeshId),
    #[error("material {0:?} is not part of the scene")]
    UnknownMaterial(MaterialId),
    #[error("image {0:?} is not part of the scene")]
    UnknownImage(ImageId),
    #[error("image file {0} does not exist")]
    MissingImageFile(PathBuf),
    #[error("face {face} of mesh '{mesh}' references vertex {vertex} but the mesh has {count} vertices")]
    VertexOutOfRange {
        mesh: String,
        face: usize,
        vertex: u32,
        count: usize,
    },
    #[error("face {face} of mesh '{mesh}' has {found} UV coordinates per corner, expected {expected}")]
    UvChannelMismatch {
        mesh: String,
        face: usize,
        found: usize,
        expected: usize,
    },
}
