//! Read-only scene source model.
//!
//! The exporter never owns the authored scene. It reads it through the
//! [`SceneSource`] trait, which mirrors what an authoring application exposes:
//!
//! - `object` holds placed objects, their kind and local transforms
//! - `mesh` holds shared mesh definitions (positions, normals, polygon faces, UV channels)
//! - `material` holds source materials and their texture slots
//! - `triangulate` holds the polygon triangulation capability of a source
//! - `memory` is an owned in-memory source with a builder API, used by loaders and tests

pub mod material;
pub mod memory;
pub mod mesh;
pub mod object;
pub mod triangulate;

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ExportError;

pub use material::{SourceMaterial, TextureKind, TextureSlot};
pub use memory::MemoryScene;
pub use mesh::{Corner, Face, MeshDefinition};
pub use object::{ObjectKind, SceneObject, Transform};
pub use triangulate::{EarClipTriangulator, FanTriangulator, Triangulate};

/// Stable, source-assigned identity of a placed object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Stable, source-assigned identity of a shared mesh definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Stable, source-assigned identity of a material.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Stable, source-assigned identity of an image referenced by a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// Which objects of a source take part in an export run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Selected,
    All,
}

/// Read access to an authored scene.
///
/// Implementations are treated as an immutable snapshot for the duration of one
/// export run. Every lookup that fails is fatal for the hierarchy being exported.
pub trait SceneSource {
    /// Object ids in stable source order, restricted by `selection`.
    fn objects(&self, selection: Selection) -> Vec<ObjectId>;

    fn object(&self, id: ObjectId) -> Result<&SceneObject, ExportError>;

    /// Direct children of `id`, in stable source order.
    fn children(&self, id: ObjectId) -> Vec<ObjectId>;

    fn mesh(&self, id: MeshId) -> Result<&MeshDefinition, ExportError>;

    fn material(&self, id: MaterialId) -> Result<&SourceMaterial, ExportError>;

    /// Absolute location of the file backing an image.
    fn image_path(&self, id: ImageId) -> Result<PathBuf, ExportError>;

    /// Polygon triangulation rule offered by this source.
    fn triangulator(&self) -> &dyn Triangulate {
        &FanTriangulator
    }
}
