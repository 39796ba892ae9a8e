//! An owned, in-memory [`SceneSource`].
//!
//! Loaders build one of these from interchange files; tests build them by hand.
//! Ids are handed out sequentially in insertion order, which is also the order
//! [`SceneSource::objects`] and [`SceneSource::children`] report.

use std::path::PathBuf;

use crate::error::ExportError;

use super::{
    FanTriangulator, ImageId, MaterialId, MeshDefinition, MeshId, ObjectId, ObjectKind,
    SceneObject, SceneSource, Selection, SourceMaterial, Transform, Triangulate,
};

pub struct MemoryScene {
    objects: Vec<SceneObject>,
    meshes: Vec<MeshDefinition>,
    materials: Vec<SourceMaterial>,
    images: Vec<PathBuf>,
    triangulator: Box<dyn Triangulate + Send + Sync>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            images: Vec::new(),
            triangulator: Box::new(FanTriangulator),
        }
    }

    pub fn with_triangulator(mut self, triangulator: impl Triangulate + Send + Sync + 'static) -> Self {
        self.triangulator = Box::new(triangulator);
        self
    }

    pub fn add_image(&mut self, path: impl Into<PathBuf>) -> ImageId {
        let id = ImageId(self.images.len() as u32);
        self.images.push(path.into());
        id
    }

    pub fn add_material(&mut self, name: &str) -> &mut SourceMaterial {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(SourceMaterial::new(id, name));
        let idx = self.materials.len() - 1;
        &mut self.materials[idx]
    }

    /// Adds an empty mesh definition; fill in its geometry through the returned reference.
    pub fn add_mesh(&mut self, name: &str) -> &mut MeshDefinition {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(MeshDefinition {
            id,
            name: name.to_string(),
            positions: Vec::new(),
            normals: Vec::new(),
            uv_channels: Vec::new(),
            faces: Vec::new(),
            materials: Vec::new(),
        });
        let idx = self.meshes.len() - 1;
        &mut self.meshes[idx]
    }

    /// Adds a selected, unparented object with an identity transform.
    pub fn add_object(&mut self, name: &str, kind: ObjectKind) -> &mut SceneObject {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(SceneObject {
            id,
            name: name.to_string(),
            kind,
            transform: Transform::new(),
            parent: None,
            selected: true,
            material_slots: None,
        });
        let idx = self.objects.len() - 1;
        &mut self.objects[idx]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0 as usize)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut MeshDefinition> {
        self.meshes.get_mut(id.0 as usize)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut SourceMaterial> {
        self.materials.get_mut(id.0 as usize)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn find_object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneSource for MemoryScene {
    fn objects(&self, selection: Selection) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|object| selection == Selection::All || object.selected)
            .map(|object| object.id)
            .collect()
    }

    fn object(&self, id: ObjectId) -> Result<&SceneObject, ExportError> {
        self.objects
            .get(id.0 as usize)
            .ok_or(ExportError::UnknownObject(id))
    }

    fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|object| object.parent == Some(id))
            .map(|object| object.id)
            .collect()
    }

    fn mesh(&self, id: MeshId) -> Result<&MeshDefinition, ExportError> {
        self.meshes
            .get(id.0 as usize)
            .ok_or(ExportError::UnknownMesh(id))
    }

    fn material(&self, id: MaterialId) -> Result<&SourceMaterial, ExportError> {
        self.materials
            .get(id.0 as usize)
            .ok_or(ExportError::UnknownMaterial(id))
    }

    fn image_path(&self, id: ImageId) -> Result<PathBuf, ExportError> {
        self.images
            .get(id.0 as usize)
            .cloned()
            .ok_or(ExportError::UnknownImage(id))
    }

    fn triangulator(&self) -> &dyn Triangulate {
        self.triangulator.as_ref()
    }
}
