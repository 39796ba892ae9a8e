//! Instance records and the instance-to-material mapping.
//!
//! Both lists walk the submeshes in export order and, inside each submesh, its
//! instances in order. The mapping document therefore lines up entry by entry with
//! the model's `meshInstances`.

use crate::{
    document::{MappingDocument, MappingEntry, MeshInstance, NO_MATERIAL},
    error::ExportError,
    scene::{MaterialId, SceneSource},
};

use super::{hierarchy::FlatHierarchy, material::MaterialNames, partition::Submesh};

/// The material a submesh is drawn with.
///
/// Read from the first instance's object-level slot list when it has one, otherwise
/// from the mesh definition's slots. Every other instance of the submesh is assumed
/// to agree with the first one.
pub fn governing_material(source: &dyn SceneSource, submesh: &Submesh<'_>) -> Result<Option<MaterialId>, ExportError> {
    let Some(slot) = submesh.material_index() else {
        return Ok(None);
    };
    let Some(&first) = submesh.instances.first() else {
        return Ok(None);
    };
    let object = source.object(first)?;
    let slots = object
        .material_slots
        .as_deref()
        .unwrap_or(submesh.mesh.materials.as_slice());
    if slots.is_empty() {
        return Ok(None);
    }
    match slots.get(slot) {
        Some(material) => Ok(*material),
        None => {
            log::warn!(
                "Submesh {} uses material slot {} but {} has only {} slot(s)",
                submesh.name,
                slot,
                object.name,
                slots.len()
            );
            Ok(None)
        }
    }
}

pub struct InstanceLinker;

impl InstanceLinker {
    /// One record per (submesh, instance) pair. `mesh` is the submesh's position in
    /// `submeshes`, `node` the instance's node in `flat`.
    pub fn link(submeshes: &[Submesh<'_>], flat: &FlatHierarchy) -> Result<Vec<MeshInstance>, ExportError> {
        let mut records = Vec::new();
        for (mesh, submesh) in submeshes.iter().enumerate() {
            for &instance in &submesh.instances {
                let node = flat
                    .node_index(instance)
                    .ok_or(ExportError::UnknownObject(instance))?;
                records.push(MeshInstance { mesh, node });
            }
        }
        Ok(records)
    }

    /// Mapping entries in [`InstanceLinker::link`] order. `material_dir` is the
    /// material directory relative to the mesh directory, `/`-separated; documents
    /// are named by their stem in `names`.
    pub fn mapping(
        source: &dyn SceneSource,
        submeshes: &[Submesh<'_>],
        names: &MaterialNames,
        material_dir: &str,
    ) -> Result<MappingDocument, ExportError> {
        let mut mapping = Vec::new();
        for submesh in submeshes {
            let path = match governing_material(source, submesh)? {
                Some(material) => {
                    let stem = names.stem(material).ok_or(ExportError::UnknownMaterial(material))?;
                    format!("{}/{}.json", material_dir, stem)
                }
                None => NO_MATERIAL.to_string(),
            };
            mapping.extend(
                submesh
                    .instances
                    .iter()
                    .map(|_| MappingEntry { path: path.clone() }),
            );
        }
        Ok(MappingDocument { mapping })
    }
}
