//! Material documents.
//!
//! Materials are collected once per hierarchy, keyed by identity in first-seen
//! order, and translated into the fixed material schema. Each gets a file stem
//! unique within the hierarchy, so same-named materials do not share a document. Texture images are handed
//! to an [`ImageStore`]; the document only keeps the stored image's relative path.

use std::collections::HashSet;

use anyhow::Context;
use indexmap::IndexMap;

use crate::{
    document::MaterialDocument,
    error::ExportError,
    resources::texture::ImageStore,
    scene::{MaterialId, SceneSource, SourceMaterial, TextureKind, TextureSlot},
};

use super::{
    instancing::governing_material,
    partition::{Submesh, unique_name},
    vertex::UvChannelList,
};

/// Governing materials of a hierarchy in first-seen order with their document file stems.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialNames {
    stems: IndexMap<MaterialId, String>,
}

impl MaterialNames {
    pub fn stem(&self, material: MaterialId) -> Option<&str> {
        self.stems.get(&material).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &str)> + '_ {
        self.stems.iter().map(|(&id, stem)| (id, stem.as_str()))
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }
}

pub struct MaterialExporter<'a> {
    channels: &'a UvChannelList,
    /// Image directory relative to the material directory, `/`-separated.
    image_dir: String,
}

impl<'a> MaterialExporter<'a> {
    pub fn new(channels: &'a UvChannelList, image_dir: impl Into<String>) -> Self {
        Self {
            channels,
            image_dir: image_dir.into(),
        }
    }

    /// Governing materials of `submeshes`, each listed once, in first-seen order.
    ///
    /// A material keeps its name as file stem unless an earlier one already took
    /// it; later ones become `<name>.1`, `<name>.2` and so on.
    pub fn collect(source: &dyn SceneSource, submeshes: &[Submesh<'_>]) -> Result<MaterialNames, ExportError> {
        let mut names = MaterialNames::default();
        let mut taken = HashSet::new();
        for submesh in submeshes {
            let Some(material) = governing_material(source, submesh)? else {
                continue;
            };
            if names.stems.contains_key(&material) {
                continue;
            }
            let name = &source.material(material)?.name;
            let stem = unique_name(&mut taken, name.clone());
            if &stem != name {
                log::warn!("Material {} is exported as {} since another material has its name", name, stem);
            }
            names.stems.insert(material, stem);
        }
        Ok(names)
    }

    /// Translates `material` into the document written as `<stem>.json`.
    pub fn export(
        &self,
        source: &dyn SceneSource,
        material: &SourceMaterial,
        stem: &str,
        images: &mut dyn ImageStore,
    ) -> anyhow::Result<MaterialDocument> {
        let mut document = MaterialDocument {
            diffuse: material.diffuse_color,
            specular: material.specular_color.map(|c| c * material.specular_intensity),
            mapping_format: "path".to_string(),
            name: stem.to_string(),
            ..Default::default()
        };
        if material.emit != 0.0 {
            document.emissive = Some(material.diffuse_color.map(|c| c * material.emit));
        }
        if material.alpha != 1.0 {
            document.opacity = Some(material.alpha);
        }
        if !material.backface_culling {
            document.cull = Some(0);
        }

        for slot in material.texture_slots.iter().flatten() {
            if !slot.enabled {
                continue;
            }
            let image = match slot.texture {
                TextureKind::Image(image) => image,
                TextureKind::Embedded => {
                    log::warn!(
                        "Texture {} of material {} has no image file, skipping it",
                        slot.name,
                        material.name
                    );
                    continue;
                }
                TextureKind::Procedural => continue,
            };
            let path = source.image_path(image)?;
            let stored = images
                .store(&path, &slot.name)
                .with_context(|| format!("Failed to copy texture {} of material {}", slot.name, material.name))?;
            let path = format!("{}/{}", self.image_dir, stored);
            self.apply_slot(&mut document, slot, path);
        }
        Ok(document)
    }

    fn apply_slot(&self, document: &mut MaterialDocument, slot: &TextureSlot, path: String) {
        let uv = self.uv_index(slot);
        if slot.use_map_diffuse {
            document.diffuse_map = Some(path.clone());
            document.diffuse_map_uv = Some(uv);
        }
        if slot.use_map_emission {
            document.emissive_map = Some(path.clone());
            document.emissive_map_uv = Some(uv);
        }
        if slot.use_map_specular {
            document.specular_map = Some(path.clone());
            document.specular_map_uv = Some(uv);
        }
        if slot.use_map_normal {
            document.normal_map = Some(path);
            document.normal_map_uv = Some(uv);
            document.bump_map_factor = Some(slot.normal_factor);
        }
    }

    fn uv_index(&self, slot: &TextureSlot) -> usize {
        match slot.uv_channel.as_deref() {
            Some(name) => self.channels.index_of(name).unwrap_or_else(|| {
                log::warn!("Texture {} samples unknown UV channel {}, using 0", slot.name, name);
                0
            }),
            None => {
                log::warn!("Unspecific UV reference in texture {}", slot.name);
                0
            }
        }
    }
}
