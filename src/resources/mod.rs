use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::scene::{ImageId, MaterialId, MemoryScene, ObjectId, ObjectKind, TextureKind, TextureSlot, Transform};

/**
 * This module contains all logic for reading scenes and writing assets to files.
 */
pub mod mesh;
pub mod texture;

/// Reads a glTF 2.0 file (`.gltf` or `.glb`) into a [`MemoryScene`].
///
/// Every node becomes an object. Nodes reachable from the default scene (or the
/// first scene when there is no default) are selected.
pub fn load_scene_gltf(path: &Path) -> anyhow::Result<MemoryScene> {
    let gltf = gltf::Gltf::open(path).with_context(|| format!("Failed to read glTF file {}", path.display()))?;
    let base = path.parent().unwrap_or(Path::new("."));
    let buffers = gltf::import_buffers(&gltf.document, Some(base), gltf.blob.clone())
        .with_context(|| format!("Failed to load buffers of {}", path.display()))?;

    let mut scene = MemoryScene::new();

    let images = gltf
        .images()
        .map(|image| load_image(&mut scene, image, base))
        .collect::<anyhow::Result<Vec<Option<ImageId>>>>()?;

    let mut materials = Vec::new();
    for material in gltf.materials() {
        materials.push(load_material(&mut scene, material, &images));
    }

    let mut meshes = Vec::new();
    for mesh in gltf.meshes() {
        meshes.push(mesh::load_mesh(&mut scene, mesh, &buffers, &materials)?);
    }

    let scene_root = gltf.default_scene().or_else(|| gltf.scenes().next());
    let mut selected = HashSet::new();
    if let Some(root) = &scene_root {
        let mut stack: Vec<gltf::Node> = root.nodes().collect();
        while let Some(node) = stack.pop() {
            if selected.insert(node.index()) {
                stack.extend(node.children());
            }
        }
    }

    // Object ids follow node indices.
    for node in gltf.nodes() {
        let kind = match (node.mesh(), node.light()) {
            (Some(mesh), _) => ObjectKind::Mesh(meshes[mesh.index()]),
            (None, Some(_)) => ObjectKind::Light,
            (None, None) => ObjectKind::Empty,
        };
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Node.{}", node.index()));
        let (translation, rotation, scale) = node.transform().decomposed();
        let object = scene.add_object(&name, kind);
        object.transform = Transform::from_decomposed(translation, rotation, scale);
        object.selected = scene_root.is_none() || selected.contains(&node.index());
    }
    for node in gltf.nodes() {
        let parent = ObjectId(node.index() as u32);
        for child in node.children() {
            if let Some(object) = scene.object_mut(ObjectId(child.index() as u32)) {
                object.parent = Some(parent);
            }
        }
    }

    log::info!(
        "Loaded {} objects, {} meshes and {} materials from {}",
        scene.object_count(),
        scene.mesh_count(),
        scene.material_count(),
        path.display()
    );
    Ok(scene)
}

fn load_image(scene: &mut MemoryScene, image: gltf::Image<'_>, base: &Path) -> anyhow::Result<Option<ImageId>> {
    match image.source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
            Ok(Some(scene.add_image(resolve_uri(base, uri)?)))
        }
        _ => Ok(None),
    }
}

/// Image URIs are percent-encoded and relative to the glTF file.
fn resolve_uri(base: &Path, uri: &str) -> anyhow::Result<PathBuf> {
    let uri = uri.strip_prefix("file://").unwrap_or(uri);
    let decoded = percent_encoding::percent_decode_str(uri)
        .decode_utf8()
        .with_context(|| format!("Image URI {} is not valid UTF-8 once decoded", uri))?;
    Ok(base.join(&*decoded))
}

fn load_material(scene: &mut MemoryScene, material: gltf::Material<'_>, images: &[Option<ImageId>]) -> MaterialId {
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Material.{}", material.index().unwrap_or(0)));
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let emissive = material.emissive_factor();

    let mut slots = Vec::new();
    let texture_slot = |suffix: &str, texture: gltf::Texture<'_>, tex_coord: u32| {
        let kind = match images.get(texture.source().index()).copied().flatten() {
            Some(image) => TextureKind::Image(image),
            None => TextureKind::Embedded,
        };
        let mut slot = TextureSlot::image(&format!("{}_{}", name, suffix), ImageId(0));
        slot.texture = kind;
        slot.uv_channel = Some(format!("TEXCOORD_{}", tex_coord));
        slot
    };
    if let Some(info) = pbr.base_color_texture() {
        let mut slot = texture_slot("diffuse", info.texture(), info.tex_coord());
        slot.use_map_diffuse = true;
        slots.push(Some(slot));
    }
    if let Some(info) = material.normal_texture() {
        let mut slot = texture_slot("normal", info.texture(), info.tex_coord());
        slot.use_map_normal = true;
        slot.normal_factor = info.scale();
        slots.push(Some(slot));
    }
    if let Some(info) = material.emissive_texture() {
        let mut slot = texture_slot("emissive", info.texture(), info.tex_coord());
        slot.use_map_emission = true;
        slots.push(Some(slot));
    }

    let target = scene.add_material(&name);
    target.diffuse_color = [r, g, b];
    target.alpha = a;
    target.emit = emissive.into_iter().fold(0.0, f32::max);
    target.backface_culling = !material.double_sided();
    target.texture_slots = slots;
    target.id
}
