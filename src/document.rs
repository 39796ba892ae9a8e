//! Wire structs for the three document kinds written per hierarchy.
//!
//! Struct fields are declared in sorted key order and vertex attribute sets use a
//! `BTreeMap`, so every document comes out with sorted keys. Together with the
//! fixed four-space indentation this makes repeated exports byte-identical.

use std::{collections::BTreeMap, fs::File, io::BufWriter, io::Write, path::Path};

use anyhow::Context;
use serde::Serialize;

pub const MODEL_VERSION: u32 = 2;

/// Marker written into the mapping document for instances without a material.
pub const NO_MATERIAL: &str = "None";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelDocument {
    pub model: Model,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Model {
    #[serde(rename = "meshInstances")]
    pub mesh_instances: Vec<MeshInstance>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub parents: Vec<i64>,
    pub skins: Vec<Skin>,
    pub version: u32,
    pub vertices: Vec<VertexSet>,
}

/// Skinning is not exported; the list is always empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Skin {}

/// Links a node to the submesh drawn at its transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MeshInstance {
    pub mesh: usize,
    pub node: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mesh {
    pub aabb: Aabb,
    pub base: u32,
    pub count: usize,
    pub indices: Vec<u32>,
    #[serde(rename = "type")]
    pub primitive: String,
    /// Index into [`Model::vertices`].
    pub vertices: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Aabb {
    pub max: [f32; 3],
    pub min: [f32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Node {
    /// The synthetic root every model starts with.
    pub fn root() -> Self {
        Self {
            name: "RootNode".to_string(),
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// Attribute name (`position`, `normal`, `texCoordK`) to attribute data.
pub type VertexSet = BTreeMap<String, VertexAttribute>;

/// A dense float attribute array. `None` entries mark vertex slots no retained
/// face uses (padded layout only) and serialize as `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VertexAttribute {
    pub components: u32,
    pub data: Vec<Option<f32>>,
    #[serde(rename = "type")]
    pub element: String,
}

impl VertexAttribute {
    pub fn float32(components: u32, data: Vec<Option<f32>>) -> Self {
        Self {
            components,
            data,
            element: "float32".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MappingDocument {
    pub mapping: Vec<MappingEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MappingEntry {
    pub path: String,
}

/// Fixed-schema material. Optional fields are only written when they differ from
/// the runtime's defaults or when a texture feeds them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MaterialDocument {
    #[serde(rename = "bumpMapFactor", skip_serializing_if = "Option::is_none")]
    pub bump_map_factor: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cull: Option<u32>,
    pub diffuse: [f32; 3],
    #[serde(rename = "diffuseMap", skip_serializing_if = "Option::is_none")]
    pub diffuse_map: Option<String>,
    #[serde(rename = "diffuseMapUv", skip_serializing_if = "Option::is_none")]
    pub diffuse_map_uv: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive: Option<[f32; 3]>,
    #[serde(rename = "emissiveMap", skip_serializing_if = "Option::is_none")]
    pub emissive_map: Option<String>,
    #[serde(rename = "emissiveMapUv", skip_serializing_if = "Option::is_none")]
    pub emissive_map_uv: Option<usize>,
    pub mapping_format: String,
    pub name: String,
    #[serde(rename = "normalMap", skip_serializing_if = "Option::is_none")]
    pub normal_map: Option<String>,
    #[serde(rename = "normalMapUv", skip_serializing_if = "Option::is_none")]
    pub normal_map_uv: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    pub specular: [f32; 3],
    #[serde(rename = "specularMap", skip_serializing_if = "Option::is_none")]
    pub specular_map: Option<String>,
    #[serde(rename = "specularMapUv", skip_serializing_if = "Option::is_none")]
    pub specular_map_uv: Option<usize>,
}

/// Serializes `document` as UTF-8 JSON with four-space indentation.
pub fn to_json<T: Serialize>(document: &T) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;
    Ok(out)
}

/// Writes already serialized document bytes to `path`.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
