//! Export configuration.
//!
//! Settings can come from a TOML file, from command line flags, or both (flags win).
//! Output directories that start with `.` are relative to the scene file, not to
//! the working directory; see [`ExportConfig::resolve`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::{pipeline::vertex::VertexLayout, scene::Selection};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// File stem of the model and mapping documents in single-file mode.
    pub name: String,
    pub mesh_dir: PathBuf,
    pub material_dir: PathBuf,
    pub image_dir: PathBuf,
    /// Export every root object into its own model document.
    pub separate_hierarchies: bool,
    pub selection: Selection,
    pub vertex_layout: VertexLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            name: "scene".to_string(),
            mesh_dir: PathBuf::from("./Meshes"),
            material_dir: PathBuf::from("./Materials"),
            image_dir: PathBuf::from("./Images"),
            separate_hierarchies: false,
            selection: Selection::Selected,
            vertex_layout: VertexLayout::Padded,
        }
    }
}

impl ExportConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Invalid export configuration")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read export configuration {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse export configuration {}", path.display()))
    }

    /// Anchors output directories starting with `.` at `base` (usually the scene
    /// file's directory). Other paths are left untouched.
    pub fn resolve(mut self, base: &Path) -> Self {
        self.mesh_dir = anchor(&self.mesh_dir, base);
        self.material_dir = anchor(&self.material_dir, base);
        self.image_dir = anchor(&self.image_dir, base);
        self
    }
}

fn anchor(dir: &Path, base: &Path) -> PathBuf {
    if dir.to_string_lossy().starts_with('.') {
        base.join(dir)
    } else {
        dir.to_path_buf()
    }
}
