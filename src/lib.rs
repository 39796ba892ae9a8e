//! scene-export
//!
//! Converts an authored 3-D scene into runtime assets: indexed triangle buffers
//! partitioned by material, a flattened transform hierarchy and small fixed-schema
//! material documents. The scene is read through a trait so the pipeline does not
//! depend on any particular authoring tool; a glTF loader is included.
//!
//! High-level modules
//! - `config`: export settings, from TOML files and command line flags
//! - `document`: serde structs of the model, mapping and material documents
//! - `error`: typed failures of scene source lookups
//! - `pipeline`: partitioning, triangulation, vertex buffers, hierarchy flattening, materials
//! - `resources`: glTF loading, image copying and output directory handling
//! - `scene`: the read-only scene source model and an in-memory implementation
//!

pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use config::ExportConfig;
pub use error::ExportError;
pub use pipeline::{ExportReport, LogObserver, SceneExporter};
pub use resources::load_scene_gltf;
pub use scene::{MemoryScene, SceneSource};
