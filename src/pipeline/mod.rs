//! The scene-to-asset pipeline.
//!
//! One export run turns the selected objects of a [`SceneSource`](crate::scene::SceneSource)
//! into model, mapping and material documents. Per hierarchy the stages run in this
//! order:
//!
//! - `collector`: picks the mesh objects and splits them into hierarchies
//! - `partition`: splits every shared mesh definition into one submesh per material slot
//! - `triangulate`: turns the polygons of each submesh into triangles
//! - `vertex`: builds attribute arrays, index buffers and bounds per submesh
//! - `hierarchy`: flattens instance transforms into nodes, parents first
//! - `instancing`: links submeshes to nodes and instances to materials
//! - `material`: writes each material used by the hierarchy once
//!
//! `export` drives the stages and writes the documents; `progress` reports on it.

pub mod collector;
pub mod export;
pub mod hierarchy;
pub mod instancing;
pub mod material;
pub mod partition;
pub mod progress;
pub mod triangulate;
pub mod vertex;

pub use collector::{Hierarchy, SceneCollector};
pub use export::{ExportReport, HierarchyDocuments, HierarchyExporter, SceneExporter};
pub use progress::{LogObserver, Progress, ProgressObserver, Stage};
pub use vertex::VertexLayout;
