use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    config::ExportConfig,
    document::{MODEL_VERSION, MappingDocument, MaterialDocument, Model, ModelDocument, to_json, write_bytes},
    resources::texture::{FsImageStore, ImageStore, prepare_directories, relative_path},
    scene::{MeshDefinition, SceneSource},
};

use super::{
    collector::{Hierarchy, SceneCollector},
    hierarchy::HierarchyFlattener,
    instancing::InstanceLinker,
    material::MaterialExporter,
    partition::MaterialPartitioner,
    progress::{Progress, ProgressObserver, Stage},
    triangulate::Triangulator,
    vertex::{UvChannelList, VertexBufferBuilder},
};

/// Every document produced for one hierarchy, ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyDocuments {
    pub name: String,
    pub model: ModelDocument,
    pub mapping: MappingDocument,
    pub materials: Vec<MaterialDocument>,
}

impl HierarchyDocuments {
    /// Writes `<name>.json` and `<name>.mapping.json` into the mesh directory and one
    /// `<material>.json` per material into the material directory. Returns the
    /// written paths.
    ///
    /// Every file is first written next to its target as `*.partial`; targets are
    /// only replaced once all of them are on disk.
    pub fn write(&self, config: &ExportConfig) -> anyhow::Result<Vec<PathBuf>> {
        let mut staged = Vec::with_capacity(2 + self.materials.len());
        staged.push((config.mesh_dir.join(format!("{}.json", self.name)), to_json(&self.model)?));
        staged.push((
            config.mesh_dir.join(format!("{}.mapping.json", self.name)),
            to_json(&self.mapping)?,
        ));
        for material in &self.materials {
            staged.push((config.material_dir.join(format!("{}.json", material.name)), to_json(material)?));
        }

        let mut partials: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (target, bytes) in &staged {
            let partial = partial_path(target);
            if let Err(err) = write_bytes(&partial, bytes) {
                discard(&partials);
                return Err(err);
            }
            partials.push(partial);
        }
        for ((target, _), partial) in staged.iter().zip(&partials) {
            std::fs::rename(partial, target)
                .with_context(|| format!("Failed to move {} to {}", partial.display(), target.display()))?;
        }
        Ok(staged.into_iter().map(|(target, _)| target).collect())
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

fn discard(partials: &[PathBuf]) {
    for partial in partials {
        if let Err(err) = std::fs::remove_file(partial) {
            log::warn!("Could not remove {}: {}", partial.display(), err);
        }
    }
}

/// Runs the pipeline for one hierarchy.
pub struct HierarchyExporter<'a> {
    source: &'a dyn SceneSource,
    config: &'a ExportConfig,
}

impl<'a> HierarchyExporter<'a> {
    pub fn new(source: &'a dyn SceneSource, config: &'a ExportConfig) -> Self {
        Self { source, config }
    }

    /// Builds the documents of `hierarchy`. Texture images are copied into `images`
    /// along the way; nothing else touches the file system.
    pub fn build(
        &self,
        hierarchy: &Hierarchy,
        images: &mut dyn ImageStore,
        observer: &mut dyn ProgressObserver,
    ) -> anyhow::Result<HierarchyDocuments> {
        let source = self.source;

        stage(observer, hierarchy, Stage::Partitioning);
        let groups = hierarchy.mesh_groups(source)?;
        let mut definitions: Vec<&MeshDefinition> = Vec::with_capacity(groups.len());
        for &mesh in groups.keys() {
            definitions.push(source.mesh(mesh)?);
        }
        let mut submeshes = Vec::new();
        for (definition, instances) in definitions.iter().copied().zip(groups.values()) {
            let parts = MaterialPartitioner::partition(source, definition, instances)
                .with_context(|| format!("Failed to partition mesh {}", definition.name))?;
            submeshes.extend(parts);
        }

        stage(observer, hierarchy, Stage::BuildingBuffers);
        let channels = UvChannelList::collect(definitions.iter().copied());
        let builder = VertexBufferBuilder::new(&channels, self.config.vertex_layout);
        let mut meshes = Vec::with_capacity(submeshes.len());
        let mut vertices = Vec::with_capacity(submeshes.len());
        for submesh in &submeshes {
            let triangles = Triangulator::triangulate(submesh, source.triangulator());
            let (mesh, attributes) = builder.build(submesh, &triangles, vertices.len());
            log::debug!(
                "Submesh {}: {} triangles, {} of {} vertices",
                submesh.name,
                triangles.len(),
                submesh.retained_vertex_count(),
                submesh.mesh.vertex_count()
            );
            meshes.push(mesh);
            vertices.push(attributes);
        }

        stage(observer, hierarchy, Stage::Flattening);
        let flat = HierarchyFlattener::flatten(source, &submeshes)?;
        let mesh_instances = InstanceLinker::link(&submeshes, &flat)?;
        let names = MaterialExporter::collect(source, &submeshes)?;
        let material_dir = relative_path(&self.config.mesh_dir, &self.config.material_dir)?;
        let mapping = InstanceLinker::mapping(source, &submeshes, &names, &material_dir)?;

        stage(observer, hierarchy, Stage::Materials);
        let image_dir = relative_path(&self.config.material_dir, &self.config.image_dir)?;
        let exporter = MaterialExporter::new(&channels, image_dir);
        let mut materials = Vec::with_capacity(names.len());
        for (id, stem) in names.iter() {
            let material = source.material(id)?;
            materials.push(exporter.export(source, material, stem, images)?);
        }

        let model = ModelDocument {
            model: Model {
                mesh_instances,
                meshes,
                nodes: flat.nodes,
                parents: flat.parents,
                skins: Vec::new(),
                version: MODEL_VERSION,
                vertices,
            },
        };
        Ok(HierarchyDocuments {
            name: hierarchy.name.clone(),
            model,
            mapping,
            materials,
        })
    }
}

/// Outcome of a batch: which hierarchies made it and which did not.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub exported: Vec<String>,
    pub failed: Vec<(String, anyhow::Error)>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Exports every hierarchy of a scene.
///
/// Hierarchies are independent: a failing one is logged and reported, the rest of
/// the batch still runs.
pub struct SceneExporter<'a> {
    config: &'a ExportConfig,
    observer: Box<dyn ProgressObserver + 'a>,
}

impl<'a> SceneExporter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            observer: Box::new(()),
        }
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn export(&mut self, source: &dyn SceneSource) -> anyhow::Result<ExportReport> {
        prepare_directories(self.config)?;
        let mut images = FsImageStore::new(&self.config.image_dir);
        self.export_with(source, &mut images)
    }

    /// Like [`SceneExporter::export`] but copies images into `images`. Output
    /// directories are expected to exist.
    pub fn export_with(&mut self, source: &dyn SceneSource, images: &mut dyn ImageStore) -> anyhow::Result<ExportReport> {
        let hierarchies = SceneCollector::collect(source, self.config)?;
        let total = hierarchies.len();
        let mut report = ExportReport::default();
        for (index, hierarchy) in hierarchies.iter().enumerate() {
            self.observer.notify(&Progress::Hierarchy {
                index,
                total,
                name: hierarchy.name.clone(),
            });
            let ok = match self.export_hierarchy(source, hierarchy, images) {
                Ok(written) => {
                    log::debug!("{} wrote {} file(s)", hierarchy.name, written.len());
                    report.exported.push(hierarchy.name.clone());
                    true
                }
                Err(err) => {
                    log::error!("Failed to export {}: {:#}", hierarchy.name, err);
                    report.failed.push((hierarchy.name.clone(), err));
                    false
                }
            };
            self.observer.notify(&Progress::Finished {
                name: hierarchy.name.clone(),
                ok,
            });
        }
        Ok(report)
    }

    fn export_hierarchy(
        &mut self,
        source: &dyn SceneSource,
        hierarchy: &Hierarchy,
        images: &mut dyn ImageStore,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let documents = HierarchyExporter::new(source, self.config).build(hierarchy, images, self.observer.as_mut())?;
        stage(self.observer.as_mut(), hierarchy, Stage::Writing);
        documents.write(self.config)
    }
}

fn stage(observer: &mut dyn ProgressObserver, hierarchy: &Hierarchy, stage: Stage) {
    observer.notify(&Progress::Stage {
        hierarchy: hierarchy.name.clone(),
        stage,
    });
}
