//! Selection and grouping of exportable objects.
//!
//! Only mesh objects are exported. Lights and empties are classified and counted
//! so the run can report them, then dropped; a mesh whose parent is dropped ends
//! up parented to the synthetic root.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    config::ExportConfig,
    error::ExportError,
    scene::{MeshId, ObjectId, ObjectKind, SceneSource},
};

/// A set of objects written into one model document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hierarchy {
    pub name: String,
    pub objects: Vec<ObjectId>,
}

impl Hierarchy {
    /// Groups the hierarchy's objects by shared mesh definition, in first-seen order.
    /// Each group lists every instance of that definition.
    pub fn mesh_groups(
        &self,
        source: &dyn SceneSource,
    ) -> Result<IndexMap<MeshId, Vec<ObjectId>>, ExportError> {
        let mut groups: IndexMap<MeshId, Vec<ObjectId>> = IndexMap::new();
        for &id in &self.objects {
            if let Some(mesh) = source.object(id)?.mesh() {
                groups.entry(mesh).or_default().push(id);
            }
        }
        Ok(groups)
    }
}

/// Counts of what the selection contained, by object kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub meshes: usize,
    pub lights: usize,
    pub empties: usize,
}

pub struct SceneCollector;

impl SceneCollector {
    pub fn classify(source: &dyn SceneSource, ids: &[ObjectId]) -> Result<Classification, ExportError> {
        let mut classification = Classification::default();
        for &id in ids {
            match source.object(id)?.kind {
                ObjectKind::Mesh(_) => classification.meshes += 1,
                ObjectKind::Light => classification.lights += 1,
                ObjectKind::Empty => classification.empties += 1,
            }
        }
        Ok(classification)
    }

    /// Builds the hierarchies of one export run.
    ///
    /// Single-file mode yields one hierarchy named after the configuration holding
    /// every selected mesh object. Separate mode yields one hierarchy per root mesh
    /// object (a mesh object without a selected mesh ancestor), named after it and
    /// holding its mesh descendants followed by the root itself.
    pub fn collect(source: &dyn SceneSource, config: &ExportConfig) -> Result<Vec<Hierarchy>, ExportError> {
        let selected = source.objects(config.selection);
        let classification = Self::classify(source, &selected)?;
        if classification.lights + classification.empties > 0 {
            log::info!(
                "Skipping {} light(s) and {} empty object(s)",
                classification.lights,
                classification.empties
            );
        }

        let mut candidates = Vec::with_capacity(classification.meshes);
        for id in selected {
            if source.object(id)?.mesh().is_some() {
                candidates.push(id);
            }
        }

        if !config.separate_hierarchies {
            return Ok(vec![Hierarchy {
                name: config.name.clone(),
                objects: candidates,
            }]);
        }

        let candidate_set: HashSet<ObjectId> = candidates.iter().copied().collect();
        let mut hierarchies = Vec::new();
        for &id in &candidates {
            if has_candidate_ancestor(source, id, &candidate_set)? {
                continue;
            }
            let mut objects = Vec::new();
            descendants(source, id, &candidate_set, &mut objects, &mut HashSet::new());
            objects.push(id);
            hierarchies.push(Hierarchy {
                name: source.object(id)?.name.clone(),
                objects,
            });
        }
        Ok(hierarchies)
    }
}

fn has_candidate_ancestor(
    source: &dyn SceneSource,
    id: ObjectId,
    candidates: &HashSet<ObjectId>,
) -> Result<bool, ExportError> {
    let mut seen = HashSet::from([id]);
    let mut current = source.object(id)?.parent;
    while let Some(parent) = current {
        if !seen.insert(parent) {
            log::warn!("Parent cycle detected above object {:?}", id);
            return Ok(false);
        }
        if candidates.contains(&parent) {
            return Ok(true);
        }
        current = source.object(parent)?.parent;
    }
    Ok(false)
}

/// Candidate descendants of `id`, each child's subtree before the child itself.
fn descendants(
    source: &dyn SceneSource,
    id: ObjectId,
    candidates: &HashSet<ObjectId>,
    out: &mut Vec<ObjectId>,
    visited: &mut HashSet<ObjectId>,
) {
    if !visited.insert(id) {
        return;
    }
    for child in source.children(id) {
        descendants(source, child, candidates, out, visited);
        if candidates.contains(&child) && !out.contains(&child) {
            out.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new();
        let cube = scene.add_mesh("Cube").id;
        let cone = scene.add_mesh("Cone").id;
        let a = scene.add_object("A", ObjectKind::Mesh(cube)).id;
        let lamp = scene.add_object("Lamp", ObjectKind::Light).id;
        scene.add_object("B", ObjectKind::Mesh(cone)).parent = Some(a);
        scene.add_object("C", ObjectKind::Mesh(cube)).parent = Some(lamp);
        scene.add_object("D", ObjectKind::Mesh(cube)).selected = false;
        scene
    }

    #[test]
    fn single_mode_keeps_selected_meshes_only() {
        let scene = scene();
        let hierarchies = SceneCollector::collect(&scene, &ExportConfig::default()).unwrap();
        assert_eq!(hierarchies.len(), 1);
        assert_eq!(hierarchies[0].name, "scene");
        assert_eq!(
            hierarchies[0].objects,
            vec![ObjectId(0), ObjectId(2), ObjectId(3)]
        );
    }

    #[test]
    fn separate_mode_splits_on_mesh_roots() {
        let scene = scene();
        let config = ExportConfig {
            separate_hierarchies: true,
            ..Default::default()
        };
        let hierarchies = SceneCollector::collect(&scene, &config).unwrap();
        let names: Vec<&str> = hierarchies.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(hierarchies[0].objects, vec![ObjectId(2), ObjectId(0)]);
        assert_eq!(hierarchies[1].objects, vec![ObjectId(3)]);
    }

    #[test]
    fn mesh_groups_share_definitions_in_first_seen_order() {
        let scene = scene();
        let hierarchy = Hierarchy {
            name: "all".to_string(),
            objects: vec![ObjectId(2), ObjectId(0), ObjectId(3)],
        };
        let groups = hierarchy.mesh_groups(&scene).unwrap();
        let keys: Vec<MeshId> = groups.keys().copied().collect();
        assert_eq!(keys, vec![MeshId(1), MeshId(0)]);
        assert_eq!(groups[&MeshId(0)], vec![ObjectId(0), ObjectId(3)]);
    }

    #[test]
    fn classification_counts_kinds() {
        let scene = scene();
        let ids = scene.objects(crate::scene::Selection::All);
        let classification = SceneCollector::classify(&scene, &ids).unwrap();
        assert_eq!(
            classification,
            Classification {
                meshes: 4,
                lights: 1,
                empties: 0
            }
        );
    }
}
