//! Material-based mesh partitioning.
//!
//! A mesh definition is split into one submesh per distinct material slot index
//! used by its faces. Every submesh of a definition carries the full instance list
//! of that definition, so all instances of a shared mesh are partitioned alike.

use std::collections::{BTreeSet, HashSet};

use crate::{
    error::ExportError,
    scene::{MeshDefinition, ObjectId, SceneSource},
};

/// The faces and vertices of one (mesh definition, material slot) pair.
#[derive(Clone, Debug)]
pub struct Submesh<'a> {
    pub name: String,
    pub mesh: &'a MeshDefinition,
    /// `None` for the implicit submesh of a definition without material slots.
    pub material_slot: Option<usize>,
    /// Indices into `mesh.faces`, in source order.
    pub faces: Vec<usize>,
    /// Per source vertex: is it used by a retained face?
    pub retained: Vec<bool>,
    pub instances: Vec<ObjectId>,
}

impl<'a> Submesh<'a> {
    /// Slot index of the first retained face. All faces of a submesh share it.
    pub fn material_index(&self) -> Option<usize> {
        self.faces
            .first()
            .map(|&face| self.mesh.faces[face].material_index)
    }

    pub fn retained_vertex_count(&self) -> usize {
        self.retained.iter().filter(|&&kept| kept).count()
    }
}

pub struct MaterialPartitioner;

impl MaterialPartitioner {
    /// Splits `mesh` by material slot. Submeshes come out in ascending slot order.
    pub fn partition<'a>(
        source: &dyn SceneSource,
        mesh: &'a MeshDefinition,
        instances: &[ObjectId],
    ) -> Result<Vec<Submesh<'a>>, ExportError> {
        mesh.validate()?;

        let polygons: Vec<usize> = (0..mesh.faces.len())
            .filter(|&face| mesh.faces[face].corners.len() >= 3)
            .collect();
        if polygons.len() < mesh.faces.len() {
            log::warn!(
                "Skipping {} face(s) with fewer than 3 corners in mesh {}",
                mesh.faces.len() - polygons.len(),
                mesh.name
            );
        }

        if mesh.materials.is_empty() {
            log::warn!("No materials in mesh {}", mesh.name);
            return Ok(vec![Submesh {
                name: mesh.name.clone(),
                mesh,
                material_slot: None,
                retained: retained_vertices(mesh, &polygons),
                faces: polygons,
                instances: instances.to_vec(),
            }]);
        }

        let slots: BTreeSet<usize> = polygons.iter().map(|&face| mesh.faces[face].material_index).collect();
        let single = mesh.materials.len() == 1 && slots.len() == 1;
        let mut names = HashSet::new();
        let mut submeshes = Vec::with_capacity(slots.len());
        for slot in slots {
            let faces: Vec<usize> = polygons
                .iter()
                .copied()
                .filter(|&face| mesh.faces[face].material_index == slot)
                .collect();
            let name = if single {
                mesh.name.clone()
            } else {
                unique_name(&mut names, format!("{}.{}", mesh.name, slot_name(source, mesh, slot)?))
            };
            log::debug!(
                "Submesh {} keeps {} of {} faces",
                name,
                faces.len(),
                mesh.faces.len()
            );
            submeshes.push(Submesh {
                name,
                mesh,
                material_slot: Some(slot),
                retained: retained_vertices(mesh, &faces),
                faces,
                instances: instances.to_vec(),
            });
        }
        Ok(submeshes)
    }
}

fn slot_name(source: &dyn SceneSource, mesh: &MeshDefinition, slot: usize) -> Result<String, ExportError> {
    match mesh.materials.get(slot).copied().flatten() {
        Some(material) => Ok(source.material(material)?.name.clone()),
        None => Ok(format!("slot{}", slot)),
    }
}

/// `name`, or `name.<n>` with the smallest `n` not taken yet.
pub(crate) fn unique_name(taken: &mut HashSet<String>, name: String) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}.{}", name, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn retained_vertices(mesh: &MeshDefinition, faces: &[usize]) -> Vec<bool> {
    let mut retained = vec![false; mesh.vertex_count()];
    for &face in faces {
        for vertex in mesh.faces[face].vertices() {
            retained[vertex as usize] = true;
        }
    }
    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Corner, Face, MemoryScene, ObjectKind};

    fn quad(a: u32, b: u32, c: u32, d: u32, slot: usize) -> Face {
        Face::new(vec![Corner::new(a), Corner::new(b), Corner::new(c), Corner::new(d)], slot)
    }

    /// Two quads side by side sharing the edge 1-4, one per material.
    fn two_material_scene() -> MemoryScene {
        let mut scene = MemoryScene::new();
        let red = scene.add_material("Red").id;
        let blue = scene.add_material("Blue").id;
        let mesh = scene.add_mesh("Panel");
        mesh.positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 1.0, 0.0],
        ];
        mesh.faces = vec![quad(0, 1, 4, 3, 0), quad(1, 2, 5, 4, 1)];
        mesh.materials = vec![Some(red), Some(blue)];
        let mesh = mesh.id;
        scene.add_object("Panel", ObjectKind::Mesh(mesh));
        scene.add_object("Panel.001", ObjectKind::Mesh(mesh));
        scene
    }

    #[test]
    fn one_submesh_per_used_slot() {
        let scene = two_material_scene();
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let instances = [ObjectId(0), ObjectId(1)];
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &instances).unwrap();

        assert_eq!(submeshes.len(), 2);
        assert_eq!(submeshes[0].name, "Panel.Red");
        assert_eq!(submeshes[1].name, "Panel.Blue");
        assert_eq!(submeshes[0].faces, vec![0]);
        assert_eq!(submeshes[1].faces, vec![1]);
        assert_eq!(submeshes[0].retained, vec![true, true, false, true, true, false]);
        assert_eq!(submeshes[1].retained_vertex_count(), 4);
        for submesh in &submeshes {
            assert_eq!(submesh.instances, instances.to_vec());
            let slot = submesh.material_index().unwrap();
            assert!(submesh.faces.iter().all(|&f| mesh.faces[f].material_index == slot));
        }

        let mut union: Vec<usize> = submeshes.iter().flat_map(|s| s.faces.clone()).collect();
        union.sort();
        assert_eq!(union, vec![0, 1]);
    }

    #[test]
    fn unused_slots_produce_no_submesh() {
        let mut scene = two_material_scene();
        let mesh = scene.mesh_mut(crate::scene::MeshId(0)).unwrap();
        mesh.faces[1].material_index = 0;
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();
        assert_eq!(submeshes.len(), 1);
        assert_eq!(submeshes[0].faces, vec![0, 1]);
        assert_eq!(submeshes[0].name, "Panel.Red");
    }

    #[test]
    fn single_slot_keeps_definition_name() {
        let mut scene = two_material_scene();
        let mesh = scene.mesh_mut(crate::scene::MeshId(0)).unwrap();
        mesh.materials.truncate(1);
        mesh.faces[1].material_index = 0;
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();
        assert_eq!(submeshes.len(), 1);
        assert_eq!(submeshes[0].name, "Panel");
    }

    #[test]
    fn no_slots_yield_one_implicit_submesh() {
        let mut scene = two_material_scene();
        scene.mesh_mut(crate::scene::MeshId(0)).unwrap().materials.clear();
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();
        assert_eq!(submeshes.len(), 1);
        assert_eq!(submeshes[0].material_slot, None);
        assert_eq!(submeshes[0].faces, vec![0, 1]);
        assert_eq!(submeshes[0].name, "Panel");
    }

    #[test]
    fn invalid_topology_is_fatal() {
        let mut scene = two_material_scene();
        scene.mesh_mut(crate::scene::MeshId(0)).unwrap().faces[0].corners[0].vertex = 42;
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let result = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]);
        assert!(matches!(result, Err(ExportError::VertexOutOfRange { vertex: 42, .. })));
    }

    #[test]
    fn single_slot_with_stray_face_names_both_submeshes() {
        let mut scene = two_material_scene();
        let mesh = scene.mesh_mut(crate::scene::MeshId(0)).unwrap();
        mesh.materials.truncate(1);
        mesh.faces[1].material_index = 3;
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();
        let names: Vec<&str> = submeshes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Panel.Red", "Panel.slot3"]);
    }

    #[test]
    fn same_named_materials_get_distinct_submesh_names() {
        let mut scene = two_material_scene();
        let twin = scene.add_material("Red").id;
        scene.mesh_mut(crate::scene::MeshId(0)).unwrap().materials[1] = Some(twin);
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();
        let names: Vec<&str> = submeshes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Panel.Red", "Panel.Red.1"]);
    }

    #[test]
    fn faces_without_area_are_dropped() {
        let mut scene = two_material_scene();
        let mesh = scene.mesh_mut(crate::scene::MeshId(0)).unwrap();
        mesh.positions.push([3.0, 0.0, 0.0]);
        mesh.faces.push(Face::new(vec![Corner::new(2), Corner::new(6)], 0));
        mesh.faces.push(Face::new(vec![Corner::new(6)], 5));
        let mesh = scene.mesh(crate::scene::MeshId(0)).unwrap();
        let submeshes = MaterialPartitioner::partition(&scene, mesh, &[ObjectId(0)]).unwrap();

        assert_eq!(submeshes.len(), 2);
        assert_eq!(submeshes[0].faces, vec![0]);
        assert_eq!(submeshes[0].retained, vec![true, true, false, true, true, false, false]);
        assert_eq!(submeshes[1].faces, vec![1]);
        assert!(!submeshes[1].retained[6]);
    }
}
