//! Flattening of instance transforms into an index-addressed node list.
//!
//! Node 0 is always the synthetic root. Every other node is one distinct instance
//! object, and a node's parent always sits at a lower index than the node itself.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::{
    document::Node,
    error::ExportError,
    scene::{ObjectId, SceneSource},
};

use super::partition::Submesh;

/// The `nodes` and `parents` arrays of a model plus the node index of every instance.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatHierarchy {
    pub nodes: Vec<Node>,
    pub parents: Vec<i64>,
    node_of: IndexMap<ObjectId, usize>,
}

impl FlatHierarchy {
    pub fn node_index(&self, object: ObjectId) -> Option<usize> {
        self.node_of.get(&object).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct HierarchyFlattener;

impl HierarchyFlattener {
    /// Collects the distinct instances of `submeshes` (per submesh, per instance) and
    /// places them parents first. Apart from that constraint discovery order is kept.
    pub fn flatten(source: &dyn SceneSource, submeshes: &[Submesh<'_>]) -> Result<FlatHierarchy, ExportError> {
        let mut discovered: Vec<ObjectId> = Vec::new();
        let mut seen = HashSet::new();
        for submesh in submeshes {
            for &instance in &submesh.instances {
                if seen.insert(instance) {
                    discovered.push(instance);
                }
            }
        }

        let mut order = Vec::with_capacity(discovered.len());
        let mut placed = HashSet::new();
        for &id in &discovered {
            place(source, id, &seen, &mut placed, &mut HashSet::new(), &mut order)?;
        }

        let mut flat = FlatHierarchy {
            nodes: vec![Node::root()],
            parents: vec![-1],
            node_of: IndexMap::new(),
        };
        // Name -> first node carrying it.
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for id in order {
            let object = source.object(id)?;
            let parent = match object.parent {
                Some(parent) => {
                    let name = &source.object(parent)?.name;
                    by_name.get(name).copied().unwrap_or(0)
                }
                None => 0,
            };
            let index = flat.nodes.len();
            flat.nodes.push(Node {
                name: object.name.clone(),
                position: object.transform.position(),
                rotation: object.transform.rotation_degrees(),
                scale: object.transform.scale(),
            });
            flat.parents.push(parent as i64);
            flat.node_of.insert(id, index);
            by_name.entry(object.name.clone()).or_insert(index);
        }
        Ok(flat)
    }
}

/// Appends `id` to `order` after its exported ancestors.
fn place(
    source: &dyn SceneSource,
    id: ObjectId,
    exported: &HashSet<ObjectId>,
    placed: &mut HashSet<ObjectId>,
    visiting: &mut HashSet<ObjectId>,
    order: &mut Vec<ObjectId>,
) -> Result<(), ExportError> {
    if placed.contains(&id) {
        return Ok(());
    }
    if !visiting.insert(id) {
        log::warn!("Parent cycle through object {:?}, attaching it to the root", id);
        return Ok(());
    }
    if let Some(parent) = source.object(id)?.parent {
        if exported.contains(&parent) {
            place(source, parent, exported, placed, visiting, order)?;
        }
    }
    if placed.insert(id) {
        order.push(id);
    }
    Ok(())
}
