//! Placed scene objects and their local transforms.
//!
//! An object is one occurrence in the authored scene. Mesh objects reference a
//! shared [`MeshDefinition`](super::MeshDefinition); several objects may share the
//! same definition, each with its own transform and parent.

use cgmath::{Deg, Euler, Quaternion, Rad, Vector3};

use super::{MaterialId, MeshId, ObjectId};

/// Local transformation relative to the parent: position, Euler rotation (radians) and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build a transform from a translation, a `[x, y, z, w]` quaternion and a scale,
    /// the decomposed form interchange formats such as glTF store.
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        let quaternion: Quaternion<f32> = rotation.into();
        Self {
            position: translation.into(),
            rotation: Euler::from(quaternion),
            scale: scale.into(),
        }
    }

    pub fn position(&self) -> [f32; 3] {
        self.position.into()
    }

    /// Rotation converted from radians to degrees per axis. No axis remapping is applied.
    pub fn rotation_degrees(&self) -> [f32; 3] {
        [
            Deg::from(self.rotation.x).0,
            Deg::from(self.rotation.y).0,
            Deg::from(self.rotation.z).0,
        ]
    }

    pub fn scale(&self) -> [f32; 3] {
        self.scale.into()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// What an object is, as far as the exporter cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh(MeshId),
    Light,
    Empty,
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub selected: bool,
    /// Object-level material slots. When present they replace the slots of the
    /// mesh definition for this object.
    pub material_slots: Option<Vec<Option<MaterialId>>>,
}

impl SceneObject {
    pub fn mesh(&self) -> Option<MeshId> {
        match self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn rotation_is_reported_in_degrees() {
        let transform = Transform {
            rotation: Euler::new(Rad(FRAC_PI_2), Rad(0.0), Rad(PI)),
            ..Transform::new()
        };
        let degrees = transform.rotation_degrees();
        assert!((degrees[0] - 90.0).abs() < 1e-4);
        assert_eq!(degrees[1], 0.0);
        assert!((degrees[2] - 180.0).abs() < 1e-4);
    }

    #[test]
    fn identity_quaternion_decomposes_to_identity() {
        let transform = Transform::from_decomposed([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0]);
        assert_eq!(transform.position(), [1.0, 2.0, 3.0]);
        assert_eq!(transform.rotation_degrees(), [0.0, 0.0, 0.0]);
        assert_eq!(transform.scale(), [1.0, 1.0, 1.0]);
    }
}
