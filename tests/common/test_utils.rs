use std::path::{Path, PathBuf};

use scene_export::{
    ExportConfig, MemoryScene,
    scene::{Corner, Face, MaterialId, MeshId, ObjectKind},
};

/// Output directories inside a temporary folder that lives as long as this value.
pub(crate) struct Workspace {
    pub(crate) dir: tempfile::TempDir,
    pub(crate) config: ExportConfig,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        Self::with_config(ExportConfig::default())
    }

    pub(crate) fn with_config(config: ExportConfig) -> Self {
        let dir = tempfile::tempdir().expect("temporary directory");
        let config = config.resolve(dir.path());
        Self { dir, config }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn mesh_file(&self, name: &str) -> PathBuf {
        self.config.mesh_dir.join(name)
    }

    pub(crate) fn material_file(&self, name: &str) -> PathBuf {
        self.config.material_dir.join(name)
    }

    pub(crate) fn json(&self, path: &Path) -> serde_json::Value {
        let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        serde_json::from_slice(&bytes).expect("valid json")
    }

    pub(crate) fn model(&self, name: &str) -> serde_json::Value {
        self.json(&self.mesh_file(&format!("{}.json", name)))["model"].clone()
    }

    pub(crate) fn mapping(&self, name: &str) -> Vec<String> {
        self.json(&self.mesh_file(&format!("{}.mapping.json", name)))["mapping"]
            .as_array()
            .expect("mapping list")
            .iter()
            .map(|entry| entry["path"].as_str().expect("path").to_string())
            .collect()
    }
}

pub(crate) fn quad(vertices: [u32; 4], slot: usize) -> Face {
    Face::new(vertices.iter().map(|&v| Corner::new(v)).collect(), slot)
}

pub(crate) fn quad_uv(vertices: [u32; 4], uvs: &[[[f32; 2]; 4]], slot: usize) -> Face {
    let corners = vertices
        .iter()
        .enumerate()
        .map(|(i, &v)| Corner::with_uv(v, uvs.iter().map(|channel| channel[i]).collect()))
        .collect();
    Face::new(corners, slot)
}

/// Two unit quads side by side: vertices 0..=5.
pub(crate) fn strip_positions() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [2.0, 1.0, 0.0],
    ]
}

/// A mesh definition made of two quads, one per listed material slot.
pub(crate) fn add_strip(scene: &mut MemoryScene, name: &str, materials: &[Option<MaterialId>]) -> MeshId {
    let mesh = scene.add_mesh(name);
    mesh.positions = strip_positions();
    mesh.normals = vec![[0.0, 0.0, 1.0]; 6];
    let second = if materials.len() > 1 { 1 } else { 0 };
    mesh.faces = vec![quad([0, 1, 4, 3], 0), quad([1, 2, 5, 4], second)];
    mesh.materials = materials.to_vec();
    mesh.id
}

/// One mesh definition with two material slots, placed once.
pub(crate) fn two_slot_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    let red = scene.add_material("Red").id;
    let blue = scene.add_material("Blue").id;
    let mesh = add_strip(&mut scene, "Panel", &[Some(red), Some(blue)]);
    scene.add_object("Panel", ObjectKind::Mesh(mesh));
    scene
}

/// One single-material mesh placed twice, the first placement parented to the second.
pub(crate) fn parented_pair_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    let grey = scene.add_material("Grey").id;
    let mesh = add_strip(&mut scene, "Cube", &[Some(grey)]);
    let child = scene.add_object("Child", ObjectKind::Mesh(mesh)).id;
    let parent = scene.add_object("Parent", ObjectKind::Mesh(mesh)).id;
    scene.object_mut(child).expect("child").parent = Some(parent);
    scene
}

/// Two sibling mesh definitions with partially overlapping UV channel names.
pub(crate) fn uv_channel_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    let material = scene.add_material("Painted").id;

    let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let half = [[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]];

    let both = scene.add_mesh("Both");
    both.positions = strip_positions()[..4].to_vec();
    both.normals = vec![[0.0, 0.0, 1.0]; 4];
    both.uv_channels = vec!["UVMap".to_string(), "UVMap2".to_string()];
    both.faces = vec![quad_uv([0, 1, 3, 2], &[square, half], 0)];
    both.materials = vec![Some(material)];
    let both = both.id;

    let single = scene.add_mesh("Single");
    single.positions = strip_positions()[..4].to_vec();
    single.normals = vec![[0.0, 0.0, 1.0]; 4];
    single.uv_channels = vec!["UVMap".to_string()];
    single.faces = vec![quad_uv([0, 1, 3, 2], &[square], 0)];
    single.materials = vec![Some(material)];
    let single = single.id;

    scene.add_object("Both", ObjectKind::Mesh(both));
    scene.add_object("Single", ObjectKind::Mesh(single));
    scene
}
