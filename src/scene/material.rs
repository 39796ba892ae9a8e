use super::{ImageId, MaterialId};

/// What a texture slot's texture is backed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureKind {
    /// A file-backed image that can be copied next to the exported assets.
    Image(ImageId),
    /// Image bytes living inside the source file (no file to copy).
    Embedded,
    /// Anything else (procedural textures and the like).
    Procedural,
}

/// One entry of a material's texture stack.
///
/// A slot may feed several maps at once when more than one `use_*` flag is set.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSlot {
    pub name: String,
    pub enabled: bool,
    pub texture: TextureKind,
    /// Name of the UV channel to sample; `None` when the slot does not say.
    pub uv_channel: Option<String>,
    pub use_map_diffuse: bool,
    pub use_map_specular: bool,
    pub use_map_emission: bool,
    pub use_map_normal: bool,
    pub normal_factor: f32,
}

impl TextureSlot {
    pub fn image(name: &str, image: ImageId) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            texture: TextureKind::Image(image),
            uv_channel: None,
            use_map_diffuse: false,
            use_map_specular: false,
            use_map_emission: false,
            use_map_normal: false,
            normal_factor: 1.0,
        }
    }
}

/// Material as authored: colors, scalar factors and the texture stack.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMaterial {
    pub id: MaterialId,
    pub name: String,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub specular_intensity: f32,
    pub emit: f32,
    pub alpha: f32,
    pub backface_culling: bool,
    pub texture_slots: Vec<Option<TextureSlot>>,
}

impl SourceMaterial {
    pub fn new(id: MaterialId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            diffuse_color: [0.8, 0.8, 0.8],
            specular_color: [1.0, 1.0, 1.0],
            specular_intensity: 0.5,
            emit: 0.0,
            alpha: 1.0,
            backface_culling: true,
            texture_slots: Vec::new(),
        }
    }
}
