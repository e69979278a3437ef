use std::sync::Arc;

/// Face mesh model: opaque encoded bytes handed to the renderer as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    name: String,
    bytes: Vec<u8>,
    pub shadow_caster: bool,
    pub shadow_receiver: bool,
}

impl Mesh {
    /// Face overlays neither cast nor receive shadows.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            shadow_caster: false,
            shadow_receiver: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Decoded face mesh texture: tightly packed RGBA8 rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn new(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(
            rgba.len(),
            (width as usize) * (height as usize) * 4,
            "rgba length must equal width * height * 4"
        );
        Self {
            name: name.into(),
            width,
            height,
            rgba,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Snapshot of whatever shared assets are ready right now.
///
/// Cloning is cheap; overlays hold the same `Arc`s the cache does.
#[derive(Clone, Debug, Default)]
pub struct OverlayResources {
    pub mesh: Option<Arc<Mesh>>,
    pub texture: Option<Arc<Texture>>,
}

impl OverlayResources {
    pub fn is_complete(&self) -> bool {
        self.mesh.is_some() && self.texture.is_some()
    }
}
