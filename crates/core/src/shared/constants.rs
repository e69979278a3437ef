pub const MESH_ASSET_NAME: &str = "fox_face.glb";
pub const TEXTURE_ASSET_NAME: &str = "fox_face_mesh_texture.png";

/// Minimum render API version (OpenGL ES equivalent) required to draw overlays.
pub const MIN_RENDER_API_VERSION: (u32, u32) = (3, 0);

/// Default frame rate of the fixed-rate driver.
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 30;
