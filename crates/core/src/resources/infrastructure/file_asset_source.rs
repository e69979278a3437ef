use std::fs;

use crate::resources::domain::asset_source::{AssetError, AssetSource};
use crate::resources::domain::render_assets::{Mesh, Texture};

use super::asset_resolver::AssetResolver;

/// Loads assets from files located by an [`AssetResolver`].
///
/// Meshes are passed through as raw bytes; textures are decoded to RGBA8.
pub struct FileAssetSource {
    resolver: AssetResolver,
}

impl FileAssetSource {
    pub fn new(resolver: AssetResolver) -> Self {
        Self { resolver }
    }
}

impl AssetSource for FileAssetSource {
    fn load_mesh(&self, name: &str) -> Result<Mesh, AssetError> {
        let path = self.resolver.resolve(name)?;
        let bytes = fs::read(&path).map_err(|e| AssetError::Read {
            path: path.clone(),
            source: e,
        })?;
        if bytes.is_empty() {
            return Err(AssetError::Empty(name.to_string()));
        }
        log::debug!("Loaded mesh {name} ({} bytes) from {}", bytes.len(), path.display());
        Ok(Mesh::new(name, bytes))
    }

    fn load_texture(&self, name: &str) -> Result<Texture, AssetError> {
        let path = self.resolver.resolve(name)?;
        let img = image::open(&path)
            .map_err(|e| AssetError::Decode {
                name: name.to_string(),
                source: e,
            })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        log::debug!("Loaded texture {name} ({width}x{height}) from {}", path.display());
        Ok(Texture::new(name, width, height, img.into_raw()))
    }
}
