use std::path::PathBuf;

use thiserror::Error;

use super::render_assets::{Mesh, Texture};

/// Failure to locate or fetch an asset file.
#[derive(Error, Debug)]
pub enum AssetResolveError {
    #[error("failed to create asset cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write asset to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("asset {0} not found locally and no download URL configured")]
    NotFound(String),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Resolve(#[from] AssetResolveError),
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("asset {0} is empty")]
    Empty(String),
    #[error("{0}")]
    Other(String),
}

/// Domain interface for the asset-source collaborator.
///
/// Loads are blocking; the resource cache runs them off the frame thread.
pub trait AssetSource: Send + Sync {
    fn load_mesh(&self, name: &str) -> Result<Mesh, AssetError>;
    fn load_texture(&self, name: &str) -> Result<Texture, AssetError>;
}
