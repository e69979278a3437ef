use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::resources::domain::asset_source::AssetResolveError;

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Finds asset files by name, downloading them into a cache if needed.
///
/// Resolution order:
/// 1. Cache directory
/// 2. Bundled directory (development checkouts / packaged installs)
/// 3. Download from `{base_url}/{name}` into the cache
pub struct AssetResolver {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
    base_url: Option<String>,
    progress: Option<ProgressFn>,
}

impl AssetResolver {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            bundled_dir: None,
            base_url: None,
            progress: None,
        }
    }

    /// Resolver rooted at the platform cache directory.
    pub fn with_default_cache() -> Result<Self, AssetResolveError> {
        Ok(Self::new(asset_cache_dir()?))
    }

    pub fn with_bundled_dir(mut self, dir: PathBuf) -> Self {
        self.bundled_dir = Some(dir);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, AssetResolveError> {
        let cached_path = self.cache_dir.join(name);
        if cached_path.exists() {
            return Ok(cached_path);
        }

        if let Some(dir) = &self.bundled_dir {
            let bundled_path = dir.join(name);
            if bundled_path.exists() {
                return Ok(bundled_path);
            }
        }

        let Some(base_url) = &self.base_url else {
            return Err(AssetResolveError::NotFound(name.to_string()));
        };
        fs::create_dir_all(&self.cache_dir).map_err(AssetResolveError::CacheDir)?;
        let url = format!("{base_url}/{name}");
        log::info!("Downloading asset {name} from {url}");
        download(&url, &cached_path, self.progress.as_ref())?;
        Ok(cached_path)
    }
}

/// Platform-specific asset cache directory.
///
/// - macOS: `~/Library/Application Support/Face Overlay/assets/`
/// - Linux: `$XDG_CACHE_HOME/Face Overlay/assets/` or `~/.cache/Face Overlay/assets/`
/// - Windows: `%LOCALAPPDATA%/Face Overlay/assets/`
pub fn asset_cache_dir() -> Result<PathBuf, AssetResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Face Overlay").join("assets"))
            .ok_or(AssetResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Face Overlay").join("assets"))
            .ok_or(AssetResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), AssetResolveError> {
    let temp_path = part_path(dest);

    let result = download_inner(url, dest, &temp_path, progress);

    // Clean up .part file on any error
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

/// `fox.glb` -> `fox.glb.part`, so assets sharing a stem never share a
/// temp file while downloading in parallel.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<&ProgressFn>,
) -> Result<(), AssetResolveError> {
    let mut response = reqwest::blocking::get(url).map_err(|e| AssetResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;
    if !response.status().is_success() {
        return Err(AssetResolveError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let write_err = |e| AssetResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::create(temp_path).map_err(write_err)?;

    let mut downloaded: u64 = 0;
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| AssetResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
