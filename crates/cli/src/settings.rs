use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use face_overlay_core::shared::constants::{
    DEFAULT_FRAMES_PER_SECOND, MESH_ASSET_NAME, MIN_RENDER_API_VERSION, TEXTURE_ASSET_NAME,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default = "default_texture")]
    pub texture: String,
    /// Where missing assets are downloaded from. Downloads are off unless set.
    #[serde(default)]
    pub asset_url: Option<String>,
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_min_render_version")]
    pub min_render_version: String,
}

fn default_mesh() -> String {
    MESH_ASSET_NAME.to_string()
}

fn default_texture() -> String {
    TEXTURE_ASSET_NAME.to_string()
}

fn default_fps() -> u32 {
    DEFAULT_FRAMES_PER_SECOND
}

fn default_min_render_version() -> String {
    let (major, minor) = MIN_RENDER_API_VERSION;
    format!("{major}.{minor}")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mesh: default_mesh(),
            texture: default_texture(),
            asset_url: None,
            assets_dir: None,
            fps: default_fps(),
            min_render_version: default_min_render_version(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceOverlay").join("settings.json"))
    }

    /// Loads persisted settings, falling back to defaults on any problem.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> io::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mesh, MESH_ASSET_NAME);
        assert_eq!(settings.fps, 30);
        assert_eq!(settings.min_render_version, "3.0");
        assert!(settings.asset_url.is_none());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            fps: 60,
            assets_dir: Some(PathBuf::from("/opt/assets")),
            asset_url: Some("http://assets.local/v1".to_string()),
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps": 15 }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.fps, 15);
        assert_eq!(settings.texture, TEXTURE_ASSET_NAME);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            Settings::load_from(&dir.path().join("absent.json")),
            Settings::default()
        );
    }
}
