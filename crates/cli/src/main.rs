mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use face_overlay_core::capability::domain::environment::{RenderApiVersion, TrackerAvailability};
use face_overlay_core::capability::infrastructure::wgpu_environment::WgpuEnvironment;
use face_overlay_core::frame::frame_driver::FixedRateFrameDriver;
use face_overlay_core::resources::domain::asset_source::AssetSource;
use face_overlay_core::resources::infrastructure::asset_resolver::AssetResolver;
use face_overlay_core::resources::infrastructure::file_asset_source::FileAssetSource;
use face_overlay_core::scene::infrastructure::in_memory_scene::InMemoryScene;
use face_overlay_core::session::overlay_session::{OverlaySession, SessionConfig};
use face_overlay_core::session::session_logger::StdoutSessionLogger;
use face_overlay_core::tracking::infrastructure::scripted_tracker::ScriptedTracker;

use settings::Settings;

/// Attaches a 3D overlay to every tracked face.
#[derive(Parser)]
#[command(name = "face-overlay")]
struct Cli {
    /// Tracker script (JSON list of per-frame face states).
    script: PathBuf,

    /// Mesh asset name (defaults to the saved setting).
    #[arg(long)]
    mesh: Option<String>,

    /// Texture asset name (defaults to the saved setting).
    #[arg(long)]
    texture: Option<String>,

    /// Directory searched for assets before downloading.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Base URL to download missing assets from.
    #[arg(long, conflicts_with = "offline")]
    asset_url: Option<String>,

    /// Never download missing assets, even if a download URL is saved.
    #[arg(long)]
    offline: bool,

    /// Frame rate of the update loop.
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many frames even if the script continues.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Minimum render API version, e.g. 3.0.
    #[arg(long)]
    min_render_version: Option<String>,

    /// Tracker availability to report to the capability check.
    #[arg(long, value_enum, default_value = "supported")]
    tracker: TrackerArg,

    /// Block up to this many milliseconds for assets before the first frame.
    #[arg(long)]
    wait_assets_ms: Option<u64>,

    /// Persist every effective setting (asset names, assets dir, download
    /// URL, fps, minimum render version) as the new defaults.
    #[arg(long)]
    save_settings: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TrackerArg {
    Supported,
    Unknown,
    NotCapable,
}

impl From<TrackerArg> for TrackerAvailability {
    fn from(arg: TrackerArg) -> Self {
        match arg {
            TrackerArg::Supported => TrackerAvailability::Supported,
            TrackerArg::Unknown => TrackerAvailability::Unknown,
            TrackerArg::NotCapable => TrackerAvailability::NotCapable,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = apply_overrides(Settings::load(), &cli);
    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Saved settings to {}", path.display());
    }
    let config = session_config(&settings)?;

    let tracker = ScriptedTracker::from_file(&cli.script)?;
    log::info!(
        "Loaded tracker script with {} frames",
        tracker.total_frames()
    );

    let env = WgpuEnvironment::probe(cli.tracker.into());
    let assets = build_asset_source(&settings)?;

    let mut session = OverlaySession::start(
        &env,
        &config,
        InMemoryScene::new(),
        Box::new(tracker),
        assets,
        Box::new(StdoutSessionLogger::new()),
    )?;

    if let Some(ms) = cli.wait_assets_ms {
        if !session.resources_mut().wait_settled(Duration::from_millis(ms)) {
            log::warn!("Assets still loading after {ms}ms, starting without them");
        }
    }

    let mut driver = FixedRateFrameDriver::new(settings.fps);
    if let Some(max) = cli.max_frames {
        driver = driver.with_max_frames(max);
    }
    let frames = driver.run(&mut session, &AtomicBool::new(false));

    let failures: Vec<String> = session
        .resources()
        .failures()
        .into_iter()
        .map(str::to_string)
        .collect();
    let tracker_errors = session.tracker_errors();
    let scene = session.finish();

    eprintln!(
        "Ran {frames} frames: {} overlays attached, {} detached, {tracker_errors} tracker errors",
        scene.attach_count(),
        scene.detach_count()
    );
    if !failures.is_empty() {
        eprintln!("Assets failed to load: {}", failures.join(", "));
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(mesh) = &cli.mesh {
        settings.mesh = mesh.clone();
    }
    if let Some(texture) = &cli.texture {
        settings.texture = texture.clone();
    }
    if let Some(dir) = &cli.assets_dir {
        settings.assets_dir = Some(dir.clone());
    }
    if let Some(url) = &cli.asset_url {
        settings.asset_url = Some(url.clone());
    }
    if cli.offline {
        settings.asset_url = None;
    }
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if let Some(version) = &cli.min_render_version {
        settings.min_render_version = version.clone();
    }
    settings
}

fn session_config(settings: &Settings) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let min_render_version: RenderApiVersion =
        settings.min_render_version.parse().map_err(|_| {
            format!(
                "Minimum render version must look like 3.0, got '{}'",
                settings.min_render_version
            )
        })?;
    Ok(SessionConfig {
        mesh_name: settings.mesh.clone(),
        texture_name: settings.texture.clone(),
        min_render_version,
    })
}

fn build_asset_source(
    settings: &Settings,
) -> Result<Arc<dyn AssetSource>, Box<dyn std::error::Error>> {
    let mut resolver = AssetResolver::with_default_cache()?.with_progress(Box::new(download_progress));
    if let Some(dir) = &settings.assets_dir {
        resolver = resolver.with_bundled_dir(dir.clone());
    }
    if let Some(url) = &settings.asset_url {
        resolver = resolver.with_base_url(url.clone());
    }
    Ok(Arc::new(FileAssetSource::new(resolver)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.script.exists() {
        return Err(format!("Tracker script not found: {}", cli.script.display()).into());
    }
    if let Some(dir) = &cli.assets_dir {
        if !dir.is_dir() {
            return Err(format!("Assets directory not found: {}", dir.display()).into());
        }
    }
    if let Some(fps) = cli.fps {
        if !(1..=240).contains(&fps) {
            return Err(format!("Frame rate must be between 1 and 240, got {fps}").into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    if let Some(url) = &cli.asset_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("--asset-url must be an http(s) URL, got '{url}'").into());
        }
    }
    for (flag, name) in [("--mesh", &cli.mesh), ("--texture", &cli.texture)] {
        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(format!("{flag} must not be empty").into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading overlay assets... {pct}%");
    } else {
        eprint!("\rDownloading overlay assets... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn cli_for(script: &NamedTempFile, extra: &[&str]) -> Cli {
        let mut args = vec!["face-overlay", script.path().to_str().unwrap()];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let script = NamedTempFile::new().unwrap();
        assert!(validate(&cli_for(&script, &[])).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_script() {
        let cli = Cli::parse_from(["face-overlay", "/definitely/not/here.json"]);
        let err = validate(&cli).unwrap_err().to_string();
        assert!(err.contains("Tracker script not found"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_fps() {
        let script = NamedTempFile::new().unwrap();
        assert!(validate(&cli_for(&script, &["--fps", "0"])).is_err());
        assert!(validate(&cli_for(&script, &["--fps", "500"])).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_frames_and_blank_names() {
        let script = NamedTempFile::new().unwrap();
        assert!(validate(&cli_for(&script, &["--max-frames", "0"])).is_err());
        assert!(validate(&cli_for(&script, &["--mesh", " "])).is_err());
    }

    #[test]
    fn test_overrides_replace_settings() {
        let script = NamedTempFile::new().unwrap();
        let cli = cli_for(
            &script,
            &["--mesh", "cat.glb", "--fps", "60", "--offline"],
        );
        let settings = apply_overrides(Settings::default(), &cli);
        assert_eq!(settings.mesh, "cat.glb");
        assert_eq!(settings.fps, 60);
        assert!(settings.asset_url.is_none());
        assert_eq!(settings.texture, Settings::default().texture);
    }

    #[test]
    fn test_downloads_are_opt_in() {
        let script = NamedTempFile::new().unwrap();
        let settings = apply_overrides(Settings::default(), &cli_for(&script, &[]));
        assert!(settings.asset_url.is_none());

        let cli = cli_for(&script, &["--asset-url", "https://assets.example/v1"]);
        assert!(validate(&cli).is_ok());
        let settings = apply_overrides(Settings::default(), &cli);
        assert_eq!(settings.asset_url.as_deref(), Some("https://assets.example/v1"));
    }

    #[test]
    fn test_offline_overrides_saved_url() {
        let script = NamedTempFile::new().unwrap();
        let saved = Settings {
            asset_url: Some("https://assets.example/v1".to_string()),
            ..Settings::default()
        };
        let settings = apply_overrides(saved, &cli_for(&script, &["--offline"]));
        assert!(settings.asset_url.is_none());
    }

    #[test]
    fn test_validate_rejects_non_http_asset_url() {
        let script = NamedTempFile::new().unwrap();
        assert!(validate(&cli_for(&script, &["--asset-url", "ftp://x"])).is_err());
    }

    #[test]
    fn test_save_settings_help_names_every_saved_field() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let help = cmd
            .get_arguments()
            .find(|a| a.get_id() == "save_settings")
            .and_then(|a| a.get_help())
            .map(|h| h.to_string())
            .unwrap();
        for field in ["asset names", "assets dir", "download", "fps", "render version"] {
            assert!(help.contains(field), "help text misses {field}: {help}");
        }
    }

    #[test]
    fn test_session_config_parses_version() {
        let settings = Settings {
            min_render_version: "3.1".to_string(),
            ..Settings::default()
        };
        let config = session_config(&settings).unwrap();
        assert_eq!(config.min_render_version, RenderApiVersion::new(3, 1));
    }

    #[test]
    fn test_session_config_rejects_bad_version() {
        let settings = Settings {
            min_render_version: "three".to_string(),
            ..Settings::default()
        };
        assert!(session_config(&settings).is_err());
    }

    #[test]
    fn test_tracker_arg_maps_to_availability() {
        assert_eq!(
            TrackerAvailability::from(TrackerArg::NotCapable),
            TrackerAvailability::NotCapable
        );
    }
}
