use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::capability::domain::capability_gate::{CapabilityError, CapabilityGate};
use crate::capability::domain::environment::{Environment, RenderApiVersion};
use crate::frame::frame_driver::{FrameControl, FrameListener, FrameTick};
use crate::overlay::domain::detection_registry::{DetectionRegistry, ReconcileReport};
use crate::resources::domain::asset_source::AssetSource;
use crate::resources::infrastructure::resource_cache::{ResourceCache, ResourceError};
use crate::scene::domain::scene_graph::{RenderPriority, SceneGraph};
use crate::shared::constants::{MESH_ASSET_NAME, MIN_RENDER_API_VERSION, TEXTURE_ASSET_NAME};
use crate::tracking::domain::face_tracker::FaceTracker;

use super::session_logger::SessionLogger;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Unsupported(#[from] CapabilityError),
    #[error(transparent)]
    Resources(#[from] ResourceError),
}

/// Startup parameters for an overlay session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub mesh_name: String,
    pub texture_name: String,
    pub min_render_version: RenderApiVersion,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let (major, minor) = MIN_RENDER_API_VERSION;
        Self {
            mesh_name: MESH_ASSET_NAME.to_string(),
            texture_name: TEXTURE_ASSET_NAME.to_string(),
            min_render_version: RenderApiVersion::new(major, minor),
        }
    }
}

/// Wires tracker, resource cache and registry into one per-frame update.
///
/// Constructed only through [`OverlaySession::start`], which refuses to
/// build anything on an unsupported device. Each frame it picks up any
/// finished asset loads, asks the tracker for the current faces and
/// reconciles the overlay registry against them.
pub struct OverlaySession<S: SceneGraph> {
    tracker: Box<dyn FaceTracker>,
    registry: DetectionRegistry<S>,
    resources: ResourceCache,
    logger: Box<dyn SessionLogger>,
    tracker_errors: usize,
}

impl<S: SceneGraph> OverlaySession<S> {
    /// Checks device capability, then prepares the scene and starts loading
    /// the shared assets. Nothing is created or loaded if the check fails.
    pub fn start(
        env: &dyn Environment,
        config: &SessionConfig,
        mut scene: S,
        tracker: Box<dyn FaceTracker>,
        assets: Arc<dyn AssetSource>,
        mut logger: Box<dyn SessionLogger>,
    ) -> Result<Self, SessionError> {
        CapabilityGate::new(config.min_render_version).evaluate(env)?;

        scene.set_camera_stream_render_priority(RenderPriority::First);
        let mut resources = ResourceCache::new(assets);
        resources.load_async(&config.mesh_name, &config.texture_name)?;
        logger.info("Overlay session started");

        Ok(Self {
            tracker,
            registry: DetectionRegistry::new(scene),
            resources,
            logger,
            tracker_errors: 0,
        })
    }

    /// Runs one frame. Returns `None` once the tracker has no more frames.
    pub fn step(&mut self, index: usize) -> Option<ReconcileReport> {
        let started = Instant::now();
        self.resources.poll();

        let detections = match self.tracker.update() {
            Ok(Some(detections)) => detections,
            Ok(None) => return None,
            Err(e) => {
                // Keep last frame's overlays; the next frame reconciles again.
                self.tracker_errors += 1;
                log::warn!("Tracker update failed on frame {index}: {e}");
                let report = ReconcileReport {
                    live: self.registry.len(),
                    ..ReconcileReport::default()
                };
                self.logger.frame(index, &report);
                return Some(report);
            }
        };

        let report = self
            .registry
            .reconcile(&detections, &self.resources.current());
        self.logger
            .timing("frame", started.elapsed().as_secs_f64() * 1000.0);
        self.logger.frame(index, &report);
        Some(report)
    }

    /// Detaches every overlay and emits the logger summary.
    pub fn finish(mut self) -> S
    where
        S: Default,
    {
        self.registry.clear();
        self.logger.summary();
        std::mem::take(self.registry.scene_mut())
    }

    pub fn registry(&self) -> &DetectionRegistry<S> {
        &self.registry
    }

    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceCache {
        &mut self.resources
    }

    pub fn tracker_errors(&self) -> usize {
        self.tracker_errors
    }
}

impl<S: SceneGraph> FrameListener for OverlaySession<S> {
    fn on_update(&mut self, tick: &FrameTick) -> FrameControl {
        match self.step(tick.index) {
            Some(_) => FrameControl::Continue,
            None => FrameControl::Stop,
        }
    }
}
