use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use thiserror::Error;

use crate::resources::domain::asset_source::{AssetError, AssetSource};
use crate::resources::domain::render_assets::{Mesh, OverlayResources, Texture};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource loading has already been started")]
    AlreadyStarted,
}

/// One-shot completion handle for an asset loading on a worker thread.
///
/// The worker sends exactly one result; the owner polls without blocking.
pub struct PendingAsset<T> {
    name: String,
    rx: Receiver<Result<T, AssetError>>,
}

impl<T: Send + 'static> PendingAsset<T> {
    fn spawn<F>(name: &str, load: F) -> Self
    where
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let spawned = thread::Builder::new()
            .name(format!("asset-{name}"))
            .spawn(move || {
                let _ = tx.send(load());
            });
        if let Err(e) = spawned {
            // The sender was dropped with the closure; `try_take` reports it.
            log::error!("Failed to spawn loader for {name}: {e}");
        }
        Self {
            name: name.to_string(),
            rx,
        }
    }
}

impl<T> PendingAsset<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the result if the load finished, without blocking.
    pub fn try_take(&self) -> Option<Result<T, AssetError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.loader_gone())),
        }
    }

    fn take_timeout(&self, timeout: Duration) -> Option<Result<T, AssetError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.loader_gone())),
        }
    }

    fn loader_gone(&self) -> AssetError {
        AssetError::Other(format!("loader for {} exited without a result", self.name))
    }
}

/// Starts loading the mesh and the texture in parallel.
///
/// The two results complete independently and are only joined where they
/// are consumed.
pub fn load_async(
    source: Arc<dyn AssetSource>,
    mesh_name: &str,
    texture_name: &str,
) -> (PendingAsset<Mesh>, PendingAsset<Texture>) {
    let mesh_source = source.clone();
    let mesh_key = mesh_name.to_string();
    let mesh = PendingAsset::spawn(mesh_name, move || mesh_source.load_mesh(&mesh_key));

    let texture_key = texture_name.to_string();
    let texture = PendingAsset::spawn(texture_name, move || source.load_texture(&texture_key));

    (mesh, texture)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

enum AssetSlot<T> {
    Unloaded,
    Loading(PendingAsset<T>),
    Ready(Arc<T>),
    Failed { name: String, reason: String },
}

impl<T> AssetSlot<T> {
    fn status(&self) -> AssetStatus {
        match self {
            AssetSlot::Unloaded => AssetStatus::Unloaded,
            AssetSlot::Loading(_) => AssetStatus::Loading,
            AssetSlot::Ready(_) => AssetStatus::Ready,
            AssetSlot::Failed { .. } => AssetStatus::Failed,
        }
    }

    fn ready(&self) -> Option<Arc<T>> {
        match self {
            AssetSlot::Ready(asset) => Some(asset.clone()),
            _ => None,
        }
    }

    /// Moves a finished load into `Ready`/`Failed`. Returns true on transition.
    fn settle(&mut self, kind: &str, wait: Option<Duration>) -> bool {
        let AssetSlot::Loading(pending) = self else {
            return false;
        };
        let outcome = match wait {
            Some(timeout) => pending.take_timeout(timeout),
            None => pending.try_take(),
        };
        let Some(result) = outcome else {
            return false;
        };
        let name = pending.name().to_string();
        *self = match result {
            Ok(asset) => {
                log::info!("Loaded {kind} {name}");
                AssetSlot::Ready(Arc::new(asset))
            }
            Err(e) => {
                log::warn!("Failed to load {kind} {name}: {e}; overlays will render without it");
                AssetSlot::Failed {
                    name,
                    reason: e.to_string(),
                }
            }
        };
        true
    }

    fn failed_name(&self) -> Option<String> {
        match self {
            AssetSlot::Failed { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    fn failure(&self) -> Option<&str> {
        match self {
            AssetSlot::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Shared mesh and texture used by every face overlay.
///
/// Owned by the frame thread. Loading happens on worker threads; `poll`
/// picks up finished loads without blocking, and `current` hands out the
/// assets that are ready so far.
pub struct ResourceCache {
    source: Arc<dyn AssetSource>,
    mesh: AssetSlot<Mesh>,
    texture: AssetSlot<Texture>,
}

impl ResourceCache {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            mesh: AssetSlot::Unloaded,
            texture: AssetSlot::Unloaded,
        }
    }

    /// Begins loading both assets. May be called once.
    pub fn load_async(&mut self, mesh_name: &str, texture_name: &str) -> Result<(), ResourceError> {
        if self.mesh.status() != AssetStatus::Unloaded
            || self.texture.status() != AssetStatus::Unloaded
        {
            return Err(ResourceError::AlreadyStarted);
        }
        log::info!("Loading overlay assets: mesh={mesh_name}, texture={texture_name}");
        let (mesh, texture) = load_async(self.source.clone(), mesh_name, texture_name);
        self.mesh = AssetSlot::Loading(mesh);
        self.texture = AssetSlot::Loading(texture);
        Ok(())
    }

    /// Collects finished loads. Returns true if any slot changed state.
    pub fn poll(&mut self) -> bool {
        let mesh_changed = self.mesh.settle("mesh", None);
        let texture_changed = self.texture.settle("texture", None);
        mesh_changed || texture_changed
    }

    /// Blocks until no slot is loading or `timeout` elapses.
    ///
    /// For startup and tests; the frame loop uses `poll`.
    pub fn wait_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.mesh.settle("mesh", Some(timeout));
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.texture.settle("texture", Some(remaining));
        !self.is_loading()
    }

    /// Restarts loads that failed. Returns how many were restarted.
    pub fn retry_failed(&mut self) -> usize {
        let mut restarted = 0;
        if let Some(name) = self.mesh.failed_name() {
            log::info!("Retrying mesh {name}");
            let source = self.source.clone();
            let key = name.clone();
            self.mesh = AssetSlot::Loading(PendingAsset::spawn(&name, move || source.load_mesh(&key)));
            restarted += 1;
        }
        if let Some(name) = self.texture.failed_name() {
            log::info!("Retrying texture {name}");
            let source = self.source.clone();
            let key = name.clone();
            self.texture =
                AssetSlot::Loading(PendingAsset::spawn(&name, move || source.load_texture(&key)));
            restarted += 1;
        }
        restarted
    }

    pub fn current(&self) -> OverlayResources {
        OverlayResources {
            mesh: self.mesh.ready(),
            texture: self.texture.ready(),
        }
    }

    pub fn mesh_status(&self) -> AssetStatus {
        self.mesh.status()
    }

    pub fn texture_status(&self) -> AssetStatus {
        self.texture.status()
    }

    pub fn is_loading(&self) -> bool {
        self.mesh.status() == AssetStatus::Loading || self.texture.status() == AssetStatus::Loading
    }

    /// Failure reasons of failed slots, mesh first.
    pub fn failures(&self) -> Vec<&str> {
        self.mesh
            .failure()
            .into_iter()
            .chain(self.texture.failure())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    /// Asset source whose loads block until the test opens the gate.
    struct FakeSource {
        gate: Mutex<Option<Receiver<()>>>,
        fail_mesh: AtomicUsize,
        mesh_loads: AtomicUsize,
        texture_loads: AtomicUsize,
    }

    impl FakeSource {
        fn immediate() -> Self {
            Self {
                gate: Mutex::new(None),
                fail_mesh: AtomicUsize::new(0),
                mesh_loads: AtomicUsize::new(0),
                texture_loads: AtomicUsize::new(0),
            }
        }

        fn gated(gate: Receiver<()>) -> Self {
            let source = Self::immediate();
            *source.gate.lock().unwrap() = Some(gate);
            source
        }

        fn failing_mesh(times: usize) -> Self {
            let source = Self::immediate();
            source.fail_mesh.store(times, Ordering::SeqCst);
            source
        }

        fn wait_gate(&self) {
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
        }
    }

    impl AssetSource for FakeSource {
        fn load_mesh(&self, name: &str) -> Result<Mesh, AssetError> {
            self.wait_gate();
            self.mesh_loads.fetch_add(1, Ordering::SeqCst);
            let remaining = self.fail_mesh.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_mesh.store(remaining - 1, Ordering::SeqCst);
                return Err(AssetError::Other("boom".into()));
            }
            Ok(Mesh::new(name, vec![1, 2, 3]))
        }

        fn load_texture(&self, name: &str) -> Result<Texture, AssetError> {
            self.wait_gate();
            self.texture_loads.fetch_add(1, Ordering::SeqCst);
            Ok(Texture::new(name, 1, 1, vec![255; 4]))
        }
    }

    #[test]
    fn test_starts_unloaded() {
        let cache = ResourceCache::new(Arc::new(FakeSource::immediate()));
        assert_eq!(cache.mesh_status(), AssetStatus::Unloaded);
        assert_eq!(cache.texture_status(), AssetStatus::Unloaded);
        assert!(!cache.current().is_complete());
    }

    #[test]
    fn test_loads_both_assets() {
        let mut cache = ResourceCache::new(Arc::new(FakeSource::immediate()));
        cache.load_async("fox.glb", "fox.png").unwrap();

        assert!(cache.wait_settled(WAIT));
        assert_eq!(cache.mesh_status(), AssetStatus::Ready);
        assert_eq!(cache.texture_status(), AssetStatus::Ready);

        let resources = cache.current();
        assert_eq!(resources.mesh.unwrap().name(), "fox.glb");
        assert_eq!(resources.texture.unwrap().name(), "fox.png");
    }

    #[test]
    fn test_poll_does_not_block_while_loading() {
        let (open, gate) = crossbeam_channel::unbounded();
        let mut cache = ResourceCache::new(Arc::new(FakeSource::gated(gate)));
        cache.load_async("fox.glb", "fox.png").unwrap();

        assert!(!cache.poll());
        assert!(cache.is_loading());
        assert!(cache.current().mesh.is_none());

        drop(open);
        assert!(cache.wait_settled(WAIT));
        assert!(cache.current().is_complete());
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut cache = ResourceCache::new(Arc::new(FakeSource::immediate()));
        cache.load_async("a", "b").unwrap();
        assert_eq!(cache.load_async("a", "b"), Err(ResourceError::AlreadyStarted));
    }

    #[test]
    fn test_each_asset_loads_exactly_once() {
        let source = Arc::new(FakeSource::immediate());
        let mut cache = ResourceCache::new(source.clone());
        cache.load_async("a", "b").unwrap();
        cache.wait_settled(WAIT);
        for _ in 0..5 {
            cache.poll();
        }
        assert_eq!(source.mesh_loads.load(Ordering::SeqCst), 1);
        assert_eq!(source.texture_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ready_assets_are_shared() {
        let mut cache = ResourceCache::new(Arc::new(FakeSource::immediate()));
        cache.load_async("a", "b").unwrap();
        cache.wait_settled(WAIT);

        let first = cache.current();
        let second = cache.current();
        assert!(Arc::ptr_eq(
            first.mesh.as_ref().unwrap(),
            second.mesh.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_failed_load_keeps_other_asset() {
        let mut cache = ResourceCache::new(Arc::new(FakeSource::failing_mesh(1)));
        cache.load_async("a", "b").unwrap();
        cache.wait_settled(WAIT);

        assert_eq!(cache.mesh_status(), AssetStatus::Failed);
        assert_eq!(cache.texture_status(), AssetStatus::Ready);
        assert_eq!(cache.failures(), vec!["boom"]);
        let resources = cache.current();
        assert!(resources.mesh.is_none());
        assert!(resources.texture.is_some());
    }

    #[test]
    fn test_retry_failed_reloads_only_failed_slot() {
        let source = Arc::new(FakeSource::failing_mesh(1));
        let mut cache = ResourceCache::new(source.clone());
        cache.load_async("a", "b").unwrap();
        cache.wait_settled(WAIT);

        assert_eq!(cache.retry_failed(), 1);
        assert!(cache.wait_settled(WAIT));
        assert_eq!(cache.mesh_status(), AssetStatus::Ready);
        assert_eq!(source.mesh_loads.load(Ordering::SeqCst), 2);
        assert_eq!(source.texture_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_with_nothing_failed_is_noop() {
        let mut cache = ResourceCache::new(Arc::new(FakeSource::immediate()));
        assert_eq!(cache.retry_failed(), 0);
    }

    #[test]
    fn test_free_load_async_resolves_independently() {
        let source: Arc<dyn AssetSource> = Arc::new(FakeSource::immediate());
        let (mesh, texture) = load_async(source, "m", "t");
        assert_eq!(mesh.take_timeout(WAIT).unwrap().unwrap().name(), "m");
        assert_eq!(texture.take_timeout(WAIT).unwrap().unwrap().name(), "t");
    }
}
