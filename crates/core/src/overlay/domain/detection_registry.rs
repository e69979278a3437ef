use std::collections::HashMap;

use crate::overlay::domain::overlay_object::OverlayObject;
use crate::resources::domain::render_assets::OverlayResources;
use crate::scene::domain::scene_graph::SceneGraph;
use crate::tracking::domain::detection::{Detection, DetectionId, TrackingState};

/// What one reconciliation pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub refreshed: usize,
    pub removed: usize,
    /// Overlays alive after the pass.
    pub live: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.refreshed == 0 && self.removed == 0
    }
}

/// Keeps exactly one scene overlay per face the tracker is following.
///
/// Owns both the overlays and the scene they are attached to, so every
/// path that drops an overlay (reconcile, `clear`, or dropping the
/// registry itself, including during unwinding) detaches its node first.
pub struct DetectionRegistry<S: SceneGraph> {
    scene: S,
    overlays: HashMap<DetectionId, OverlayObject>,
}

impl<S: SceneGraph> DetectionRegistry<S> {
    pub fn new(scene: S) -> Self {
        Self {
            scene,
            overlays: HashMap::new(),
        }
    }

    /// Aligns the overlay set with the tracker's current detections.
    ///
    /// 1. Every non-stopped detection without an overlay gets one, attached
    ///    to the scene root and given whatever assets are ready.
    /// 2. Surviving overlays are pointed at the current assets.
    /// 3. Overlays whose detection is stopped or no longer reported are
    ///    detached and dropped.
    ///
    /// A detection listed more than once counts once; if any listing says
    /// stopped, it is stopped.
    pub fn reconcile(
        &mut self,
        detections: &[Detection],
        resources: &OverlayResources,
    ) -> ReconcileReport {
        let current = merge_states(detections);
        let mut report = ReconcileReport::default();

        let root = self.scene.root();
        for (&id, state) in &current {
            if state.is_stopped() || self.overlays.contains_key(&id) {
                continue;
            }
            let mut overlay = OverlayObject::create(id, self.scene.create_node());
            overlay.set_resources(resources);
            overlay.attach(&mut self.scene, root);
            log::debug!("Attached {} for {id}", overlay.node());
            self.overlays.insert(id, overlay);
            report.created += 1;
        }

        let scene = &mut self.scene;
        self.overlays.retain(|id, overlay| {
            let tracked = current.get(id).is_some_and(|state| !state.is_stopped());
            if !tracked {
                overlay.detach(&mut *scene);
                log::debug!("Detached {} for {id}", overlay.node());
                report.removed += 1;
                return false;
            }
            if overlay.set_resources(resources) {
                report.refreshed += 1;
            }
            true
        });

        report.live = self.overlays.len();
        report
    }

    /// Detaches and drops every overlay.
    pub fn clear(&mut self) {
        for (_, mut overlay) in self.overlays.drain() {
            overlay.detach(&mut self.scene);
        }
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn contains(&self, id: DetectionId) -> bool {
        self.overlays.contains_key(&id)
    }

    pub fn get(&self, id: DetectionId) -> Option<&OverlayObject> {
        self.overlays.get(&id)
    }

    /// Tracked identities in ascending order.
    pub fn ids(&self) -> Vec<DetectionId> {
        let mut ids: Vec<DetectionId> = self.overlays.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayObject> {
        self.overlays.values()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }
}

impl<S: SceneGraph> Drop for DetectionRegistry<S> {
    fn drop(&mut self) {
        if !self.overlays.is_empty() {
            log::debug!("Registry dropped with {} live overlays", self.overlays.len());
        }
        self.clear();
    }
}

fn merge_states(detections: &[Detection]) -> HashMap<DetectionId, TrackingState> {
    let mut current = HashMap::with_capacity(detections.len());
    for det in detections {
        current
            .entry(det.id)
            .and_modify(|state: &mut TrackingState| {
                if det.state.is_stopped() {
                    *state = TrackingState::Stopped;
                }
            })
            .or_insert(det.state);
    }
    current
}
