use std::sync::Arc;

use crate::resources::domain::render_assets::{Mesh, OverlayResources, Texture};
use crate::scene::domain::scene_graph::{NodeId, SceneGraph};
use crate::tracking::domain::detection::DetectionId;

/// The rendered counterpart of one tracked face.
///
/// Holds the scene node it occupies and shared references to the face mesh
/// and texture. Either reference may be absent while assets are loading.
#[derive(Debug)]
pub struct OverlayObject {
    detection: DetectionId,
    node: NodeId,
    parent: Option<NodeId>,
    mesh: Option<Arc<Mesh>>,
    texture: Option<Arc<Texture>>,
}

impl OverlayObject {
    /// Creates a detached overlay bound to `detection` with no assets.
    pub fn create(detection: DetectionId, node: NodeId) -> Self {
        Self {
            detection,
            node,
            parent: None,
            mesh: None,
            texture: None,
        }
    }

    pub fn detection(&self) -> DetectionId {
        self.detection
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_visually_complete(&self) -> bool {
        self.mesh.is_some() && self.texture.is_some()
    }

    /// Points the overlay at `resources`. Returns true if any reference changed.
    ///
    /// References are compared by identity, so re-applying the same cached
    /// assets every frame is free.
    pub fn set_resources(&mut self, resources: &OverlayResources) -> bool {
        let mesh_changed = !same_asset(&self.mesh, &resources.mesh);
        let texture_changed = !same_asset(&self.texture, &resources.texture);
        if mesh_changed {
            self.mesh = resources.mesh.clone();
        }
        if texture_changed {
            self.texture = resources.texture.clone();
        }
        mesh_changed || texture_changed
    }

    pub fn attach(&mut self, scene: &mut dyn SceneGraph, parent: NodeId) {
        if self.parent == Some(parent) {
            return;
        }
        if self.parent.is_some() {
            scene.detach(self.node);
        }
        scene.attach(self.node, parent);
        self.parent = Some(parent);
    }

    /// Removes the overlay from the scene. Safe to call more than once.
    pub fn detach(&mut self, scene: &mut dyn SceneGraph) {
        if self.parent.take().is_some() {
            scene.detach(self.node);
        }
    }
}

fn same_asset<T>(current: &Option<Arc<T>>, next: &Option<Arc<T>>) -> bool {
    match (current, next) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
