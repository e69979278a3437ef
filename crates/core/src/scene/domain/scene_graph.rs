use std::fmt;

/// Handle of a node in the host scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Draw order of the camera feed relative to scene renderables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPriority {
    /// Camera stream is drawn before anything else, so face overlays
    /// composite on top of it.
    First,
    Default,
    Last,
}

/// Domain interface for the rendering/scene collaborator.
///
/// `attach` and `detach` must tolerate repeated calls: attaching an attached
/// node or detaching a detached one is a no-op.
pub trait SceneGraph: Send {
    fn root(&self) -> NodeId;
    /// Allocates a fresh, detached node.
    fn create_node(&mut self) -> NodeId;
    fn attach(&mut self, node: NodeId, parent: NodeId);
    fn detach(&mut self, node: NodeId);
    fn set_camera_stream_render_priority(&mut self, priority: RenderPriority);
}
