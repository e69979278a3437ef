use std::collections::HashMap;

use crate::scene::domain::scene_graph::{NodeId, RenderPriority, SceneGraph};

const ROOT: NodeId = NodeId::new(0);

/// Scene graph that only records membership.
///
/// Stands in for a real renderer in the CLI and in tests: it keeps the
/// parent of every attached node and counts attach/detach transitions so
/// callers can check that every overlay that went on screen came off again.
pub struct InMemoryScene {
    parents: HashMap<NodeId, NodeId>,
    next_node: u64,
    attach_count: usize,
    detach_count: usize,
    camera_priority: RenderPriority,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self {
            parents: HashMap::new(),
            next_node: ROOT.raw() + 1,
            attach_count: 0,
            detach_count: 0,
            camera_priority: RenderPriority::Default,
        }
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.parents.contains_key(&node)
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Number of nodes currently attached below the root.
    pub fn attached_count(&self) -> usize {
        self.parents.len()
    }

    /// Total detached-to-attached transitions seen.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    /// Total attached-to-detached transitions seen.
    pub fn detach_count(&self) -> usize {
        self.detach_count
    }

    pub fn camera_priority(&self) -> RenderPriority {
        self.camera_priority
    }
}

impl Default for InMemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for InMemoryScene {
    fn root(&self) -> NodeId {
        ROOT
    }

    fn create_node(&mut self) -> NodeId {
        let node = NodeId::new(self.next_node);
        self.next_node += 1;
        node
    }

    fn attach(&mut self, node: NodeId, parent: NodeId) {
        if self.parents.insert(node, parent).is_none() {
            self.attach_count += 1;
        }
    }

    fn detach(&mut self, node: NodeId) {
        if self.parents.remove(&node).is_some() {
            self.detach_count += 1;
        } else {
            log::debug!("Ignoring detach of {node}: not attached");
        }
    }

    fn set_camera_stream_render_priority(&mut self, priority: RenderPriority) {
        self.camera_priority = priority;
    }
}
