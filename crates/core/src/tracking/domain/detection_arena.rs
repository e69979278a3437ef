use std::collections::{HashMap, HashSet};

use super::detection::{Detection, DetectionId, TrackingState};

/// Translates the tracker's raw face handles into stable [`DetectionId`]s.
///
/// A handle keeps its token for as long as the tracker keeps reporting it
/// without stopping. Once the handle is stopped or drops out of a frame it
/// is released, and a later reappearance gets a fresh token: a reused
/// handle is treated as a new face.
pub struct DetectionArena {
    bound: HashMap<u64, DetectionId>,
    next_token: u64,
}

impl DetectionArena {
    pub fn new() -> Self {
        Self {
            bound: HashMap::new(),
            next_token: 1,
        }
    }

    /// Maps one frame of raw `(handle, state)` observations to detections.
    pub fn observe_frame(&mut self, raw: &[(u64, TrackingState)]) -> Vec<Detection> {
        let seen: HashSet<u64> = raw.iter().map(|(handle, _)| *handle).collect();
        let stale: Vec<u64> = self
            .bound
            .keys()
            .filter(|handle| !seen.contains(handle))
            .copied()
            .collect();
        for handle in stale {
            if let Some(id) = self.bound.remove(&handle) {
                log::debug!("Raw handle {handle} vanished, releasing {id}");
            }
        }

        let mut stopped = Vec::new();
        let detections = raw
            .iter()
            .map(|&(handle, state)| {
                let id = self.bind(handle);
                if state.is_stopped() {
                    stopped.push(handle);
                }
                Detection::new(id, state)
            })
            .collect();

        for handle in stopped {
            self.bound.remove(&handle);
        }
        detections
    }

    /// Number of raw handles currently holding a token.
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    fn bind(&mut self, handle: u64) -> DetectionId {
        if let Some(id) = self.bound.get(&handle) {
            return *id;
        }
        let id = DetectionId::new(self.next_token);
        self.next_token += 1;
        self.bound.insert(handle, id);
        id
    }
}

impl Default for DetectionArena {
    fn default() -> Self {
        Self::new()
    }
}
