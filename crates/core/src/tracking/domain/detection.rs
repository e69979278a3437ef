use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of one tracked face.
///
/// Tokens are handed out by a [`DetectionArena`](super::detection_arena::DetectionArena)
/// and never reused within a process, so a registry keyed by them cannot
/// confuse a new face with an old one that happened to share a raw handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectionId(u64);

impl DetectionId {
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    pub fn token(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DetectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face#{}", self.0)
    }
}

/// Tracking status the tracker reports for a face each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    Tracking,
    /// Temporarily lost; the tracker may resume it.
    Paused,
    /// Will never be tracked again.
    Stopped,
}

impl TrackingState {
    pub fn is_stopped(self) -> bool {
        self == TrackingState::Stopped
    }
}

/// One face as reported by the tracker for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub id: DetectionId,
    pub state: TrackingState,
}

impl Detection {
    pub fn new(id: DetectionId, state: TrackingState) -> Self {
        Self { id, state }
    }

    pub fn tracking(token: u64) -> Self {
        Self::new(DetectionId::new(token), TrackingState::Tracking)
    }

    pub fn stopped(token: u64) -> Self {
        Self::new(DetectionId::new(token), TrackingState::Stopped)
    }
}
