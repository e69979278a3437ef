use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::tracking::domain::detection::{Detection, TrackingState};
use crate::tracking::domain::detection_arena::DetectionArena;
use crate::tracking::domain::face_tracker::{FaceTracker, TrackerError};

#[derive(Clone, Debug, Deserialize)]
struct ScriptedFace {
    face: u64,
    #[serde(default = "default_state")]
    state: TrackingState,
}

fn default_state() -> TrackingState {
    TrackingState::Tracking
}

#[derive(Debug, Deserialize)]
struct TrackerScript {
    frames: Vec<Vec<ScriptedFace>>,
}

/// Replays a recorded sequence of tracker frames.
///
/// Script format:
///
/// ```json
/// { "frames": [[{ "face": 1 }], [{ "face": 1, "state": "stopped" }], []] }
/// ```
///
/// `face` is the tracker's raw handle; handles are mapped to stable
/// identities through a [`DetectionArena`], so a handle reused after it
/// stopped shows up as a new face.
pub struct ScriptedTracker {
    frames: Vec<Vec<(u64, TrackingState)>>,
    cursor: usize,
    arena: DetectionArena,
}

impl ScriptedTracker {
    pub fn new(frames: Vec<Vec<(u64, TrackingState)>>) -> Self {
        Self {
            frames,
            cursor: 0,
            arena: DetectionArena::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let script: TrackerScript = serde_json::from_str(json)?;
        let frames = script
            .frames
            .into_iter()
            .map(|faces| faces.into_iter().map(|f| (f.face, f.state)).collect())
            .collect();
        Ok(Self::new(frames))
    }

    pub fn from_file(path: &Path) -> Result<Self, TrackerError> {
        let json = fs::read_to_string(path).map_err(|e| TrackerError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }
}

impl FaceTracker for ScriptedTracker {
    fn update(&mut self) -> Result<Option<Vec<Detection>>, TrackerError> {
        let Some(raw) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(self.arena.observe_frame(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_replays_frames_in_order() {
        let mut tracker = ScriptedTracker::from_json(
            r#"{ "frames": [[{ "face": 1 }], [{ "face": 1 }, { "face": 2 }], []] }"#,
        )
        .unwrap();

        assert_eq!(tracker.total_frames(), 3);
        assert_eq!(tracker.update().unwrap().unwrap().len(), 1);
        assert_eq!(tracker.update().unwrap().unwrap().len(), 2);
        assert!(tracker.update().unwrap().unwrap().is_empty());
        assert!(tracker.update().unwrap().is_none());
    }

    #[test]
    fn test_state_defaults_to_tracking() {
        let mut tracker = ScriptedTracker::from_json(r#"{ "frames": [[{ "face": 9 }]] }"#).unwrap();
        let dets = tracker.update().unwrap().unwrap();
        assert_eq!(dets[0].state, TrackingState::Tracking);
    }

    #[test]
    fn test_explicit_states_are_parsed() {
        let mut tracker = ScriptedTracker::from_json(
            r#"{ "frames": [[{ "face": 1, "state": "paused" }, { "face": 2, "state": "stopped" }]] }"#,
        )
        .unwrap();
        let dets = tracker.update().unwrap().unwrap();
        assert_eq!(dets[0].state, TrackingState::Paused);
        assert_eq!(dets[1].state, TrackingState::Stopped);
    }

    #[test]
    fn test_identity_is_stable_while_tracked() {
        let mut tracker =
            ScriptedTracker::from_json(r#"{ "frames": [[{ "face": 5 }], [{ "face": 5 }]] }"#)
                .unwrap();
        let a = tracker.update().unwrap().unwrap()[0].id;
        let b = tracker.update().unwrap().unwrap()[0].id;
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_script_is_an_error() {
        let result = ScriptedTracker::from_json(r#"{ "frames": [[{ "face": "x" }]] }"#);
        assert!(matches!(result, Err(TrackerError::Parse(_))));
    }

    #[test]
    fn test_loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "frames": [[{{ "face": 1 }}]] }}"#).unwrap();

        let tracker = ScriptedTracker::from_file(file.path()).unwrap();
        assert_eq!(tracker.total_frames(), 1);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = ScriptedTracker::from_file(Path::new("/nonexistent/script.json"));
        assert!(matches!(result, Err(TrackerError::Read { .. })));
    }
}
