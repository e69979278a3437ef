use std::path::PathBuf;

use thiserror::Error;

use super::detection::Detection;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("failed to read tracker script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tracker script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tracker unavailable: {0}")]
    Unavailable(String),
}

/// Domain interface for the face tracker collaborator.
///
/// Called once per frame on the frame thread. Returns every face the
/// tracker currently knows about, each with its tracking state, or `None`
/// once the tracker has no more frames to report.
pub trait FaceTracker: Send {
    fn update(&mut self) -> Result<Option<Vec<Detection>>, TrackerError>;
}
