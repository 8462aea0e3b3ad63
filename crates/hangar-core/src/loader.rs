//! Asset load requests, progress and failures
//!
//! A load is identified by a [`LoadTicket`]. The host (the Bevy asset server
//! in the viewer, a fake in tests) performs the actual fetch and reports back
//! through [`crate::Viewer::report_progress`] and
//! [`crate::Viewer::finish_load`]. Each ticket completes at most once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ModelRole;
use crate::scene::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetLoadError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("{0} contains no scene")]
    EmptyScene(String),
}

/// Directory holding a model plus the scene-description file inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPath {
    pub directory: String,
    #[serde(default = "default_scene_file")]
    pub file: String,
}

fn default_scene_file() -> String {
    "scene.gltf".to_string()
}

impl AssetPath {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file: default_scene_file(),
        }
    }

    /// Full relative path to the scene file
    pub fn resolve(&self) -> String {
        if self.directory.is_empty() {
            return self.file.clone();
        }
        let dir = self.directory.trim_end_matches('/');
        format!("{}/{}", dir, self.file)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

/// Identity of one load request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub model: ModelRole,
    pub generation: u64,
    /// Resolved scene file path
    pub path: String,
}

/// Informational load progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl LoadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        Self { loaded, total }
    }

    /// Completion percentage, `None` when the total size is unknown
    pub fn percent(&self) -> Option<f32> {
        if self.total == 0 {
            return None;
        }
        Some((self.loaded as f64 / self.total as f64 * 100.0).min(100.0) as f32)
    }
}

/// Result of handing a terminal event to the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum LoadCompletion {
    /// Root attached to the scene graph
    Attached(NodeId),
    /// Load failed; nothing attached
    Failed,
    /// Ticket was cancelled or already completed; result discarded
    Stale,
}

/// One reported load failure
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub model: ModelRole,
    pub error: AssetLoadError,
}
