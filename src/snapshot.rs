//! Task/user snapshots loaded from disk.
//!
//! A snapshot is what the dashboard would otherwise fetch from the backend on
//! startup: the task collection, the user roster and (optionally) who is
//! looking at it.

use crate::error::{Result, TaskboardError};
use crate::types::{Task, User, UserId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Serialized form of a dashboard's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub current_user: Option<UserId>,
}

impl Snapshot {
    /// Load from a `.json`, `.yaml` or `.yml` file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let shown = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| TaskboardError::snapshot(&shown, e))?;

        let snapshot = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") | None => Self::from_json(&content),
            Some(other) => Err(TaskboardError::snapshot(
                &shown,
                format!("unsupported snapshot extension '.{}'", other),
            )),
        }
        .map_err(|e| match e {
            TaskboardError::SnapshotLoad { reason, .. } => TaskboardError::snapshot(&shown, reason),
            other => other,
        })?;

        debug!(
            path = %shown,
            tasks = snapshot.tasks.len(),
            users = snapshot.users.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| TaskboardError::snapshot("<json>", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| TaskboardError::snapshot("<yaml>", e))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
