//! Append-only content snapshots, one sequence per plan.
//!
//! The registry is responsible for only appending when the content hash
//! actually changed; this store just numbers and keeps the snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub version: u32,
    pub content: String,
    pub content_hash: String,
    pub title: String,
    pub snapshot_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VersionStore {
    versions: HashMap<String, Vec<Version>>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest snapshot for a plan, if any exist.
    pub fn latest(&self, plan_id: &str) -> Option<&Version> {
        self.versions.get(plan_id).and_then(|v| v.last())
    }

    /// Append the next snapshot: `latest + 1`, or 1 for a plan's first.
    pub fn append(
        &mut self,
        plan_id: &str,
        content: String,
        content_hash: String,
        title: String,
    ) -> Version {
        let entry = self.versions.entry(plan_id.to_string()).or_default();
        let version = Version {
            version: entry.last().map(|v| v.version + 1).unwrap_or(1),
            content,
            content_hash,
            title,
            snapshot_at: Utc::now(),
        };
        entry.push(version.clone());
        version
    }

    /// All snapshots for a plan, newest first.
    pub fn all(&self, plan_id: &str) -> Vec<Version> {
        let mut out = self.versions.get(plan_id).cloned().unwrap_or_default();
        out.reverse();
        out
    }

    /// Drop a plan's whole history. Only called when the plan is removed.
    pub fn remove_plan(&mut self, plan_id: &str) {
        self.versions.remove(plan_id);
    }
}
