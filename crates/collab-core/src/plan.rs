use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Sessions that never identify themselves share this owner. Kept for
/// compatibility with pre-session CLI invocations; anyone may remove an
/// anonymously-owned plan.
pub const ANONYMOUS_SESSION: &str = "anonymous";

// ---------------------------------------------------------------------------
// PlanEntry
// ---------------------------------------------------------------------------

/// One registered plan in the queue. Keyed by `id = hash(path)`, so the
/// same file always maps to the same entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub id: String,
    pub path: String,
    pub session_id: String,
    pub name: String,
    pub title: String,
    pub pushed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content_hash: String,
    pub current_version: u32,
    /// Registration order within the queue. Listing sorts on `pushedAt` and
    /// tiebreaks on this, so equal timestamps keep a deterministic order
    /// across restarts.
    #[serde(default)]
    pub seq: u64,
}

/// A `PlanEntry` annotated for a particular viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    #[serde(flatten)]
    pub entry: PlanEntry,
    pub is_own: bool,
}

// ---------------------------------------------------------------------------
// Derived fields
// ---------------------------------------------------------------------------

/// Plan name is the file stem: `/tmp/auth-plan.md` -> `auth-plan`.
pub fn plan_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

static H1_RE: OnceLock<Regex> = OnceLock::new();

/// First markdown H1, or `None` when the document has none.
pub fn extract_title(content: &str) -> Option<String> {
    let re = H1_RE.get_or_init(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
    re.captures(content)
        .map(|c| c[1].trim().to_string())
}
