//! In-memory plan queue shared by every CLI session and browser viewer.
//!
//! One `RegistryStore` is constructed at process start and injected into the
//! HTTP layer; there is no module-level singleton. The store is authoritative
//! for the life of the process — the optional disk snapshot only exists so a
//! restart can recover the queue, and failures writing it are logged and
//! swallowed.

use crate::error::{CollabError, Result};
use crate::plan::{self, PlanEntry, PlanSummary, ANONYMOUS_SESSION};
use crate::version::{Version, VersionStore};
use crate::{hash, io};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub plan: PlanEntry,
    pub is_new: bool,
    pub content_changed: bool,
}

// ---------------------------------------------------------------------------
// Snapshot format
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    plans: HashMap<String, PlanEntry>,
    versions: VersionStore,
    active_plan: Option<String>,
}

// ---------------------------------------------------------------------------
// RegistryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    plans: HashMap<String, PlanEntry>,
    versions: VersionStore,
    active_plan: Option<String>,
    next_seq: u64,
}

pub struct RegistryStore {
    inner: Mutex<Inner>,
    snapshot_path: Option<PathBuf>,
    // Per-plan guards so feedback read-modify-write stays serialized on a
    // multithreaded runtime.
    feedback_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RegistryStore {
    /// Memory-only store, used by tests and ephemeral servers.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            snapshot_path: None,
            feedback_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by a JSON snapshot restored at startup. A missing or
    /// unreadable snapshot starts the queue empty.
    pub fn with_snapshot(path: PathBuf) -> Self {
        let inner = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Snapshot>(&data) {
                Ok(snap) => Inner {
                    next_seq: snap.plans.values().map(|e| e.seq).max().unwrap_or(0) + 1,
                    plans: snap.plans,
                    versions: snap.versions,
                    active_plan: snap.active_plan,
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable queue snapshot");
                    Inner::default()
                }
            },
            Err(_) => Inner::default(),
        };
        Self {
            inner: Mutex::new(inner),
            snapshot_path: Some(path),
            feedback_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Persist the snapshot if configured. Never fails the caller: memory
    /// stays authoritative for the life of the process.
    fn persist(&self, inner: &Inner) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let snap = Snapshot {
            plans: inner.plans.clone(),
            versions: inner.versions.clone(),
            active_plan: inner.active_plan.clone(),
        };
        let write = serde_json::to_vec_pretty(&snap)
            .map_err(CollabError::from)
            .and_then(|data| io::atomic_write(path, &data));
        if let Err(e) = write {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist queue snapshot");
        }
    }

    // -----------------------------------------------------------------------
    // Registration & sync
    // -----------------------------------------------------------------------

    /// Register a plan from its file on disk. Creates the entry and Version 1
    /// on first sight; appends a new Version when the content hash changed.
    pub fn register(&self, path: &Path, session_id: Option<&str>) -> Result<RegisterOutcome> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CollabError::PlanFileNotFound(path.to_path_buf())
            } else {
                CollabError::Io(e)
            }
        })?;
        let content_hash = hash::content_hash(&content);
        self.upsert(path, content, content_hash, session_id)
    }

    /// Same contract as `register`, but the caller supplies the content (and
    /// optionally its hash) instead of the registry reading the file.
    pub fn sync(
        &self,
        path: &Path,
        content: String,
        provided_hash: Option<String>,
        session_id: Option<&str>,
    ) -> Result<RegisterOutcome> {
        let content_hash = provided_hash.unwrap_or_else(|| hash::content_hash(&content));
        self.upsert(path, content, content_hash, session_id)
    }

    fn upsert(
        &self,
        path: &Path,
        content: String,
        content_hash: String,
        session_id: Option<&str>,
    ) -> Result<RegisterOutcome> {
        let id = hash::plan_id(path);
        let name = plan::plan_name(path);
        let title = plan::extract_title(&content).unwrap_or_else(|| name.clone());
        let now = Utc::now();

        let mut inner = self.lock();
        inner.active_plan = Some(path.to_string_lossy().to_string());

        let outcome = match inner.plans.get(&id).cloned() {
            None => {
                let version =
                    inner
                        .versions
                        .append(&id, content, content_hash.clone(), title.clone());
                inner.next_seq += 1;
                let entry = PlanEntry {
                    id: id.clone(),
                    path: path.to_string_lossy().to_string(),
                    session_id: session_id.unwrap_or(ANONYMOUS_SESSION).to_string(),
                    name,
                    title,
                    pushed_at: now,
                    updated_at: now,
                    content_hash,
                    current_version: version.version,
                    seq: inner.next_seq,
                };
                inner.plans.insert(id, entry.clone());
                RegisterOutcome {
                    plan: entry,
                    is_new: true,
                    content_changed: true,
                }
            }
            Some(mut entry) => {
                // Ownership is fixed at first registration; later syncs from
                // other sessions don't steal the plan.
                let content_changed = entry.content_hash != content_hash;
                if content_changed {
                    let version =
                        inner
                            .versions
                            .append(&id, content, content_hash.clone(), title.clone());
                    entry.content_hash = content_hash;
                    entry.current_version = version.version;
                    entry.title = title;
                }
                entry.updated_at = now;
                inner.plans.insert(id, entry.clone());
                RegisterOutcome {
                    plan: entry,
                    is_new: false,
                    content_changed,
                }
            }
        };

        self.persist(&inner);
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch by id. If the backing file vanished, the entry is evicted and
    /// the caller sees NotFound rather than a stale cache hit.
    pub fn get(&self, id: &str) -> Result<PlanEntry> {
        let mut inner = self.lock();
        let entry = inner
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| CollabError::PlanNotFound(id.to_string()))?;
        if !Path::new(&entry.path).exists() {
            inner.plans.remove(id);
            inner.versions.remove_plan(id);
            self.persist(&inner);
            return Err(CollabError::PlanNotFound(id.to_string()));
        }
        Ok(entry)
    }

    /// All plans, newest push first. Entries whose file is gone are evicted
    /// during the scan. `isOwn` is computed against the supplied session.
    pub fn list(&self, session_id: Option<&str>) -> Vec<PlanSummary> {
        let mut inner = self.lock();
        let stale: Vec<String> = inner
            .plans
            .values()
            .filter(|e| !Path::new(&e.path).exists())
            .map(|e| e.id.clone())
            .collect();
        if !stale.is_empty() {
            for id in &stale {
                inner.plans.remove(id);
                inner.versions.remove_plan(id);
            }
            self.persist(&inner);
        }

        let mut entries: Vec<PlanEntry> = inner.plans.values().cloned().collect();
        // Equal timestamps tiebreak on registration order; the map itself has
        // no usable iteration order.
        entries.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at).then(a.seq.cmp(&b.seq)));
        entries
            .into_iter()
            .map(|entry| {
                let is_own = session_id.is_some_and(|s| entry.session_id == s);
                PlanSummary { entry, is_own }
            })
            .collect()
    }

    /// Version history, newest first. NotFound for unknown plans.
    pub fn versions(&self, plan_id: &str) -> Result<Vec<Version>> {
        let inner = self.lock();
        if !inner.plans.contains_key(plan_id) {
            return Err(CollabError::PlanNotFound(plan_id.to_string()));
        }
        Ok(inner.versions.all(plan_id))
    }

    pub fn active_plan(&self) -> Option<String> {
        self.lock().active_plan.clone()
    }

    pub fn queue_size(&self) -> usize {
        self.lock().plans.len()
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove a plan. Allowed when no session is supplied, the session owns
    /// the entry, or the entry is anonymously owned.
    pub fn remove(&self, id: &str, session_id: Option<&str>) -> Result<PlanEntry> {
        let mut inner = self.lock();
        let entry = inner
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| CollabError::PlanNotFound(id.to_string()))?;

        if let Some(session) = session_id {
            if entry.session_id != session && entry.session_id != ANONYMOUS_SESSION {
                return Err(CollabError::NotOwner {
                    plan: id.to_string(),
                    session: session.to_string(),
                });
            }
        }

        inner.plans.remove(id);
        inner.versions.remove_plan(id);
        if inner.active_plan.as_deref() == Some(entry.path.as_str()) {
            inner.active_plan = None;
        }
        self.persist(&inner);
        Ok(entry)
    }

    // -----------------------------------------------------------------------
    // Feedback serialization
    // -----------------------------------------------------------------------

    /// Per-plan guard for feedback mutations. Hold it across the whole
    /// load-mutate-save of the sidecar file.
    pub fn feedback_guard(&self, plan_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .feedback_locks
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        locks
            .entry(plan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
