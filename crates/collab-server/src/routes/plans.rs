use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::bus::Event;
use crate::error::AppError;
use crate::state::AppState;
use collab_core::{feedback, paths};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/plans?sessionId= — the queue, newest push first, with per-plan
/// feedback stats for the sidebar.
pub async fn list_plans(
    State(app): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let result = tokio::task::spawn_blocking(move || {
        let plans: Vec<serde_json::Value> = registry
            .list(query.session_id.as_deref())
            .into_iter()
            .map(|summary| {
                let sidecar = feedback::load(std::path::Path::new(&summary.entry.path));
                let stats = feedback::summarize(&sidecar);
                let mut value = serde_json::to_value(&summary).unwrap_or_default();
                value["stats"] = serde_json::json!({
                    "openComments": stats.open_comments,
                    "pendingQuestions": stats.pending_questions,
                    "pendingAnswers": stats.pending_answers,
                });
                value
            })
            .collect();
        serde_json::json!({ "plans": plans })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    pub plan_path: Option<String>,
    pub session_id: Option<String>,
}

/// POST /api/plans — register (or refresh) a plan from its file on disk.
pub async fn create_plan(
    State(app): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(raw_path) = body.plan_path else {
        return Err(AppError::bad_request("planPath is required"));
    };

    let registry = app.registry.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let path = paths::resolve_plan_path(&raw_path);
        registry.register(&path, body.session_id.as_deref())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let event = if outcome.is_new {
        Event::PlanAdded {
            plan: outcome.plan.clone(),
        }
    } else {
        Event::PlanUpdated {
            plan: outcome.plan.clone(),
        }
    };
    app.bus.publish(&event);

    Ok(Json(serde_json::json!({
        "plan": outcome.plan,
        "isUpdate": !outcome.is_new,
        "contentChanged": outcome.content_changed,
    })))
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBody {
    pub plan_path: Option<String>,
    pub content: Option<String>,
    pub content_hash: Option<String>,
    pub session_id: Option<String>,
}

/// POST /api/plans/sync — push content directly instead of re-reading the
/// file; a matching hash leaves the version history untouched.
pub async fn sync_plan(
    State(app): State<AppState>,
    Json(body): Json<SyncBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(raw_path), Some(content)) = (body.plan_path, body.content) else {
        return Err(AppError::bad_request("planPath and content are required"));
    };

    let registry = app.registry.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let path = paths::resolve_plan_path(&raw_path);
        registry.sync(&path, content, body.content_hash, body.session_id.as_deref())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let event = if outcome.is_new {
        Event::PlanAdded {
            plan: outcome.plan.clone(),
        }
    } else {
        Event::PlanUpdated {
            plan: outcome.plan.clone(),
        }
    };
    app.bus.publish(&event);

    let short_hash: String = outcome.plan.content_hash.chars().take(12).collect();
    Ok(Json(serde_json::json!({
        "status": "synced",
        "planPath": outcome.plan.path,
        "version": outcome.plan.current_version,
        "contentHash": short_hash,
    })))
}

// ---------------------------------------------------------------------------
// Get / delete
// ---------------------------------------------------------------------------

/// GET /api/plans/:id — full detail: current content plus all feedback.
pub async fn get_plan(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let result = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&id)?;
        // The file can vanish between the lookup and this read; treat that
        // like any other read of a missing file and evict.
        let content = std::fs::read_to_string(&entry.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                let _ = registry.get(&id);
                collab_core::CollabError::PlanNotFound(id.clone())
            } else {
                collab_core::CollabError::Io(e)
            }
        })?;
        let sidecar = feedback::load(std::path::Path::new(&entry.path));
        let mut plan = serde_json::to_value(&entry)?;
        plan["content"] = serde_json::Value::String(content);
        plan["comments"] = serde_json::to_value(&sidecar.comments)?;
        plan["questions"] = serde_json::to_value(&sidecar.questions)?;
        plan["answers"] = serde_json::to_value(&sidecar.answers)?;
        Ok::<_, collab_core::CollabError>(serde_json::json!({ "plan": plan }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// DELETE /api/plans/:id?sessionId= — owner-only removal (anonymous entries
/// are removable by anyone).
pub async fn delete_plan(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let id_clone = id.clone();
    let removed = tokio::task::spawn_blocking(move || {
        registry.remove(&id_clone, query.session_id.as_deref())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.bus.publish(&Event::PlanRemoved {
        plan_id: removed.id.clone(),
    });
    Ok(Json(serde_json::json!({ "removed": true, "planId": id })))
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// GET /api/plans/:id/versions — snapshot history, newest first.
pub async fn list_versions(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let versions = tokio::task::spawn_blocking(move || registry.versions(&id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "versions": versions })))
}
