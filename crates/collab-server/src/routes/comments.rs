use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::bus::Event;
use crate::error::AppError;
use crate::state::AppState;
use collab_core::feedback::{self, CommentDraft};

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// POST /api/plans/:id/comments — attach a comment to the selected span.
pub async fn add_comment(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CommentDraft>,
) -> Result<Json<serde_json::Value>, AppError> {
    if draft.selected_text.is_empty() {
        return Err(AppError::bad_request("selectedText is required"));
    }
    if draft.content.is_empty() {
        return Err(AppError::bad_request("content is required"));
    }

    let registry = app.registry.clone();
    let plan_id = id.clone();
    let comment = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::add_comment(std::path::Path::new(&entry.path), draft)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.bus.publish(&Event::CommentAdded {
        plan_id: id,
        comment: comment.clone(),
    });
    Ok(Json(serde_json::json!({ "comment": comment })))
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PatchBody {
    pub status: Option<String>,
}

/// PATCH /api/plans/:id/comments/:commentId — the only supported transition
/// is OPEN -> RESOLVED; resolving twice is a no-op that still succeeds.
pub async fn patch_comment(
    State(app): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
    Json(body): Json<PatchBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    match body.status.as_deref() {
        Some("RESOLVED") => {}
        Some(other) => return Err(AppError(collab_core::CollabError::InvalidStatus(other.to_string()).into())),
        None => return Err(AppError::bad_request("status is required")),
    }

    let registry = app.registry.clone();
    let plan_id = id.clone();
    let comment = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::resolve_comment(std::path::Path::new(&entry.path), &comment_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.bus.publish(&Event::CommentUpdated {
        plan_id: id,
        comment: comment.clone(),
    });
    Ok(Json(serde_json::json!({ "comment": comment })))
}

// ---------------------------------------------------------------------------
// Acknowledge
// ---------------------------------------------------------------------------

/// POST /api/plans/:id/comments/:commentId/acknowledge — the automation side
/// marks a comment as seen without resolving it.
pub async fn acknowledge_comment(
    State(app): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let plan_id = id.clone();
    let comment = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::acknowledge_comment(std::path::Path::new(&entry.path), &comment_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.bus.publish(&Event::CommentUpdated {
        plan_id: id,
        comment: comment.clone(),
    });
    Ok(Json(serde_json::json!({ "comment": comment })))
}
