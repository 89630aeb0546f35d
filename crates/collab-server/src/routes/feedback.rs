use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use collab_core::feedback;

/// GET /api/plans/:id/feedback — the whole sidecar document.
pub async fn get_feedback(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let sidecar = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&id)?;
        Ok::<_, collab_core::CollabError>(feedback::load(std::path::Path::new(&entry.path)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::to_value(&sidecar)?))
}

/// GET /api/plans/:id/feedback/pending — only what the automation consumer
/// has not yet acknowledged; acknowledging drains this to empty.
pub async fn get_pending(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let pending = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&id)?;
        Ok::<_, collab_core::CollabError>(feedback::pending(std::path::Path::new(&entry.path)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::to_value(&pending)?))
}

/// POST /api/plans/:id/feedback/acknowledge — mark everything pending as seen.
pub async fn acknowledge_all(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let plan_id = id.clone();
    let count = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::acknowledge_all(std::path::Path::new(&entry.path))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if count > 0 {
        if let Ok(entry) = app.registry.get(&id) {
            app.bus.publish(&crate::bus::Event::PlanUpdated { plan: entry });
        }
    }
    Ok(Json(serde_json::json!({ "acknowledged": count })))
}
