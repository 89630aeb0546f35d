use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health — liveness plus queue and subscriber gauges, used by the
/// CLI to decide whether the server is worth talking to.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "activePlan": app.registry.active_plan(),
        "queueSize": app.registry.queue_size(),
        "sseClients": app.bus.subscriber_count(),
    }))
}
