pub mod bus;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use collab_core::registry::RegistryStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware. The registry is
/// injected so tests and the CLI can construct isolated instances.
pub fn build_router(registry: Arc<RegistryStore>) -> Router {
    let app_state = state::AppState::new(registry);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Plans
        .route("/api/plans", get(routes::plans::list_plans))
        .route("/api/plans", post(routes::plans::create_plan))
        .route("/api/plans/sync", post(routes::plans::sync_plan))
        .route("/api/plans/{id}", get(routes::plans::get_plan))
        .route("/api/plans/{id}", delete(routes::plans::delete_plan))
        .route("/api/plans/{id}/versions", get(routes::plans::list_versions))
        // Comments
        .route(
            "/api/plans/{id}/comments",
            post(routes::comments::add_comment),
        )
        .route(
            "/api/plans/{id}/comments/{comment_id}",
            patch(routes::comments::patch_comment),
        )
        .route(
            "/api/plans/{id}/comments/{comment_id}/acknowledge",
            post(routes::comments::acknowledge_comment),
        )
        // Questions & answers
        .route(
            "/api/plans/{id}/questions",
            get(routes::questions::list_questions),
        )
        .route(
            "/api/plans/{id}/questions",
            post(routes::questions::add_question),
        )
        .route(
            "/api/plans/{id}/questions/{question_id}/answer",
            post(routes::questions::answer_question),
        )
        .route(
            "/api/plans/{id}/answers/{answer_id}/acknowledge",
            post(routes::questions::acknowledge_answer),
        )
        // Feedback read models
        .route("/api/plans/{id}/feedback", get(routes::feedback::get_feedback))
        .route(
            "/api/plans/{id}/feedback/pending",
            get(routes::feedback::get_pending),
        )
        .route(
            "/api/plans/{id}/feedback/acknowledge",
            post(routes::feedback::acknowledge_all),
        )
        // Health
        .route("/api/health", get(routes::health::health))
        .layer(cors)
        .with_state(app_state)
}

/// Start the façade on a pre-bound listener. Accepting the listener lets the
/// caller bind port 0 and read back the actual port before serving.
pub async fn serve_on(
    registry: Arc<RegistryStore>,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(registry);

    tracing::info!("plan-collab server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind and serve on the given port.
pub async fn serve(
    registry: Arc<RegistryStore>,
    port: u16,
    open_browser: bool,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(registry, listener, open_browser).await
}
