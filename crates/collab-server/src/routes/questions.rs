use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::bus::Event;
use crate::error::AppError;
use crate::state::AppState;
use collab_core::feedback::{self, QuestionDraft};

// ---------------------------------------------------------------------------
// List / add
// ---------------------------------------------------------------------------

/// GET /api/plans/:id/questions
pub async fn list_questions(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let questions = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&id)?;
        Ok::<_, collab_core::CollabError>(
            feedback::load(std::path::Path::new(&entry.path)).questions,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "questions": questions })))
}

/// POST /api/plans/:id/questions — file a question for the reviewer.
pub async fn add_question(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<QuestionDraft>,
) -> Result<Json<serde_json::Value>, AppError> {
    if draft.question_text.is_empty() {
        return Err(AppError::bad_request("questionText is required"));
    }

    let registry = app.registry.clone();
    let plan_id = id.clone();
    let question = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::add_question(std::path::Path::new(&entry.path), draft)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    // A new question is a plan-level change as far as viewers care.
    if let Ok(entry) = app.registry.get(&id) {
        app.bus.publish(&Event::PlanUpdated { plan: entry });
    }
    Ok(Json(serde_json::json!({ "question": question })))
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AnswerBody {
    pub answer: Option<String>,
}

/// POST /api/plans/:id/questions/:questionId/answer — answer exactly once;
/// a second answer is a conflict.
pub async fn answer_question(
    State(app): State<AppState>,
    Path((id, question_id)): Path<(String, String)>,
    Json(body): Json<AnswerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(answer_text) = body.answer else {
        return Err(AppError::bad_request("answer is required"));
    };

    let registry = app.registry.clone();
    let plan_id = id.clone();
    let (answer, question) = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::answer_question(std::path::Path::new(&entry.path), &question_id, &answer_text)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.bus.publish(&Event::QuestionAnswered {
        plan_id: id,
        question: question.clone(),
        answer: answer.clone(),
    });
    Ok(Json(serde_json::json!({ "answer": answer, "question": question })))
}

// ---------------------------------------------------------------------------
// Acknowledge answer
// ---------------------------------------------------------------------------

/// POST /api/plans/:id/answers/:answerId/acknowledge
pub async fn acknowledge_answer(
    State(app): State<AppState>,
    Path((id, answer_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let plan_id = id.clone();
    let answer = tokio::task::spawn_blocking(move || {
        let entry = registry.get(&plan_id)?;
        let guard = registry.feedback_guard(&plan_id);
        let _guard = guard.lock().unwrap_or_else(|p| p.into_inner());
        feedback::acknowledge_answer(std::path::Path::new(&entry.path), &answer_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if let Ok(entry) = app.registry.get(&id) {
        app.bus.publish(&Event::PlanUpdated { plan: entry });
    }
    Ok(Json(serde_json::json!({ "answer": answer })))
}
