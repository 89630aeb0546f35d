//! Per-plan feedback sidecar — comments, questions, and answers stored as
//! one JSON document next to the plan file.
//!
//! Layout:
//!   <dir>/<stem>.md             — the plan itself
//!   <dir>/<stem>.feedback.json  — everything reviewers attached to it
//!
//! Every mutation is a typed read-modify-write of the whole file. Callers on
//! a multithreaded runtime must serialize mutations per plan (the registry
//! hands out a per-plan guard for this); concurrent writers from separate
//! processes are last-write-wins.

use crate::error::{CollabError, Result};
use crate::{io, paths, plan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStatus {
    Pending,
    Answered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub selected_text: String,
    pub content: String,
    #[serde(default)]
    pub anchor_prefix: String,
    #[serde(default)]
    pub anchor_suffix: String,
    pub timestamp: DateTime<Utc>,
    pub status: CommentStatus,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default)]
    pub multi_select: bool,
    pub timestamp: DateTime<Utc>,
    pub status: QuestionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub question_id: String,
    /// Echo of the question text, so consumers don't need a second lookup.
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// The whole sidecar document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackFile {
    pub plan_path: String,
    pub plan_name: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl FeedbackFile {
    pub fn empty(plan_path: &Path) -> Self {
        let now = Utc::now();
        Self {
            plan_path: plan_path.to_string_lossy().to_string(),
            plan_name: plan::plan_name(plan_path),
            version: 1,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            questions: Vec::new(),
            answers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts (what callers supply; ids/timestamps/flags are ours)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub selected_text: String,
    pub content: String,
    #[serde(default)]
    pub anchor_prefix: String,
    #[serde(default)]
    pub anchor_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question_text: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default)]
    pub multi_select: bool,
}

// ---------------------------------------------------------------------------
// Pending read model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItems {
    pub comments: Vec<Comment>,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total_comments: usize,
    pub open_comments: usize,
    pub pending_comments: usize,
    pub total_answers: usize,
    pub pending_answers: usize,
    pub pending_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFeedback {
    pub plan_path: String,
    pub plan_name: String,
    pub version: u32,
    pub pending: PendingItems,
    pub summary: FeedbackSummary,
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Load the sidecar, falling back to an empty document when the file is
/// missing or unreadable. A corrupt sidecar should never take the plan down.
pub fn load(plan_path: &Path) -> FeedbackFile {
    let path = paths::feedback_path(plan_path);
    match std::fs::read_to_string(&path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unreadable feedback file, starting fresh");
            FeedbackFile::empty(plan_path)
        }),
        Err(_) => FeedbackFile::empty(plan_path),
    }
}

fn save(plan_path: &Path, feedback: &mut FeedbackFile) -> Result<()> {
    feedback.updated_at = Utc::now();
    let path = paths::feedback_path(plan_path);
    let data = serde_json::to_vec_pretty(feedback)?;
    io::atomic_write(&path, &data)
}

fn new_id(prefix: &str) -> String {
    let frag = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}_{}", Utc::now().timestamp_millis(), &frag[..8])
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub fn add_comment(plan_path: &Path, draft: CommentDraft) -> Result<Comment> {
    let mut feedback = load(plan_path);
    let comment = Comment {
        id: new_id("c"),
        selected_text: draft.selected_text,
        content: draft.content,
        anchor_prefix: draft.anchor_prefix,
        anchor_suffix: draft.anchor_suffix,
        timestamp: Utc::now(),
        status: CommentStatus::Open,
        acknowledged: false,
        resolved_at: None,
        acknowledged_at: None,
    };
    feedback.comments.push(comment.clone());
    save(plan_path, &mut feedback)?;
    Ok(comment)
}

/// Resolve a comment. Idempotent: resolving an already-resolved comment is a
/// no-op that still succeeds (and keeps the original `resolvedAt`).
pub fn resolve_comment(plan_path: &Path, comment_id: &str) -> Result<Comment> {
    let mut feedback = load(plan_path);
    let comment = feedback
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| CollabError::CommentNotFound(comment_id.to_string()))?;
    if comment.status != CommentStatus::Resolved {
        comment.status = CommentStatus::Resolved;
        comment.resolved_at = Some(Utc::now());
    }
    let resolved = comment.clone();
    save(plan_path, &mut feedback)?;
    Ok(resolved)
}

pub fn acknowledge_comment(plan_path: &Path, comment_id: &str) -> Result<Comment> {
    let mut feedback = load(plan_path);
    let comment = feedback
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| CollabError::CommentNotFound(comment_id.to_string()))?;
    if !comment.acknowledged {
        comment.acknowledged = true;
        comment.acknowledged_at = Some(Utc::now());
    }
    let acked = comment.clone();
    save(plan_path, &mut feedback)?;
    Ok(acked)
}

// ---------------------------------------------------------------------------
// Questions & answers
// ---------------------------------------------------------------------------

pub fn add_question(plan_path: &Path, draft: QuestionDraft) -> Result<Question> {
    let mut feedback = load(plan_path);
    let question = Question {
        id: new_id("q"),
        question_text: draft.question_text,
        context: draft.context,
        options: draft.options,
        multi_select: draft.multi_select,
        timestamp: Utc::now(),
        status: QuestionStatus::Pending,
        answered_at: None,
    };
    feedback.questions.push(question.clone());
    save(plan_path, &mut feedback)?;
    Ok(question)
}

/// Answer a pending question: creates the Answer record and flips the
/// question to ANSWERED in one write. Re-answering is rejected — a question
/// is answered exactly once.
pub fn answer_question(
    plan_path: &Path,
    question_id: &str,
    answer_text: &str,
) -> Result<(Answer, Question)> {
    let mut feedback = load(plan_path);
    let question = feedback
        .questions
        .iter_mut()
        .find(|q| q.id == question_id)
        .ok_or_else(|| CollabError::QuestionNotFound(question_id.to_string()))?;
    if question.status == QuestionStatus::Answered {
        return Err(CollabError::QuestionAlreadyAnswered(question_id.to_string()));
    }

    let answer = Answer {
        id: new_id("a"),
        question_id: question_id.to_string(),
        question: question.question_text.clone(),
        answer: answer_text.to_string(),
        timestamp: Utc::now(),
        acknowledged: false,
        acknowledged_at: None,
    };
    question.status = QuestionStatus::Answered;
    question.answered_at = Some(answer.timestamp);
    let answered = question.clone();

    feedback.answers.push(answer.clone());
    save(plan_path, &mut feedback)?;
    Ok((answer, answered))
}

pub fn acknowledge_answer(plan_path: &Path, answer_id: &str) -> Result<Answer> {
    let mut feedback = load(plan_path);
    let answer = feedback
        .answers
        .iter_mut()
        .find(|a| a.id == answer_id)
        .ok_or_else(|| CollabError::AnswerNotFound(answer_id.to_string()))?;
    if !answer.acknowledged {
        answer.acknowledged = true;
        answer.acknowledged_at = Some(Utc::now());
    }
    let acked = answer.clone();
    save(plan_path, &mut feedback)?;
    Ok(acked)
}

/// Mark every unacknowledged comment and answer as seen. Returns how many
/// items were flipped.
pub fn acknowledge_all(plan_path: &Path) -> Result<usize> {
    let mut feedback = load(plan_path);
    let now = Utc::now();
    let mut acknowledged = 0;

    for comment in feedback.comments.iter_mut().filter(|c| !c.acknowledged) {
        comment.acknowledged = true;
        comment.acknowledged_at = Some(now);
        acknowledged += 1;
    }
    for answer in feedback.answers.iter_mut().filter(|a| !a.acknowledged) {
        answer.acknowledged = true;
        answer.acknowledged_at = Some(now);
        acknowledged += 1;
    }

    if acknowledged > 0 {
        save(plan_path, &mut feedback)?;
    }
    Ok(acknowledged)
}

// ---------------------------------------------------------------------------
// Pending read model
// ---------------------------------------------------------------------------

pub fn summarize(feedback: &FeedbackFile) -> FeedbackSummary {
    FeedbackSummary {
        total_comments: feedback.comments.len(),
        open_comments: feedback
            .comments
            .iter()
            .filter(|c| c.status == CommentStatus::Open)
            .count(),
        pending_comments: feedback
            .comments
            .iter()
            .filter(|c| c.status == CommentStatus::Open && !c.acknowledged)
            .count(),
        total_answers: feedback.answers.len(),
        pending_answers: feedback.answers.iter().filter(|a| !a.acknowledged).count(),
        pending_questions: feedback
            .questions
            .iter()
            .filter(|q| q.status == QuestionStatus::Pending)
            .count(),
    }
}

/// What the automation consumer polls for: only OPEN, unacknowledged
/// comments and unacknowledged answers. Acknowledging what it reads drains
/// this to empty.
pub fn pending(plan_path: &Path) -> PendingFeedback {
    let feedback = load(plan_path);
    let summary = summarize(&feedback);
    PendingFeedback {
        plan_path: feedback.plan_path.clone(),
        plan_name: feedback.plan_name.clone(),
        version: feedback.version,
        pending: PendingItems {
            comments: feedback
                .comments
                .iter()
                .filter(|c| c.status == CommentStatus::Open && !c.acknowledged)
                .cloned()
                .collect(),
            answers: feedback
                .answers
                .iter()
                .filter(|a| !a.acknowledged)
                .cloned()
                .collect(),
        },
        summary,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("plan.md");
        std::fs::write(&path, "# Plan\nbody").unwrap();
        path
    }

    fn draft(text: &str) -> CommentDraft {
        CommentDraft {
            selected_text: text.to_string(),
            content: "fix this".to_string(),
            anchor_prefix: String::new(),
            anchor_suffix: String::new(),
        }
    }

    #[test]
    fn add_comment_starts_open_and_unacknowledged() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let comment = add_comment(&plan, draft("body")).unwrap();
        assert_eq!(comment.status, CommentStatus::Open);
        assert!(!comment.acknowledged);
        assert!(comment.id.starts_with("c_"));

        let loaded = load(&plan);
        assert_eq!(loaded.comments.len(), 1);
    }

    #[test]
    fn anchors_are_stored_verbatim() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let comment = add_comment(
            &plan,
            CommentDraft {
                selected_text: "Hello".into(),
                content: "note".into(),
                anchor_prefix: "  before ".into(),
                anchor_suffix: " after\n".into(),
            },
        )
        .unwrap();
        let loaded = load(&plan);
        assert_eq!(loaded.comments[0].anchor_prefix, "  before ");
        assert_eq!(loaded.comments[0].anchor_suffix, " after\n");
        assert_eq!(comment.anchor_prefix, "  before ");
    }

    #[test]
    fn resolve_comment_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let comment = add_comment(&plan, draft("x")).unwrap();

        let first = resolve_comment(&plan, &comment.id).unwrap();
        assert_eq!(first.status, CommentStatus::Resolved);
        let stamped = first.resolved_at.unwrap();

        let second = resolve_comment(&plan, &comment.id).unwrap();
        assert_eq!(second.status, CommentStatus::Resolved);
        assert_eq!(second.resolved_at.unwrap(), stamped);
    }

    #[test]
    fn resolve_missing_comment_errors() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let err = resolve_comment(&plan, "c_nope").unwrap_err();
        assert!(matches!(err, CollabError::CommentNotFound(_)));
    }

    #[test]
    fn answer_flips_question_and_rejects_second_answer() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let question = add_question(
            &plan,
            QuestionDraft {
                question_text: "REST or GraphQL?".into(),
                context: String::new(),
                options: Some(vec![
                    QuestionOption { label: "REST".into(), description: String::new() },
                    QuestionOption { label: "GraphQL".into(), description: String::new() },
                ]),
                multi_select: false,
            },
        )
        .unwrap();
        assert_eq!(question.status, QuestionStatus::Pending);

        let (answer, answered) = answer_question(&plan, &question.id, "REST").unwrap();
        assert_eq!(answer.answer, "REST");
        assert_eq!(answer.question, "REST or GraphQL?");
        assert_eq!(answered.status, QuestionStatus::Answered);
        assert!(answered.answered_at.is_some());

        let err = answer_question(&plan, &question.id, "GraphQL").unwrap_err();
        assert!(matches!(err, CollabError::QuestionAlreadyAnswered(_)));
        assert_eq!(load(&plan).answers.len(), 1);
    }

    #[test]
    fn pending_excludes_acknowledged_and_resolved() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        let keep = add_comment(&plan, draft("keep")).unwrap();
        let resolved = add_comment(&plan, draft("resolved")).unwrap();
        resolve_comment(&plan, &resolved.id).unwrap();
        let acked = add_comment(&plan, draft("acked")).unwrap();
        acknowledge_comment(&plan, &acked.id).unwrap();

        let pending = pending(&plan);
        assert_eq!(pending.pending.comments.len(), 1);
        assert_eq!(pending.pending.comments[0].id, keep.id);
        assert_eq!(pending.summary.total_comments, 3);
        assert_eq!(pending.summary.open_comments, 2);
        assert_eq!(pending.summary.pending_comments, 1);
    }

    #[test]
    fn acknowledge_all_drains_pending() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        add_comment(&plan, draft("a")).unwrap();
        let q = add_question(
            &plan,
            QuestionDraft {
                question_text: "ship it?".into(),
                context: String::new(),
                options: None,
                multi_select: false,
            },
        )
        .unwrap();
        answer_question(&plan, &q.id, "yes").unwrap();

        let count = acknowledge_all(&plan).unwrap();
        assert_eq!(count, 2);

        let pending = pending(&plan);
        assert!(pending.pending.comments.is_empty());
        assert!(pending.pending.answers.is_empty());

        // Nothing left to flip on a second pass.
        assert_eq!(acknowledge_all(&plan).unwrap(), 0);
    }

    #[test]
    fn sidecar_lands_next_to_plan() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        add_comment(&plan, draft("x")).unwrap();
        assert!(dir.path().join("plan.feedback.json").exists());
    }

    #[test]
    fn corrupt_sidecar_loads_empty() {
        let dir = TempDir::new().unwrap();
        let plan = plan_file(&dir);
        std::fs::write(dir.path().join("plan.feedback.json"), "{not json").unwrap();
        let loaded = load(&plan);
        assert!(loaded.comments.is_empty());
    }
}
