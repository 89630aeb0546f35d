use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollabError {
    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("plan file not found: {0}")]
    PlanFileNotFound(PathBuf),

    #[error("comment not found: {0}")]
    CommentNotFound(String),

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("answer not found: {0}")]
    AnswerNotFound(String),

    #[error("question already answered: {0}")]
    QuestionAlreadyAnswered(String),

    #[error("session '{session}' does not own plan {plan}")]
    NotOwner { plan: String, session: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid status '{0}': comments only move OPEN -> RESOLVED")]
    InvalidStatus(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CollabError>;
