use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use collab_core::CollabError;

/// Unified error type for HTTP responses. Wraps `anyhow::Error` so route
/// handlers can use `?` on core and task-join errors alike.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CollabError::MissingField(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<CollabError>() {
            match e {
                CollabError::PlanNotFound(_)
                | CollabError::PlanFileNotFound(_)
                | CollabError::CommentNotFound(_)
                | CollabError::QuestionNotFound(_)
                | CollabError::AnswerNotFound(_) => StatusCode::NOT_FOUND,
                CollabError::NotOwner { .. } => StatusCode::FORBIDDEN,
                CollabError::MissingField(_) | CollabError::InvalidStatus(_) => {
                    StatusCode::BAD_REQUEST
                }
                CollabError::QuestionAlreadyAnswered(_) => StatusCode::CONFLICT,
                CollabError::HomeNotFound | CollabError::Io(_) | CollabError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_not_found_maps_to_404() {
        let err = AppError(CollabError::PlanNotFound("abc".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_file_maps_to_404() {
        let err = AppError(CollabError::PlanFileNotFound("/tmp/x.md".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_owner_maps_to_403() {
        let err = AppError(
            CollabError::NotOwner {
                plan: "abc".into(),
                session: "s2".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_field_maps_to_400() {
        let err = AppError::bad_request("planPath is required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn already_answered_maps_to_409() {
        let err = AppError(CollabError::QuestionAlreadyAnswered("q1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(CollabError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_collab_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json_with_error_field() {
        let err = AppError(CollabError::PlanNotFound("abc".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
