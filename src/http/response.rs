//! Mapping lifecycle outcomes onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::pipeline::LifecycleOutcome;

impl IntoResponse for LifecycleOutcome {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{LifecycleState, SortResponse, ValidationError};
    use std::time::Duration;

    #[test]
    fn test_rejected_outcome_uses_validation_status() {
        let outcome = LifecycleOutcome {
            state: LifecycleState::Rejected(ValidationError::MethodNotAllowed),
            response: SortResponse::error(12),
            stats: None,
        };
        assert_eq!(outcome.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_completed_outcome_is_ok_json() {
        let outcome = LifecycleOutcome {
            state: LifecycleState::Completed,
            response: SortResponse::success(13, Duration::from_millis(4)),
            stats: None,
        };
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
