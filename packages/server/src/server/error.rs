use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::common::CoreError;

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument(_) => "invalid_argument",
            CoreError::Unavailable(_) => "unavailable",
            CoreError::Invariant(_) => "invariant_violation",
        }
    }
}

impl From<QueryRejection> for CoreError {
    fn from(rejection: QueryRejection) -> Self {
        CoreError::invalid(rejection.body_text())
    }
}

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => CoreError::invalid(err.body_text()),
            // Route table and handler disagree.
            other => CoreError::invariant(other.body_text()),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        // Store details stay in the logs.
        let message = match &self {
            CoreError::InvalidArgument(_) => self.to_string(),
            CoreError::Unavailable(e) => {
                tracing::error!(error = %e, "Store read failed");
                "store unavailable".to_string()
            }
            CoreError::Invariant(detail) => {
                tracing::error!(detail = %detail, "Stored data is inconsistent");
                "stored data is inconsistent".to_string()
            }
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CoreError::invalid("bad sort").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CoreError::Unavailable(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            CoreError::invariant("cycle").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = CoreError::invalid("limit must be a positive integer").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
