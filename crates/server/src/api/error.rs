//! API 错误类型与 HTTP 映射。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use grading_orchestrator::OrchestratorError;
use homework_grader_api_types::ErrorResponse;
use homework_grader_core::domain::{DomainError, GradingProducerError};
use tracing::error;

use crate::repository::RepositoryError;

/// API 错误类型。
#[derive(Debug)]
pub struct ApiError {
    message: String,
    code: &'static str,
    status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ProblemIndexOutOfRange { .. }
            | DomainError::ErrorIndexOutOfRange { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INDEX", err.to_string())
            }
            DomainError::InvalidScore(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SCORE", err.to_string())
            }
            DomainError::InvalidJoinCode(_) => Self::bad_request("INVALID_JOIN_CODE", err.to_string()),
            DomainError::EmptyClassroomName
            | DomainError::EmptyAssignmentTitle
            | DomainError::EmptyParticipantId => Self::bad_request("INVALID_INPUT", err.to_string()),
        }
    }
}

impl From<GradingProducerError> for ApiError {
    fn from(err: GradingProducerError) -> Self {
        match err {
            GradingProducerError::Unavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "PRODUCER_UNAVAILABLE",
                err.to_string(),
            ),
            GradingProducerError::Timeout => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "PRODUCER_TIMEOUT", err.to_string())
            }
            GradingProducerError::MalformedResponse(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "MALFORMED_PRODUCER_RESPONSE",
                err.to_string(),
            ),
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Producer(err) => err.into(),
            OrchestratorError::Edit(err) => err.into(),
            OrchestratorError::SessionNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", err.to_string())
            }
            OrchestratorError::SessionBusy(_) => {
                Self::new(StatusCode::CONFLICT, "SESSION_BUSY", err.to_string())
            }
            OrchestratorError::Json(_) => Self::bad_request("INVALID_BODY", err.to_string()),
            OrchestratorError::Config(_) | OrchestratorError::Other(_) => {
                error!(error = %err, "orchestrator failure");
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::not_found(err.to_string()),
            RepositoryError::Conflict(_) => {
                Self::new(StatusCode::CONFLICT, "CONFLICT", err.to_string())
            }
            RepositoryError::Domain(err) => err.into(),
            RepositoryError::Corrupt(_)
            | RepositoryError::Database(_)
            | RepositoryError::Json(_) => {
                error!(error = %err, "persistence failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    err.to_string(),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "INVALID_BODY", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
