//! API error type and the JSON error payload.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use wedplan_auth::AuthError;
use wedplan_core::error::{ConflictKind, WedplanError};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Stable error code identifier.
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    /// A request that conflicts with stored state. Reported as 400.
    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// The cause has already been logged; the client sees a generic text.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    fn to_status_and_payload(&self) -> (StatusCode, ErrorResponse) {
        let (status, code) = match self {
            Self::BadRequest { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Conflict { code, .. } => (StatusCode::BAD_REQUEST, *code),
            Self::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        (
            status,
            ErrorResponse {
                error: ErrorDetail {
                    error_code: code.to_string(),
                    message: self.to_string(),
                },
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = self.to_status_and_payload();
        (status, Json(payload)).into_response()
    }
}

fn conflict_code(kind: &ConflictKind) -> &'static str {
    match kind {
        ConflictKind::ActiveOrderExists => "ACTIVE_ORDER_EXISTS",
        ConflictKind::DateUnavailable => "DATE_UNAVAILABLE",
        ConflictKind::EmailTaken => "EMAIL_TAKEN",
        ConflictKind::InvalidTransition { .. } => "INVALID_TRANSITION",
    }
}

impl From<WedplanError> for ApiError {
    fn from(err: WedplanError) -> Self {
        match err {
            WedplanError::Validation { message } => Self::BadRequest { message },
            WedplanError::Conflict(kind) => Self::Conflict {
                code: conflict_code(&kind),
                message: kind.to_string(),
            },
            WedplanError::AuthenticationFailed { reason } => Self::Unauthorized { message: reason },
            WedplanError::AuthorizationDenied { reason } => Self::Forbidden { message: reason },
            WedplanError::NotFound { entity, .. } => Self::NotFound {
                message: format!("{entity} not found"),
            },
            WedplanError::Database(_)
            | WedplanError::Crypto(_)
            | WedplanError::Storage(_)
            | WedplanError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
                Self::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        WedplanError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(format!("invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: WedplanError) -> StatusCode {
        ApiError::from(err).to_status_and_payload().0
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_of(WedplanError::validation("missing field")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ConflictKind::DateUnavailable.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WedplanError::AuthenticationFailed {
                reason: "invalid credentials".into()
            }),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(WedplanError::AuthorizationDenied {
                reason: "admins only".into()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(WedplanError::not_found("order", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(WedplanError::Database("connection reset".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflicts_carry_their_own_code() {
        let (_, payload) =
            ApiError::from(WedplanError::from(ConflictKind::ActiveOrderExists))
                .to_status_and_payload();
        assert_eq!(payload.error.error_code, "ACTIVE_ORDER_EXISTS");
        assert_eq!(payload.error.message, "client already has an active order");
    }

    #[test]
    fn internal_causes_are_not_exposed() {
        let (_, payload) =
            ApiError::from(WedplanError::Database("secret dsn".into())).to_status_and_payload();
        assert_eq!(payload.error.error_code, "INTERNAL_ERROR");
        assert!(!payload.error.message.contains("secret"));
    }
}
