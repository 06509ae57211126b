//! Error types for the API server.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dw_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur in the API server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Startup configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Missing or rejected credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A request field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a failed request authentication to 401, or 403 for disabled accounts.
    #[must_use]
    pub fn from_auth_failure(err: dw_auth::Error) -> Self {
        match err {
            dw_auth::Error::PermissionDenied { reason } => Self::Forbidden(reason),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound(_, _) => (StatusCode::NOT_FOUND, "not_found"),
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::BindFailed(_, _) | Self::Config(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<dw_core::Error> for ApiError {
    fn from(err: dw_core::Error) -> Self {
        match err {
            dw_core::Error::Validation(e) => Self::Validation(e),
            dw_core::Error::WalletNotFound { address } => {
                Self::NotFound("wallet".to_string(), address)
            }
            e @ dw_core::Error::WalletInactive { .. } => Self::Forbidden(e.to_string()),
            e @ dw_core::Error::ExpiryOutOfRange => Self::Internal(e.to_string()),
        }
    }
}

impl From<dw_auth::Error> for ApiError {
    fn from(err: dw_auth::Error) -> Self {
        use dw_auth::Error as E;
        match err {
            E::Validation(e) => Self::Validation(e),
            E::UserNotFound { id } => Self::NotFound("user".to_string(), id),
            E::InvalidCredentials
            | E::TokenExpired
            | E::InvalidToken { .. }
            | E::InvalidWalletAddress { .. }
            | E::AuthenticationRequired => Self::Unauthorized(err.to_string()),
            E::AccountDisabled { .. } | E::PermissionDenied { .. } => {
                Self::Forbidden(err.to_string())
            }
            E::InvalidUserId { .. }
            | E::DuplicateEmail { .. }
            | E::DuplicateUserId { .. }
            | E::InvalidRole { .. } => Self::InvalidRequest(err.to_string()),
            E::JwtError { .. } | E::PasswordHashing { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use test_case::test_case;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let (status, json) =
            body_json(ApiError::NotFound("wallet".to_string(), "0xabc".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "wallet not found: 0xabc");
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let (status, json) =
            body_json(ApiError::from(ValidationError::empty("name"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("'name'"));
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let (status, json) = body_json(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "internal_error");
    }

    #[test_case(dw_core::Error::wallet_not_found("0x1"), StatusCode::NOT_FOUND ; "missing wallet")]
    #[test_case(
        dw_core::Error::WalletInactive { address: "0x1".to_string() },
        StatusCode::FORBIDDEN ;
        "inactive wallet"
    )]
    #[test_case(
        dw_core::Error::from(ValidationError::empty("to")),
        StatusCode::BAD_REQUEST ;
        "validation"
    )]
    #[test_case(
        dw_core::Error::ExpiryOutOfRange,
        StatusCode::INTERNAL_SERVER_ERROR ;
        "expiry overflow"
    )]
    fn test_core_error_status(err: dw_core::Error, expected: StatusCode) {
        assert_eq!(ApiError::from(err).into_response().status(), expected);
    }

    #[test_case(dw_auth::Error::InvalidCredentials, StatusCode::UNAUTHORIZED ; "bad login")]
    #[test_case(dw_auth::Error::TokenExpired, StatusCode::UNAUTHORIZED ; "expired")]
    #[test_case(
        dw_auth::Error::AccountDisabled { status: "inactive".to_string() },
        StatusCode::FORBIDDEN ;
        "disabled"
    )]
    #[test_case(
        dw_auth::Error::UserNotFound { id: "9".to_string() },
        StatusCode::NOT_FOUND ;
        "missing user"
    )]
    #[test_case(
        dw_auth::Error::DuplicateUserId { id: "1".to_string() },
        StatusCode::BAD_REQUEST ;
        "taken id"
    )]
    #[test_case(
        dw_auth::Error::PasswordHashing { reason: "bad salt".to_string() },
        StatusCode::INTERNAL_SERVER_ERROR ;
        "hashing"
    )]
    fn test_auth_error_status(err: dw_auth::Error, expected: StatusCode) {
        assert_eq!(ApiError::from(err).into_response().status(), expected);
    }

    #[test]
    fn test_auth_failure_mapping() {
        let missing = ApiError::from_auth_failure(dw_auth::Error::UserNotFound {
            id: "1".to_string(),
        });
        assert!(matches!(missing, ApiError::Unauthorized(_)));

        let disabled = ApiError::from_auth_failure(dw_auth::Error::PermissionDenied {
            reason: "account is inactive".to_string(),
        });
        assert!(matches!(disabled, ApiError::Forbidden(_)));
    }
}
