use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error taxonomy. Every handler failure funnels through here
/// and is rendered as `{kind, message}` JSON at the request boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("missing parameter: {0}")]
    MissingField(&'static str),

    #[error("{0} does not exist")]
    NotFound(&'static str),

    #[error("missing or malformed bearer token")]
    Unauthenticated,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid credentials")]
    Unauthorized,

    #[error("you do not own this offer")]
    Forbidden,

    #[error("this email already has an account")]
    DuplicateEmail,

    #[error("media upload failed: {0}")]
    Upload(String),

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable discriminant, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::MissingField(_) => "missing_field",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::DuplicateEmail => "duplicate_email",
            ApiError::Upload(_) => "upload",
            ApiError::Gateway(_) => "gateway",
            ApiError::Database(_) => "database",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::Upload(_) | ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "request failed");
        }
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("price out of range".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MissingField("email").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("offer").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Upload("bucket unreachable".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Gateway("charge declined".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // Login failure statuses must stay distinguishable: unknown email is 404,
    // bad password is 401.
    #[test]
    fn unknown_user_and_bad_password_are_distinct() {
        assert_ne!(
            ApiError::NotFound("user").status(),
            ApiError::Unauthorized.status()
        );
    }

    #[test]
    fn kinds_are_stable_identifiers() {
        assert_eq!(ApiError::DuplicateEmail.kind(), "duplicate_email");
        assert_eq!(ApiError::Unauthenticated.kind(), "unauthenticated");
        assert_eq!(ApiError::Gateway("down".into()).kind(), "gateway");
        assert_eq!(ApiError::NotFound("offer").kind(), "not_found");
    }

    #[test]
    fn messages_name_the_offending_part() {
        assert_eq!(
            ApiError::MissingField("picture").to_string(),
            "missing parameter: picture"
        );
        assert_eq!(
            ApiError::NotFound("offer").to_string(),
            "offer does not exist"
        );
    }
}
