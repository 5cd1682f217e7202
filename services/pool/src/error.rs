use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Pool service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum PoolServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("unrecognized country: {0:?}")]
    InvalidCountry(String),
    #[error("code not found")]
    NotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("code is not reserved")]
    NotReserved,
    #[error("no codes available")]
    OutOfStock,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user still holds {0} reserved code(s)")]
    UserHasReservations(u64),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PoolServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InvalidCountry(_) => "INVALID_COUNTRY",
            Self::NotFound => "NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotReserved => "NOT_RESERVED",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::UserHasReservations(_) => "USER_HAS_RESERVATIONS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl IntoResponse for PoolServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::InvalidCountry(_) => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::NotReserved
            | Self::OutOfStock
            | Self::UserAlreadyExists
            | Self::UserHasReservations(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
