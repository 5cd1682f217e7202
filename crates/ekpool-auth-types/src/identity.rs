//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use ekpool_domain::user::UserRole;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::token::validate_access_token;

/// HS256 secret used to validate access tokens. Exposed to the extractor via `FromRef`.
#[derive(Clone)]
pub struct AccessTokenSecret(Arc<str>);

impl AccessTokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessTokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessTokenSecret(..)")
    }
}

/// Caller identity taken from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent or the token does not validate.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub user_name: String,
    pub role: UserRole,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AccessTokenSecret: FromRef<S>,
{
    type Rejection = StatusCode;

    // Extract synchronously, then return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = AccessTokenSecret::from_ref(state);
        let identity = bearer_token(parts).and_then(|token| {
            validate_access_token(token, secret.as_str())
                .inspect_err(|e| tracing::debug!(error = %e, "rejected access token"))
                .ok()
        });

        async move {
            let info = identity.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                user_id: info.user_id,
                user_name: info.user_name,
                role: info.role,
            })
        }
    }
}
