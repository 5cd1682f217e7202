//! Mock auth helpers for integration tests.
//!
//! `MockAuth` mints real HS256 bearer tokens for a configurable identity so
//! tests go through the same `Identity` extractor as production requests.

use ekpool_auth_types::token::issue_access_token;
use ekpool_domain::user::UserRole;
use http::{HeaderName, HeaderValue, header::AUTHORIZATION};

/// Secret shared by test routers and the tokens `MockAuth` mints.
pub const TEST_TOKEN_SECRET: &str = "ekpool-test-token-secret";

const TEST_TOKEN_TTL_SECS: u64 = 3600;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone)]
pub struct MockAuth {
    pub user_id: i64,
    pub user_name: String,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: i64, user_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            role,
        }
    }

    pub fn member(user_id: i64, user_name: impl Into<String>) -> Self {
        Self::new(user_id, user_name, UserRole::Member)
    }

    pub fn admin(user_id: i64, user_name: impl Into<String>) -> Self {
        Self::new(user_id, user_name, UserRole::Admin)
    }

    /// Signed token for this identity.
    pub fn token(&self, secret: &str) -> String {
        issue_access_token(
            self.user_id,
            &self.user_name,
            self.role,
            TEST_TOKEN_TTL_SECS,
            secret,
        )
        .unwrap()
    }

    /// `Authorization` header pair signed with [`TEST_TOKEN_SECRET`].
    pub fn authorization(&self) -> (HeaderName, HeaderValue) {
        let value = format!("Bearer {}", self.token(TEST_TOKEN_SECRET));
        (AUTHORIZATION, HeaderValue::from_str(&value).unwrap())
    }
}
