//! Hosted auth provider client. Resolves a bearer token to the current user id.
//!
//! The portal never manages sessions itself. A request carrying
//! `Authorization: Bearer <access token>` is checked against the provider's
//! `/auth/v1/user` endpoint; anything short of a clean `200` with an `id`
//! means the caller is anonymous.

use serde_json::Value;
use uuid::Uuid;

/// Hosted auth configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl AuthConfig {
    /// Load from `AUTH_URL` and `AUTH_ANON_KEY`.
    /// Returns `None` if either is missing (every caller is then anonymous).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("AUTH_URL").ok()?;
        let anon_key = std::env::var("AUTH_ANON_KEY").ok()?;
        Some(Self { base_url: base_url.trim_end_matches('/').to_string(), anon_key })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Request(String),
    #[error("auth provider returned status {0}")]
    Status(u16),
    #[error("auth response parse failed: {0}")]
    Parse(String),
}

impl crate::error::ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_AUTH_REQUEST",
            Self::Status(_) => "E_AUTH_STATUS",
            Self::Parse(_) => "E_AUTH_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status(500..=599))
    }
}

/// Current-user check. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve an access token to a user id. `Ok(None)` means the token is
    /// not (or no longer) valid.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the provider cannot be reached or answers
    /// with something unexpected.
    async fn current_user(&self, access_token: &str) -> Result<Option<Uuid>, AuthError>;
}

pub struct HostedAuth {
    http: reqwest::Client,
    config: AuthConfig,
}

impl HostedAuth {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }
}

#[async_trait::async_trait]
impl Authenticator for HostedAuth {
    async fn current_user(&self, access_token: &str) -> Result<Option<Uuid>, AuthError> {
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.config.base_url))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        if matches!(status, 401 | 403) {
            return Ok(None);
        }
        if status != 200 {
            return Err(AuthError::Status(status));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        parse_user_id(&body).map(Some)
    }
}

pub(crate) fn parse_user_id(body: &str) -> Result<Uuid, AuthError> {
    let root: Value = serde_json::from_str(body).map_err(|e| AuthError::Parse(e.to_string()))?;
    let raw = root
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::Parse("missing id".into()))?;
    Uuid::parse_str(raw).map_err(|e| AuthError::Parse(e.to_string()))
}

/// Strip the `Bearer ` scheme from an `Authorization` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
