//! Caller identity for chat routes.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;
use uuid::Uuid;

use crate::auth::bearer_token;
use crate::error::ErrorCode;
use crate::state::AppState;

/// The authenticated user, if any. Never rejects: a missing header, an
/// unconfigured provider, an invalid token and a provider failure all mean
/// anonymous.
pub struct MaybeUser(pub Option<Uuid>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
        else {
            return Ok(Self(None));
        };

        let app_state = AppState::from_ref(state);
        let Some(auth) = app_state.auth else {
            return Ok(Self(None));
        };

        match auth.current_user(token).await {
            Ok(user) => Ok(Self(user)),
            Err(e) => {
                warn!(
                    code = e.error_code(),
                    retryable = e.retryable(),
                    error = %e,
                    "auth: current-user check failed; treating caller as anonymous"
                );
                Ok(Self(None))
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
