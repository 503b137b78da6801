//! Request Extractors
//!
//! Bearer-token authentication plus JSON and form bodies that are validated
//! before a handler sees them. Rejections map to [`ApiError`] so every
//! failure shares the same response shape.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Form, Json,
};
use data_validator::{Validate, Validator};
use serde::de::DeserializeOwned;
use storage::UserRecord;
use tracing::debug;

use crate::error::ApiError;
use crate::SharedState;

/// The user resolved from a valid bearer token
pub struct CurrentUser(pub UserRecord);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let claims = state.tokens.verify(token)?;
        let user = state
            .repository
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                debug!("Token subject {} no longer exists", claims.sub);
                ApiError::Unauthorized("Could not validate credentials".to_string())
            })?;

        Ok(CurrentUser(user))
    }
}

/// JSON body that passed [`Validate`]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate(&Validator::default())?;
        Ok(Self(value))
    }
}

/// URL-encoded form body that passed [`Validate`]
pub struct ValidForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate(&Validator::default())?;
        Ok(Self(value))
    }
}
