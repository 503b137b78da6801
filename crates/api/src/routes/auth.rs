//! Authentication Routes

use axum::{extract::State, Json};
use data_validator::{Validate, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use storage::{NewUser, StorageError, UserRecord};
use tracing::{info, warn};
use user_auth::{hash_password, verify_password, TOKEN_TYPE};

use crate::error::{ApiError, ApiResult};
use crate::extract::{CurrentUser, ValidForm, ValidJson};
use crate::SharedState;

const EMAIL_TAKEN: &str = "Email already registered";

/// Signup payload
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl Validate for SignupRequest {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_email(&self.email)?;
        validator.validate_password(&self.password)?;
        validator.validate_not_blank("full_name", &self.full_name)?;
        validator.validate_phone(self.phone_number.as_deref())
    }
}

/// OAuth2-style password form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_not_blank("username", &self.username)?;
        validator.validate_not_blank("password", &self.password)
    }
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

/// Issued access token
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new user
pub async fn signup(
    State(state): State<SharedState>,
    ValidJson(request): ValidJson<SignupRequest>,
) -> ApiResult<Json<UserResponse>> {
    if state.repository.find_user_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))??;

    let user = state
        .repository
        .create_user(&NewUser {
            email: request.email,
            password_hash,
            full_name: request.full_name,
            phone_number: request.phone_number,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent signup
            StorageError::Conflict(_) => ApiError::Conflict(EMAIL_TAKEN.to_string()),
            other => other.into(),
        })?;

    info!("Registered user {}", user.id);
    Ok(Json(UserResponse::from(&user)))
}

/// Exchange email and password for an access token
pub async fn login(
    State(state): State<SharedState>,
    ValidForm(form): ValidForm<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state.repository.find_user_by_email(&form.username).await?;

    let verified = match &user {
        Some(user) => {
            let password = form.password;
            let stored_hash = user.password_hash.clone();
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))?
        }
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        metrics::counter!("auth_failures_total").increment(1);
        warn!("Failed login attempt");
        return Err(ApiError::Unauthorized("Incorrect email or password".to_string()));
    };

    let access_token = state.tokens.issue(&user.email)?;
    info!("User {} logged in", user.id);
    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

/// Current user
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
