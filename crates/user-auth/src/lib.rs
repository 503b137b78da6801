//! User Authentication
//!
//! Credential handling for the HTTP layer:
//! - Argon2id password hashing and verification
//! - HS256 access tokens carrying the user's email as subject

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenConfig, TokenService, TOKEN_TYPE};

use thiserror::Error;

/// Authentication error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}
