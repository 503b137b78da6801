//! Request Payload Validation
//!
//! Provides range checking and format validation shared by every payload the
//! service accepts (signup, profile, and model inputs).

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Validate, ValidationConfig, Validator};
