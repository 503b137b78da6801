//! Range and Format Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Payloads that can check their own fields against a [`Validator`]
pub trait Validate {
    /// Return the first violation found, if any
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError>;
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Age valid range (years)
    pub age_range: (f64, f64),
    /// Height valid range (cm)
    pub height_range: (f64, f64),
    /// Weight valid range (kg)
    pub weight_range: (f64, f64),
    /// Blood pressure valid range (mmHg)
    pub blood_pressure_range: (f64, f64),
    /// Minimum password length
    pub min_password_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            age_range: (0.0, 130.0),
            height_range: (30.0, 280.0),
            weight_range: (1.0, 500.0),
            blood_pressure_range: (0.0, 400.0),
            min_password_len: 1,
        }
    }
}

/// Validator for request payload fields
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        self.validate_finite(field, value)?;
        if value < range.0 || value > range.1 {
            debug!("Rejected {}={} outside [{}, {}]", field, value, range.0, range.1);
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Reject NaN and infinities
    pub fn validate_finite(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::NotFinite(field))
        }
    }

    /// Validate a 0/1 indicator
    pub fn validate_flag(&self, field: &'static str, value: i64) -> Result<(), ValidationError> {
        match value {
            0 | 1 => Ok(()),
            _ => Err(ValidationError::NotAFlag { field, value }),
        }
    }

    /// Validate that a value is not negative
    pub fn validate_non_negative(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field, value, (0.0, f64::MAX))
    }

    /// Validate age in years
    pub fn validate_age(&self, age: f64) -> Result<(), ValidationError> {
        self.validate_range("age", age, self.config.age_range)
    }

    /// Validate height in centimetres
    pub fn validate_height(&self, height: f64) -> Result<(), ValidationError> {
        self.validate_range("height", height, self.config.height_range)
    }

    /// Validate weight in kilograms
    pub fn validate_weight(&self, weight: f64) -> Result<(), ValidationError> {
        self.validate_range("weight", weight, self.config.weight_range)
    }

    /// Validate a blood pressure reading
    pub fn validate_blood_pressure(
        &self,
        field: &'static str,
        value: f64,
    ) -> Result<(), ValidationError> {
        self.validate_range(field, value, self.config.blood_pressure_range)
    }

    /// Validate a required free-text field
    pub fn validate_not_blank(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::MissingField(field))
        } else {
            Ok(())
        }
    }

    /// Validate an email address (shape only, no deliverability check)
    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        self.validate_not_blank("email", email)?;
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "email",
            reason: reason.to_string(),
        };

        if email.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing '@'"))?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(invalid("expected local@domain"));
        }
        Ok(())
    }

    /// Validate a password before hashing
    pub fn validate_password(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if password.chars().count() < self.config.min_password_len {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: format!("must be at least {} characters", self.config.min_password_len),
            });
        }
        Ok(())
    }

    /// Validate an optional phone number (E.164-like: optional '+', digits, spaces, dashes)
    pub fn validate_phone(&self, phone: Option<&str>) -> Result<(), ValidationError> {
        let Some(phone) = phone else {
            return Ok(());
        };
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        let allowed = phone
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (i == 0 && c == '+'));
        if !allowed || !(7..=15).contains(&digits) {
            return Err(ValidationError::InvalidFormat {
                field: "phone_number",
                reason: "expected 7 to 15 digits with an optional leading '+'".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_height() {
        let validator = Validator::default();
        assert!(validator.validate_height(170.0).is_ok());
        assert!(validator.validate_height(30.0).is_ok());
        assert!(validator.validate_height(280.0).is_ok());
    }

    #[test]
    fn test_zero_height_rejected() {
        let validator = Validator::default();
        let err = validator.validate_height(0.0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "height", .. }));
    }

    #[test]
    fn test_nan_rejected() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_weight(f64::NAN),
            Err(ValidationError::NotFinite("weight"))
        );
    }

    #[test]
    fn test_flags() {
        let validator = Validator::default();
        assert!(validator.validate_flag("smoke", 0).is_ok());
        assert!(validator.validate_flag("smoke", 1).is_ok());
        assert!(validator.validate_flag("smoke", 2).is_err());
    }

    #[test]
    fn test_email_shapes() {
        let validator = Validator::default();
        assert!(validator.validate_email("ada@example.com").is_ok());
        assert!(validator.validate_email("").is_err());
        assert!(validator.validate_email("no-at-sign").is_err());
        assert!(validator.validate_email("a@b@c").is_err());
        assert!(validator.validate_email("@example.com").is_err());
        assert!(validator.validate_email("ada @example.com").is_err());
    }

    #[test]
    fn test_phone_numbers() {
        let validator = Validator::default();
        assert!(validator.validate_phone(None).is_ok());
        assert!(validator.validate_phone(Some("+15551234567")).is_ok());
        assert!(validator.validate_phone(Some("555-123 4567")).is_ok());
        assert!(validator.validate_phone(Some("12+34567")).is_err());
        assert!(validator.validate_phone(Some("123")).is_err());
    }

    #[test]
    fn test_password_required() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_password(""),
            Err(ValidationError::MissingField("password"))
        );
        assert!(validator.validate_password("hunter2").is_ok());
    }

    proptest! {
        #[test]
        fn range_check_agrees_with_bounds(value in -1000.0f64..1000.0) {
            let validator = Validator::default();
            let inside = (30.0..=280.0).contains(&value);
            prop_assert_eq!(validator.validate_height(value).is_ok(), inside);
        }
    }
}
