//! Contact form validation
//!
//! Validation only; submission has no backend.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }

    /// Minimum trimmed length, if the field has one
    fn min_len(self) -> Option<usize> {
        match self {
            Field::Name => Some(2),
            Field::Subject => Some(3),
            Field::Message => Some(10),
            Field::Email => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected field and why
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    /// Check every field, collecting all failures in field order
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = Field::ALL
            .into_iter()
            .filter_map(|field| validate_field(field, self.value(field)).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validate one field value. Surrounding whitespace is ignored.
pub fn validate_field(field: Field, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, format!("{} is required", field.as_str())));
    }

    if let Some(min) = field.min_len() {
        if value.chars().count() < min {
            return Err(FieldError::new(
                field,
                format!("{} must be at least {min} characters", field.as_str()),
            ));
        }
    }

    if field == Field::Email && !email_regex().is_match(value) {
        return Err(FieldError::new(field, "please enter a valid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "I enjoyed your portfolio.".into(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert_eq!(valid_form().validate(), Ok(()));
    }

    #[test]
    fn test_minimum_lengths_after_trimming() {
        assert!(validate_field(Field::Name, " A ").is_err());
        assert!(validate_field(Field::Name, "Al").is_ok());
        assert!(validate_field(Field::Subject, "Hi").is_err());
        assert!(validate_field(Field::Message, "too short").is_err());
        assert!(validate_field(Field::Message, "long enough").is_ok());
    }

    #[test]
    fn test_email_pattern() {
        for ok in ["a@b.co", "first.last@sub.example.org"] {
            assert!(validate_field(Field::Email, ok).is_ok(), "{ok}");
        }
        for bad in ["plain", "no@tld", "two@@example.com", "sp ace@example.com"] {
            assert!(validate_field(Field::Email, bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_collects_all_errors_in_order() {
        let form = ContactForm {
            email: "nope".into(),
            message: "short".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Email, Field::Message]);
        assert_eq!(errors[1].to_string(), "message: message must be at least 10 characters");
    }

    #[test]
    fn test_empty_field_is_required() {
        let err = validate_field(Field::Subject, "   ").unwrap_err();
        assert_eq!(err.message, "subject is required");
    }
}
