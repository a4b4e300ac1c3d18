//! Field-level validation errors and shared input rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

pub const PHONE_DIGITS: usize = 10;

/// A problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Same error, reported under a nested path (`locations[0].items[2]`).
    pub fn nested(self, prefix: &str) -> Self {
        Self {
            field: format!("{}.{}", prefix, self.field),
            message: self.message,
        }
    }
}

/// Every field problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} field error(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn add(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

/// Trimmed, non-empty text or a "required" error.
pub fn required(field: &str, value: &str, label: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, format!("{} is required", label)));
    }
    Ok(value.to_string())
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Trimmed and lowercased address, or an error.
pub fn normalize_email(field: &str, value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, "Email is required"));
    }
    if !is_valid_email(value) {
        return Err(FieldError::new(field, "Enter a valid email address"));
    }
    Ok(value.to_lowercase())
}

/// Keep digits only and cut at ten, the way the input box filters typing.
pub fn filter_phone(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect()
}

/// Filtered phone number that must come out at exactly ten digits.
pub fn normalize_phone(field: &str, value: &str) -> Result<String, FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "Contact number is required"));
    }
    let digits = filter_phone(value);
    if digits.len() != PHONE_DIGITS {
        return Err(FieldError::new(field, "Contact number must be exactly 10 digits"));
    }
    Ok(digits)
}

/// Split a comma separated CC list, validating each address.
pub fn parse_cc_list(field: &str, value: &str) -> Result<Vec<String>, FieldError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(|email| {
            if is_valid_email(email) {
                Ok(email.to_string())
            } else {
                Err(FieldError::new(field, format!("Invalid email address: {}", email)))
            }
        })
        .collect()
}
