//! # Validation
//!
//! Field-scoped validation errors, their default messages, and the engine
//! that evaluates rules over the model tree on a submission attempt.

pub mod engine;

pub use engine::{ValidationEngine, ValidationPolicy, ValidationReport, Validator};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message attached to required fields left empty (and unverified captchas)
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Please fill in this field.";

pub const DEFAULT_PATTERN_MESSAGE: &str = "Please match the format requested.";

pub const DEFAULT_TYPE_MESSAGE: &str = "Please enter a number.";

/// Rule that produced a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    Required,
    Pattern,
    MaxLength,
    Minimum,
    Maximum,
    Type,
    Custom,
}

/// User-facing, field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Per-field overrides of the default constraint messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintMessages {
    pub required: Option<String>,
    pub pattern: Option<String>,
    pub max_length: Option<String>,
    pub minimum: Option<String>,
    pub maximum: Option<String>,
    #[serde(rename = "type")]
    pub type_mismatch: Option<String>,
}

impl ConstraintMessages {
    /// Build the error for `kind`, preferring the authored message
    pub fn error(&self, kind: ValidationErrorKind, fallback: impl Into<String>) -> ValidationError {
        let authored = match kind {
            ValidationErrorKind::Required => self.required.as_ref(),
            ValidationErrorKind::Pattern => self.pattern.as_ref(),
            ValidationErrorKind::MaxLength => self.max_length.as_ref(),
            ValidationErrorKind::Minimum => self.minimum.as_ref(),
            ValidationErrorKind::Maximum => self.maximum.as_ref(),
            ValidationErrorKind::Type => self.type_mismatch.as_ref(),
            ValidationErrorKind::Custom => None,
        };
        match authored {
            Some(message) => ValidationError::new(kind, message.clone()),
            None => ValidationError::new(kind, fallback),
        }
    }

    pub fn required_error(&self) -> ValidationError {
        self.error(ValidationErrorKind::Required, DEFAULT_REQUIRED_MESSAGE)
    }
}
