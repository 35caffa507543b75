//! # Runtime Errors
//!
//! Typed failures raised by the form runtime. Validation outcomes are not
//! errors; they live on the fields as [`ValidationError`] values.
//!
//! [`ValidationError`]: crate::runtime::validation::ValidationError

use crate::runtime::events::FieldId;
use std::time::Duration;
use thiserror::Error;

/// A model or view id could not be resolved, or a node was used in a way its
/// kind does not allow. Indicates a binding inconsistency, not user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("no model node with id `{0}` in this form")]
    UnknownModel(FieldId),

    #[error("no view element `{0}` in this document")]
    UnknownElement(String),

    #[error("model node `{0}` is a container, not a field")]
    NotAField(FieldId),

    #[error("duplicate model id `{0}`")]
    DuplicateId(FieldId),

    #[error("field `{0}` only accepts values from its challenge provider")]
    ChallengeValueLocked(FieldId),

    #[error("field `{0}` does not hold a value")]
    ValueNotAccepted(FieldId),

    #[error("field `{id}` cannot hold a {found} value")]
    TypeMismatch { id: FieldId, found: &'static str },

    #[error("field `{0}` is not a captcha")]
    NotACaptcha(FieldId),

    #[error("form has been torn down")]
    TornDown,
}

/// The third-party challenge did not produce a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeFailure {
    #[error("challenge rejected by provider: {0}")]
    Rejected(String),

    #[error("challenge timed out after {0:?}")]
    TimedOut(Duration),

    #[error("challenge provider unavailable: {0}")]
    Unavailable(String),
}

/// The submission collaborator reported an error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("captcha verification token expired")]
    TokenExpired,

    #[error("network error: {0}")]
    Network(String),
}

impl TransportFailure {
    /// Whether the backend asked for a fresh challenge
    pub fn is_token_expired(&self) -> bool {
        matches!(self, TransportFailure::TokenExpired)
    }
}

/// Failure to turn a form definition into a model tree
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid form definition: {0}")]
    Definition(#[from] serde_json::Error),

    #[error("invalid pattern on field `{id}`: {source}")]
    InvalidPattern {
        id: FieldId,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported default value on field `{id}`: {reason}")]
    InvalidDefault { id: FieldId, reason: String },

    #[error("id `{id}` is reserved for an element of field `{owner}`")]
    ReservedId { id: FieldId, owner: FieldId },

    #[error(transparent)]
    Structural(#[from] StructuralError),
}
