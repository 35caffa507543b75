//! # Model Events
//!
//! Events emitted synchronously by field models when their state changes.
//! Bound views and the form-level event bus react to these.

use super::types::{ChallengeState, FieldId, FieldValue};
use crate::runtime::validation::ValidationError;

/// Events emitted when a field model changes
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Field value replaced (user input, programmatic, or challenge result)
    ValueChanged {
        id: FieldId,
        old_value: Option<FieldValue>,
        new_value: Option<FieldValue>,
    },

    /// Field shown or suppressed
    VisibilityChanged { id: FieldId, visible: bool },

    /// Field enabled or disabled
    EnablementChanged { id: FieldId, enabled: bool },

    /// Field read-only flag toggled
    ReadOnlyChanged { id: FieldId, read_only: bool },

    /// Validation errors attached or cleared
    ErrorsChanged {
        id: FieldId,
        errors: Vec<ValidationError>,
    },

    /// Captcha adapter moved between challenge states
    ChallengeStateChanged {
        id: FieldId,
        old_state: ChallengeState,
        new_state: ChallengeState,
    },
}

impl ModelEvent {
    /// Id of the field that emitted the event
    pub fn field_id(&self) -> &FieldId {
        match self {
            ModelEvent::ValueChanged { id, .. }
            | ModelEvent::VisibilityChanged { id, .. }
            | ModelEvent::EnablementChanged { id, .. }
            | ModelEvent::ReadOnlyChanged { id, .. }
            | ModelEvent::ErrorsChanged { id, .. }
            | ModelEvent::ChallengeStateChanged { id, .. } => id,
        }
    }
}
