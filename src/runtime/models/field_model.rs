//! # Field Model
//!
//! State of a single form field plus the observer list of whoever renders it.
//! Every mutation notifies observers synchronously before returning.

use crate::runtime::errors::{ChallengeFailure, StructuralError};
use crate::runtime::events::{
    ChallengeState, ComponentType, FieldCapabilities, FieldId, FieldValue, ModelEvent,
    ModelEventHandler, Validity, VerificationToken,
};
use crate::runtime::models::captcha_model::{CaptchaAdapter, ChallengeRequest};
use crate::runtime::validation::{ConstraintMessages, ValidationError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a button does when clicked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    #[default]
    Submit,
    /// Plain button; clicks have no runtime effect
    Button,
}

/// Closed set of field kinds sharing the field interface
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Button(ButtonAction),
    Captcha(CaptchaAdapter),
}

impl FieldKind {
    pub fn component_type(&self) -> ComponentType {
        match self {
            FieldKind::Text => ComponentType::TextInput,
            FieldKind::Number => ComponentType::NumberInput,
            FieldKind::Checkbox => ComponentType::Checkbox,
            FieldKind::Button(_) => ComponentType::Button,
            FieldKind::Captcha(adapter) => ComponentType::Captcha(adapter.provider()),
        }
    }

    /// Whether a programmatic value of this shape fits the kind.
    /// Number fields keep raw text so that bad input can be reported.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Number, FieldValue::Number(_) | FieldValue::Text(_))
                | (FieldKind::Checkbox, FieldValue::Boolean(_))
        )
    }

    /// Convert text committed into a widget into a value for this kind
    pub fn coerce_input(&self, text: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Text => {
                if text.is_empty() {
                    None
                } else {
                    Some(FieldValue::Text(text.to_string()))
                }
            }
            FieldKind::Number => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    // "NaN" and "inf" parse, but are not numbers a user can submit
                    match trimmed.parse::<f64>() {
                        Ok(number) if number.is_finite() => Some(FieldValue::Number(number)),
                        _ => Some(FieldValue::Text(text.to_string())),
                    }
                }
            }
            FieldKind::Checkbox => Some(FieldValue::Boolean(matches!(
                text.trim(),
                "true" | "on" | "1"
            ))),
            FieldKind::Button(_) | FieldKind::Captcha(_) => None,
        }
    }
}

/// Declarative constraints checked by the validation engine
#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    /// Anchored pattern the whole text value must match
    pub pattern: Option<Regex>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Immutable snapshot of a field, consistent at the instant it was taken
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub id: FieldId,
    pub visible: bool,
    pub enabled: bool,
    pub read_only: bool,
    pub required: bool,
    pub value: Option<FieldValue>,
    pub validity: Validity,
    pub challenge: Option<ChallengeState>,
}

/// A leaf node of the form model
pub struct FieldModel {
    id: FieldId,
    name: String,
    label: Option<String>,
    kind: FieldKind,
    value: Option<FieldValue>,
    visible: bool,
    enabled: bool,
    read_only: bool,
    required: bool,
    constraints: FieldConstraints,
    messages: ConstraintMessages,
    errors: Vec<ValidationError>,
    validity: Validity,
    observers: Vec<ModelEventHandler>,
}

impl FieldModel {
    pub fn new(id: FieldId, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            name: name.into(),
            label: None,
            kind,
            value: None,
            visible: true,
            enabled: true,
            read_only: false,
            required: false,
            constraints: FieldConstraints::default(),
            messages: ConstraintMessages::default(),
            errors: Vec::new(),
            validity: Validity::Untouched,
            observers: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_messages(mut self, messages: ConstraintMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Set the initial value from the form definition
    pub fn with_default_value(mut self, value: Option<FieldValue>) -> Result<Self, StructuralError> {
        self.check_assignable(value.as_ref())?;
        self.value = value;
        Ok(self)
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn constraints(&self) -> &FieldConstraints {
        &self.constraints
    }

    pub fn messages(&self) -> &ConstraintMessages {
        &self.messages
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Captcha adapter, when this field fronts a challenge widget
    pub fn captcha(&self) -> Option<&CaptchaAdapter> {
        match &self.kind {
            FieldKind::Captcha(adapter) => Some(adapter),
            _ => None,
        }
    }

    pub fn capabilities(&self) -> FieldCapabilities {
        FieldCapabilities::from_flags(
            self.visible,
            self.enabled,
            self.read_only,
            self.component_type().carries_data(),
        )
    }

    /// Snapshot of the observable state
    pub fn state(&self) -> FieldState {
        FieldState {
            id: self.id.clone(),
            visible: self.visible,
            enabled: self.enabled,
            read_only: self.read_only,
            required: self.required,
            value: self.value.clone(),
            validity: self.validity,
            challenge: self.captcha().map(CaptchaAdapter::state),
        }
    }

    /// Register an observer; it runs synchronously on every mutation
    pub fn subscribe(&mut self, handler: ModelEventHandler) {
        self.observers.push(handler);
    }

    /// Show or suppress the field; returns whether anything changed
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        tracing::debug!("Field '{}' visible set to {}", self.id, visible);
        self.notify(ModelEvent::VisibilityChanged {
            id: self.id.clone(),
            visible,
        });
        true
    }

    /// Enable or disable the field; returns whether anything changed
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        tracing::debug!("Field '{}' enabled set to {}", self.id, enabled);
        self.notify(ModelEvent::EnablementChanged {
            id: self.id.clone(),
            enabled,
        });
        true
    }

    pub fn set_read_only(&mut self, read_only: bool) -> bool {
        if self.read_only == read_only {
            return false;
        }
        self.read_only = read_only;
        self.notify(ModelEvent::ReadOnlyChanged {
            id: self.id.clone(),
            read_only,
        });
        true
    }

    /// Replace the value; returns whether anything changed.
    ///
    /// Captcha fields refuse this: their token may only come from a
    /// completed challenge.
    pub fn set_value(&mut self, value: Option<FieldValue>) -> Result<bool, StructuralError> {
        self.check_assignable(value.as_ref())?;
        Ok(self.replace_value(value))
    }

    fn check_assignable(&self, value: Option<&FieldValue>) -> Result<(), StructuralError> {
        match &self.kind {
            FieldKind::Captcha(_) => Err(StructuralError::ChallengeValueLocked(self.id.clone())),
            FieldKind::Button(_) => Err(StructuralError::ValueNotAccepted(self.id.clone())),
            kind => match value {
                Some(value) if !kind.accepts(value) => Err(StructuralError::TypeMismatch {
                    id: self.id.clone(),
                    found: value.type_name(),
                }),
                _ => Ok(()),
            },
        }
    }

    fn replace_value(&mut self, value: Option<FieldValue>) -> bool {
        if self.value == value {
            return false;
        }
        let old_value = std::mem::replace(&mut self.value, value);
        self.notify(ModelEvent::ValueChanged {
            id: self.id.clone(),
            old_value,
            new_value: self.value.clone(),
        });
        true
    }

    /// Start a challenge. `Ok(None)` means one is already outstanding.
    pub(crate) fn begin_challenge(&mut self) -> Result<Option<ChallengeRequest>, StructuralError> {
        let (old_state, request) = match &mut self.kind {
            FieldKind::Captcha(adapter) => match adapter.begin() {
                Some(old_state) => (old_state, adapter.request(&self.id)),
                None => return Ok(None),
            },
            _ => return Err(StructuralError::NotACaptcha(self.id.clone())),
        };

        // a new challenge invalidates any earlier token
        self.replace_value(None);
        self.notify(ModelEvent::ChallengeStateChanged {
            id: self.id.clone(),
            old_state,
            new_state: ChallengeState::InProgress,
        });
        Ok(Some(request))
    }

    /// Apply the widget's outcome; the token becomes the value only on success
    pub(crate) fn finish_challenge(
        &mut self,
        outcome: Result<VerificationToken, ChallengeFailure>,
    ) -> Result<ChallengeState, StructuralError> {
        let (old_state, new_state) = match &mut self.kind {
            FieldKind::Captcha(adapter) => match adapter.finish(&outcome) {
                Some(old_state) => (old_state, adapter.state()),
                None => return Ok(adapter.state()),
            },
            _ => return Err(StructuralError::NotACaptcha(self.id.clone())),
        };

        match outcome {
            Ok(token) if new_state == ChallengeState::Verified => {
                self.replace_value(Some(FieldValue::Token(token)));
            }
            _ => {
                self.replace_value(None);
            }
        }
        tracing::debug!(
            "Captcha '{}' challenge finished: {}",
            self.id,
            new_state.as_str()
        );
        self.notify(ModelEvent::ChallengeStateChanged {
            id: self.id.clone(),
            old_state,
            new_state,
        });
        Ok(new_state)
    }

    /// Drop the token and return to `unchallenged`
    pub(crate) fn reset_challenge(&mut self) -> Result<(), StructuralError> {
        let old_state = match &mut self.kind {
            FieldKind::Captcha(adapter) => adapter.reset(),
            _ => return Err(StructuralError::NotACaptcha(self.id.clone())),
        };
        self.replace_value(None);
        if let Some(old_state) = old_state {
            self.notify(ModelEvent::ChallengeStateChanged {
                id: self.id.clone(),
                old_state,
                new_state: ChallengeState::Unchallenged,
            });
        }
        Ok(())
    }

    /// Undo an outstanding challenge whose await was dropped
    pub(crate) fn abandon_challenge(&mut self) {
        let in_progress = self
            .captcha()
            .is_some_and(|adapter| adapter.state() == ChallengeState::InProgress);
        if in_progress {
            tracing::debug!("Captcha '{}' challenge abandoned", self.id);
            if let Err(err) = self.reset_challenge() {
                tracing::warn!("Failed to reset abandoned challenge: {}", err);
            }
        }
    }

    /// Replace validation results, notifying only when the errors changed
    pub(crate) fn set_errors(&mut self, errors: Vec<ValidationError>, validity: Validity) {
        self.validity = validity;
        if self.errors == errors {
            return;
        }
        self.errors = errors;
        self.notify(ModelEvent::ErrorsChanged {
            id: self.id.clone(),
            errors: self.errors.clone(),
        });
    }

    fn notify(&self, event: ModelEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }
}

impl fmt::Debug for FieldModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldModel")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("read_only", &self.read_only)
            .field("required", &self.required)
            .field("errors", &self.errors)
            .field("observers", &self.observers.len())
            .finish()
    }
}
