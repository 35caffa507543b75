//! # Core Form Types
//!
//! Identifiers, values, component kinds and capability flags shared by
//! models, views and controllers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a model node, unique within one form instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DOM id of the field's widget element
    pub fn widget_id(&self) -> String {
        format!("{}-widget", self.0)
    }

    /// DOM id of the field's error region
    pub fn error_region_id(&self) -> String {
        format!("{}-errormessage", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Proof of a completed challenge, issued by the challenge provider.
///
/// The runtime never mints these itself. Only a [`ChallengeWidget`] result can
/// place one into a captcha field.
///
/// [`ChallengeWidget`]: crate::runtime::services::ChallengeWidget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationToken(String);

impl VerificationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Typed payload of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    Token(VerificationToken),
}

impl FieldValue {
    /// Whether the value counts as "not filled in" for the required rule
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Boolean(checked) => !checked,
            FieldValue::Number(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Token(token) => token.as_str().is_empty(),
        }
    }

    /// Short type name used in error messages and logs
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Token(_) => "token",
        }
    }

    /// String form written into DOM `value` attributes
    pub fn to_attribute(&self) -> String {
        match self {
            FieldValue::Boolean(checked) => checked.to_string(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Token(token) => token.as_str().to_string(),
        }
    }
}

/// Third-party challenge engines the captcha adapter can front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    #[serde(alias = "h-captcha")]
    HCaptcha,
    #[serde(alias = "g-recaptcha")]
    ReCaptcha,
    Turnstile,
}

impl CaptchaProvider {
    /// Provider name as exported in component JSON
    pub fn name(self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "hcaptcha",
            CaptchaProvider::ReCaptcha => "recaptcha",
            CaptchaProvider::Turnstile => "turnstile",
        }
    }

    /// Class of the element the third-party script renders into
    pub fn widget_class(self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "h-captcha",
            CaptchaProvider::ReCaptcha => "g-recaptcha",
            CaptchaProvider::Turnstile => "cf-turnstile",
        }
    }

    /// Name of the hidden response element holding the token
    pub fn response_field(self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "h-captcha-response",
            CaptchaProvider::ReCaptcha => "g-recaptcha-response",
            CaptchaProvider::Turnstile => "cf-turnstile-response",
        }
    }
}

impl fmt::Display for CaptchaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Component type of a leaf field, as exposed through `data-cmp-is`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    TextInput,
    NumberInput,
    Checkbox,
    Button,
    Captcha(CaptchaProvider),
}

impl ComponentType {
    /// Value of the `data-cmp-is` attribute on the field root
    pub fn data_cmp_is(self) -> &'static str {
        match self {
            ComponentType::TextInput => "adaptiveFormTextInput",
            ComponentType::NumberInput => "adaptiveFormNumberInput",
            ComponentType::Checkbox => "adaptiveFormCheckBox",
            ComponentType::Button => "adaptiveFormButton",
            ComponentType::Captcha(CaptchaProvider::HCaptcha) => "adaptiveFormHCaptcha",
            ComponentType::Captcha(CaptchaProvider::ReCaptcha) => "adaptiveFormRecaptcha",
            ComponentType::Captcha(CaptchaProvider::Turnstile) => "adaptiveFormTurnstile",
        }
    }

    /// BEM block class carried by the field root and used as element prefix
    pub fn bem_block(self) -> &'static str {
        match self {
            ComponentType::TextInput => "cmp-adaptiveform-textinput",
            ComponentType::NumberInput => "cmp-adaptiveform-numberinput",
            ComponentType::Checkbox => "cmp-adaptiveform-checkbox",
            ComponentType::Button => "cmp-adaptiveform-button",
            ComponentType::Captcha(CaptchaProvider::HCaptcha) => "cmp-adaptiveform-hcaptcha",
            ComponentType::Captcha(CaptchaProvider::ReCaptcha) => "cmp-adaptiveform-recaptcha",
            ComponentType::Captcha(CaptchaProvider::Turnstile) => "cmp-adaptiveform-turnstile",
        }
    }

    /// Field type as exported in component JSON
    pub fn field_type(self) -> &'static str {
        match self {
            ComponentType::TextInput => "text-input",
            ComponentType::NumberInput => "number-input",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Button => "button",
            ComponentType::Captcha(_) => "captcha",
        }
    }

    /// Prefix used when a definition omits the id
    pub fn id_prefix(self) -> &'static str {
        match self {
            ComponentType::TextInput => "textinput",
            ComponentType::NumberInput => "numberinput",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Button => "button",
            ComponentType::Captcha(provider) => provider.name(),
        }
    }

    pub fn is_captcha(self) -> bool {
        matches!(self, ComponentType::Captcha(_))
    }

    /// Whether values of this component are collected on submission
    pub fn carries_data(self) -> bool {
        !matches!(self, ComponentType::Button)
    }
}

/// Lifecycle of a captcha challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    Unchallenged,
    InProgress,
    Verified,
    Failed,
}

impl ChallengeState {
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeState::Unchallenged => "unchallenged",
            ChallengeState::InProgress => "in_progress",
            ChallengeState::Verified => "verified",
            ChallengeState::Failed => "failed",
        }
    }
}

/// Validation status of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Untouched,
    Valid,
    Invalid,
}

bitflags! {
    /// Capabilities a field has in its current state
    ///
    /// Derived from visibility, enablement and read-only flags so that the
    /// binder, the validation engine and the submission controller agree on
    /// which fields take part in each step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use formline::runtime::events::FieldCapabilities;
    ///
    /// let caps = FieldCapabilities::VALIDATES | FieldCapabilities::SUBMITS;
    /// assert!(caps.contains(FieldCapabilities::SUBMITS));
    /// assert!(!caps.contains(FieldCapabilities::ACCEPTS_INPUT));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldCapabilities: u8 {
        /// Field is suppressed or disabled
        const NONE          = 0b0000_0000;

        /// User input may mutate the value (visible, enabled, not read-only)
        const ACCEPTS_INPUT = 0b0000_0001;

        /// Field takes part in validation (visible and enabled)
        const VALIDATES     = 0b0000_0010;

        /// Field value is collected on submission
        const SUBMITS       = 0b0000_0100;
    }
}

impl FieldCapabilities {
    /// Compute capabilities from raw field flags
    pub fn from_flags(visible: bool, enabled: bool, read_only: bool, carries_data: bool) -> Self {
        let mut caps = FieldCapabilities::NONE;
        if visible && enabled {
            caps |= FieldCapabilities::VALIDATES;
            if !read_only {
                caps |= FieldCapabilities::ACCEPTS_INPUT;
            }
            if carries_data {
                caps |= FieldCapabilities::SUBMITS;
            }
        }
        caps
    }
}
