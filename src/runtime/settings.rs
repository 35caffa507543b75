//! # Runtime Settings
//!
//! Feature toggles and tunables resolved once when a form loads and passed
//! explicitly to the components that need them.

use crate::runtime::validation::ValidationPolicy;
use std::time::Duration;

/// Toggle that activates captcha gating and challenges
pub const CAPTCHA_RUNTIME_TOGGLE: &str = "FT_FORMS-12407";

/// Confirmation text used when neither the backend nor the definition names one
pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Thank you for submitting the form.";

pub const DEFAULT_CHALLENGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of named boolean feature toggles
pub trait ToggleSource {
    fn is_enabled(&self, toggle: &str) -> bool;
}

/// A fixed list of enabled toggle names
impl ToggleSource for [&str] {
    fn is_enabled(&self, toggle: &str) -> bool {
        self.iter().any(|name| *name == toggle)
    }
}

impl<const N: usize> ToggleSource for [&str; N] {
    fn is_enabled(&self, toggle: &str) -> bool {
        self.as_slice().is_enabled(toggle)
    }
}

impl ToggleSource for Vec<String> {
    fn is_enabled(&self, toggle: &str) -> bool {
        self.iter().any(|name| name == toggle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    captcha_enabled: bool,
    challenge_timeout: Duration,
    thank_you_message: Option<String>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            captcha_enabled: false,
            challenge_timeout: DEFAULT_CHALLENGE_TIMEOUT,
            thank_you_message: None,
        }
    }
}

impl RuntimeSettings {
    /// Query the toggle source once; later toggle changes are not observed
    pub fn resolve(toggles: &(impl ToggleSource + ?Sized)) -> Self {
        let captcha_enabled = toggles.is_enabled(CAPTCHA_RUNTIME_TOGGLE);
        tracing::debug!(
            "Resolved runtime settings: {} = {}",
            CAPTCHA_RUNTIME_TOGGLE,
            captcha_enabled
        );
        Self {
            captcha_enabled,
            ..Self::default()
        }
    }

    pub fn with_captcha_enabled(mut self, enabled: bool) -> Self {
        self.captcha_enabled = enabled;
        self
    }

    pub fn with_challenge_timeout(mut self, timeout: Duration) -> Self {
        self.challenge_timeout = timeout;
        self
    }

    pub fn with_thank_you_message(mut self, message: Option<String>) -> Self {
        self.thank_you_message = message;
        self
    }

    pub fn captcha_enabled(&self) -> bool {
        self.captcha_enabled
    }

    pub fn challenge_timeout(&self) -> Duration {
        self.challenge_timeout
    }

    pub fn thank_you_message(&self) -> Option<&str> {
        self.thank_you_message.as_deref()
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            captcha_gate: self.captcha_enabled,
        }
    }
}
