//! # Captcha Adapter
//!
//! Fronts a third-party challenge engine (hCaptcha, reCAPTCHA, Turnstile) so
//! that it behaves like any other field. The adapter tracks the challenge
//! lifecycle; the token itself lives in the owning field's value and only a
//! successful challenge outcome can put it there.

use crate::runtime::errors::ChallengeFailure;
use crate::runtime::events::{CaptchaProvider, ChallengeState, FieldId, VerificationToken};
use serde::{Deserialize, Serialize};

/// Theme reported for every provider
pub const DEFAULT_THEME: &str = "light";

/// Provider settings taken from the form definition (cloud configuration)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptchaConfig {
    pub site_key: Option<String>,
    pub uri: Option<String>,
    pub size: Option<String>,
    pub widget_type: Option<String>,
}

/// Exported captcha properties, in the order clients expect them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaProperties {
    pub site_key: Option<String>,
    pub uri: Option<String>,
    pub size: Option<String>,
    pub theme: String,
    pub widget_type: Option<String>,
}

/// Everything a challenge widget needs to run one challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub field_id: FieldId,
    pub provider: CaptchaProvider,
    pub site_key: Option<String>,
    pub size: Option<String>,
    pub theme: String,
    pub widget_type: Option<String>,
}

/// Challenge state machine for one captcha field.
///
/// `unchallenged -> in_progress -> verified | failed`, with `failed` and
/// `verified` allowed to start a new challenge, and `reset` returning to
/// `unchallenged` when the backend reports an expired token.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptchaAdapter {
    provider: CaptchaProvider,
    config: CaptchaConfig,
    state: ChallengeState,
    attempts: u32,
    last_failure: Option<ChallengeFailure>,
}

impl CaptchaAdapter {
    pub fn new(provider: CaptchaProvider, config: CaptchaConfig) -> Self {
        if config.site_key.is_none() {
            tracing::info!(
                "[Captcha] [{}] no site key configured; challenges will fail until cloud configuration is provided",
                provider
            );
        }

        Self {
            provider,
            config,
            state: ChallengeState::Unchallenged,
            attempts: 0,
            last_failure: None,
        }
    }

    pub fn provider(&self) -> CaptchaProvider {
        self.provider
    }

    pub fn config(&self) -> &CaptchaConfig {
        &self.config
    }

    pub fn state(&self) -> ChallengeState {
        self.state
    }

    pub fn is_verified(&self) -> bool {
        self.state == ChallengeState::Verified
    }

    /// Number of challenges started so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reason the most recent challenge failed, if it did
    pub fn last_failure(&self) -> Option<&ChallengeFailure> {
        self.last_failure.as_ref()
    }

    /// Properties exported to the client-side widget loader
    pub fn properties(&self) -> CaptchaProperties {
        CaptchaProperties {
            site_key: self.config.site_key.clone(),
            uri: self.config.uri.clone(),
            size: self.config.size.clone(),
            theme: DEFAULT_THEME.to_string(),
            widget_type: self.config.widget_type.clone(),
        }
    }

    /// Build the request handed to the challenge widget
    pub fn request(&self, field_id: &FieldId) -> ChallengeRequest {
        ChallengeRequest {
            field_id: field_id.clone(),
            provider: self.provider,
            site_key: self.config.site_key.clone(),
            size: self.config.size.clone(),
            theme: DEFAULT_THEME.to_string(),
            widget_type: self.config.widget_type.clone(),
        }
    }

    /// Enter `in_progress`. Returns the previous state, or `None` when a
    /// challenge is already outstanding.
    pub(crate) fn begin(&mut self) -> Option<ChallengeState> {
        if self.state == ChallengeState::InProgress {
            return None;
        }
        let old_state = self.state;
        self.state = ChallengeState::InProgress;
        self.attempts += 1;
        self.last_failure = None;
        Some(old_state)
    }

    /// Record the widget's outcome. Only valid while `in_progress`; returns
    /// the previous state when a transition happened.
    pub(crate) fn finish(
        &mut self,
        outcome: &Result<VerificationToken, ChallengeFailure>,
    ) -> Option<ChallengeState> {
        if self.state != ChallengeState::InProgress {
            return None;
        }
        let old_state = self.state;
        match outcome {
            Ok(token) if !token.as_str().is_empty() => {
                self.state = ChallengeState::Verified;
            }
            Ok(_) => {
                self.state = ChallengeState::Failed;
                self.last_failure = Some(ChallengeFailure::Rejected(
                    "provider returned an empty token".to_string(),
                ));
            }
            Err(failure) => {
                self.state = ChallengeState::Failed;
                self.last_failure = Some(failure.clone());
            }
        }
        Some(old_state)
    }

    /// Return to `unchallenged`; returns the previous state if it changed
    pub(crate) fn reset(&mut self) -> Option<ChallengeState> {
        if self.state == ChallengeState::Unchallenged {
            return None;
        }
        let old_state = self.state;
        self.state = ChallengeState::Unchallenged;
        Some(old_state)
    }
}
