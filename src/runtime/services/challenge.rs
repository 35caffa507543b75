//! # Challenge Widget
//!
//! The third-party challenge engine behind a captcha field. The runtime only
//! ever receives tokens from an implementation of [`ChallengeWidget`].

use crate::runtime::errors::ChallengeFailure;
use crate::runtime::events::VerificationToken;
use crate::runtime::models::ChallengeRequest;
use serde::Deserialize;

/// Runs one challenge and resolves to the provider's token or a failure
#[allow(async_fn_in_trait)]
pub trait ChallengeWidget {
    async fn execute(&self, request: &ChallengeRequest) -> Result<VerificationToken, ChallengeFailure>;
}

/// Verification endpoint reply
#[derive(Debug, Deserialize)]
struct ChallengeReply {
    success: bool,
    token: Option<String>,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Challenge widget that asks a headless verification endpoint to run the
/// challenge, as automated environments do
pub struct HttpChallengeWidget {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChallengeWidget {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChallengeWidget for HttpChallengeWidget {
    async fn execute(&self, request: &ChallengeRequest) -> Result<VerificationToken, ChallengeFailure> {
        tracing::debug!(
            "Executing {} challenge for '{}' via {}",
            request.provider,
            request.field_id,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChallengeFailure::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChallengeFailure::Unavailable(format!(
                "verification endpoint returned {status}"
            )));
        }

        let reply: ChallengeReply = response
            .json()
            .await
            .map_err(|e| ChallengeFailure::Unavailable(format!("malformed reply: {e}")))?;

        match (reply.success, reply.token) {
            (true, Some(token)) if !token.is_empty() => Ok(VerificationToken::new(token)),
            (true, _) => Err(ChallengeFailure::Rejected(
                "provider reported success without a token".to_string(),
            )),
            (false, _) => {
                let reason = if reply.error_codes.is_empty() {
                    "challenge failed".to_string()
                } else {
                    reply.error_codes.join(", ")
                };
                Err(ChallengeFailure::Rejected(reason))
            }
        }
    }
}
