//! # Transport
//!
//! Hands collected field values to the submission backend.

use crate::runtime::errors::TransportFailure;
use crate::runtime::events::{FieldId, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error code a backend returns when a captcha token is no longer accepted
pub const TOKEN_EXPIRED_CODE: &str = "captcha-token-expired";

/// Field id to value map handed to the transport
pub type SubmissionValues = BTreeMap<FieldId, FieldValue>;

/// What the backend sent back for an accepted submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitReceipt {
    pub thank_you_message: Option<String>,
    pub redirect_url: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn submit(&self, values: &SubmissionValues) -> Result<SubmitReceipt, TransportFailure>;
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    data: &'a SubmissionValues,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorReply {
    code: Option<String>,
    message: Option<String>,
}

/// Posts `{"data": {...}}` as JSON to the form's action URL
pub struct HttpTransport {
    client: reqwest::Client,
    action: String,
}

impl HttpTransport {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            action: action.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

impl Transport for HttpTransport {
    async fn submit(&self, values: &SubmissionValues) -> Result<SubmitReceipt, TransportFailure> {
        tracing::debug!("Submitting {} values to {}", values.len(), self.action);

        let response = self
            .client
            .post(&self.action)
            .json(&SubmitBody { data: values })
            .send()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(SubmitReceipt::default());
            }
            return serde_json::from_str(&body).or_else(|e| {
                tracing::warn!("Ignoring unparsable submit receipt: {}", e);
                Ok(SubmitReceipt::default())
            });
        }

        let reply: ErrorReply = serde_json::from_str(&body).unwrap_or_default();
        tracing::info!(
            "Submission rejected with {} (code: {:?})",
            status,
            reply.code
        );
        if reply.code.as_deref() == Some(TOKEN_EXPIRED_CODE) {
            return Err(TransportFailure::TokenExpired);
        }
        Err(TransportFailure::Rejected(
            reply
                .message
                .unwrap_or_else(|| format!("server returned {status}")),
        ))
    }
}
