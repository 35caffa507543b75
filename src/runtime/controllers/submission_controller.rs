//! # Submission Controller
//!
//! Validate-then-submit state machine:
//!
//! ```text
//! idle -> validating -> rejected  -> idle
//!                    -> submitting -> succeeded
//!                                  -> failed -> idle
//! ```
//!
//! A trigger while `validating` or `submitting` is a no-op. The model is
//! borrowed only between suspension points, never across the transport
//! await.

use crate::runtime::controllers::lifecycle::Lifecycle;
use crate::runtime::errors::TransportFailure;
use crate::runtime::events::FieldCapabilities;
use crate::runtime::models::{ContainerModel, FieldModel};
use crate::runtime::services::{SubmissionValues, SubmitReceipt, Transport};
use crate::runtime::validation::{ValidationEngine, ValidationReport};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
}

impl SubmissionState {
    pub fn is_busy(self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A submission was already running or has already succeeded
    Ignored,

    /// At least one field is invalid; no transport call was made
    Rejected(ValidationReport),

    Succeeded(SubmitReceipt),

    /// Transport reported an error; field values are kept
    Failed(TransportFailure),

    /// The form was torn down while the transport call was pending
    Discarded,
}

/// Returns the controller to `idle` if a submission future is dropped
/// mid-flight
struct InFlight<'a> {
    state: &'a Cell<SubmissionState>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Cell<SubmissionState>) -> Self {
        Self { state, armed: true }
    }

    fn finish(mut self, state: SubmissionState) {
        self.armed = false;
        self.state.set(state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Submission abandoned; returning to idle");
            self.state.set(SubmissionState::Idle);
        }
    }
}

#[derive(Debug)]
pub struct SubmissionController {
    state: Cell<SubmissionState>,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self {
            state: Cell::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    /// Values of every field that submits in its current state, keyed by id
    pub fn collect_values(model: &ContainerModel) -> SubmissionValues {
        model
            .fields()
            .into_iter()
            .filter(|field| field.capabilities().contains(FieldCapabilities::SUBMITS))
            .filter_map(|field| Some((field.id().clone(), field.value()?.clone())))
            .collect()
    }

    pub async fn submit<T: Transport>(
        &self,
        model: &RefCell<ContainerModel>,
        engine: &RefCell<ValidationEngine>,
        transport: &T,
        lifecycle: &Lifecycle,
    ) -> SubmitOutcome {
        let current = self.state.get();
        if current.is_busy() || current == SubmissionState::Succeeded {
            tracing::debug!("Submit ignored while {:?}", current);
            return SubmitOutcome::Ignored;
        }
        let Ok(ticket) = lifecycle.ticket() else {
            return SubmitOutcome::Discarded;
        };

        self.state.set(SubmissionState::Validating);
        let in_flight = InFlight::new(&self.state);

        let report = engine.borrow().validate_tree(&mut model.borrow_mut());
        if !report.is_valid() {
            tracing::info!(
                "Submission rejected: {} invalid field(s)",
                report.invalid.len()
            );
            in_flight.finish(SubmissionState::Idle);
            return SubmitOutcome::Rejected(report);
        }

        let values = Self::collect_values(&model.borrow());
        self.state.set(SubmissionState::Submitting);
        tracing::debug!("Submitting {} field values", values.len());

        let result = transport.submit(&values).await;

        if !lifecycle.is_current(ticket) {
            tracing::debug!("Discarding transport result for a torn-down form");
            in_flight.finish(SubmissionState::Idle);
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(receipt) => {
                tracing::info!("Submission succeeded");
                in_flight.finish(SubmissionState::Succeeded);
                SubmitOutcome::Succeeded(receipt)
            }
            Err(failure) => {
                tracing::warn!("Submission failed: {}", failure);
                if failure.is_token_expired() {
                    Self::reset_challenges(&mut model.borrow_mut());
                }
                in_flight.finish(SubmissionState::Idle);
                SubmitOutcome::Failed(failure)
            }
        }
    }

    fn reset_challenges(model: &mut ContainerModel) {
        model.for_each_field_mut(&mut |field: &mut FieldModel| {
            if field.captcha().is_some() {
                if let Err(err) = field.reset_challenge() {
                    tracing::warn!("Failed to reset challenge on '{}': {}", field.id(), err);
                }
            }
        });
    }
}
