//! # Mock Collaborators for Testing
//!
//! Scripted [`ChallengeWidget`] and [`Transport`] implementations that
//! record every call. Clones share the same script and call log, so a test
//! can keep a handle after moving one into a form container.

use crate::runtime::errors::{ChallengeFailure, TransportFailure};
use crate::runtime::events::VerificationToken;
use crate::runtime::models::ChallengeRequest;
use crate::runtime::services::{ChallengeWidget, SubmissionValues, SubmitReceipt, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

type ChallengeOutcome = Result<VerificationToken, ChallengeFailure>;
type SubmitOutcome = Result<SubmitReceipt, TransportFailure>;

struct Script<Request, Outcome> {
    queued: VecDeque<Outcome>,
    fallback: Option<Outcome>,
    calls: Vec<Request>,
    delay: Option<Duration>,
}

impl<Request, Outcome: Clone> Script<Request, Outcome> {
    fn record(&mut self, request: Request) -> (Option<Outcome>, Option<Duration>) {
        self.calls.push(request);
        let outcome = self.queued.pop_front().or_else(|| self.fallback.clone());
        (outcome, self.delay)
    }
}

/// Challenge widget answering from a script
#[derive(Clone)]
pub struct MockChallengeWidget {
    script: Rc<RefCell<Script<ChallengeRequest, ChallengeOutcome>>>,
}

impl MockChallengeWidget {
    /// Widget with nothing scripted; every challenge reports the provider
    /// as unavailable
    pub fn new() -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                queued: VecDeque::new(),
                fallback: None,
                calls: Vec::new(),
                delay: None,
            })),
        }
    }

    /// Widget whose every challenge succeeds with `token`
    pub fn succeeding(token: &str) -> Self {
        let widget = Self::new();
        widget.script.borrow_mut().fallback = Some(Ok(VerificationToken::new(token)));
        widget
    }

    /// Widget whose every challenge fails with `failure`
    pub fn failing(failure: ChallengeFailure) -> Self {
        let widget = Self::new();
        widget.script.borrow_mut().fallback = Some(Err(failure));
        widget
    }

    /// Queue a one-off outcome, used before the fallback
    pub fn push_outcome(&self, outcome: ChallengeOutcome) {
        self.script.borrow_mut().queued.push_back(outcome);
    }

    /// Delay every answer, to exercise timeouts and teardown
    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.borrow_mut().delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChallengeRequest> {
        self.script.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().calls.len()
    }
}

impl Default for MockChallengeWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeWidget for MockChallengeWidget {
    async fn execute(&self, request: &ChallengeRequest) -> ChallengeOutcome {
        let (outcome, delay) = self.script.borrow_mut().record(request.clone());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome.unwrap_or_else(|| {
            Err(ChallengeFailure::Unavailable(
                "no scripted challenge outcome".to_string(),
            ))
        })
    }
}

/// Transport answering from a script
#[derive(Clone)]
pub struct MockTransport {
    script: Rc<RefCell<Script<SubmissionValues, SubmitOutcome>>>,
}

impl MockTransport {
    /// Transport accepting every submission with an empty receipt
    pub fn new() -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                queued: VecDeque::new(),
                fallback: Some(Ok(SubmitReceipt::default())),
                calls: Vec::new(),
                delay: None,
            })),
        }
    }

    pub fn failing(failure: TransportFailure) -> Self {
        let transport = Self::new();
        transport.script.borrow_mut().fallback = Some(Err(failure));
        transport
    }

    pub fn push_outcome(&self, outcome: SubmitOutcome) {
        self.script.borrow_mut().queued.push_back(outcome);
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.borrow_mut().delay = Some(delay);
        self
    }

    /// Values of every submission received so far
    pub fn calls(&self) -> Vec<SubmissionValues> {
        self.script.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().calls.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn submit(&self, values: &SubmissionValues) -> SubmitOutcome {
        let (outcome, delay) = self.script.borrow_mut().record(values.clone());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome.unwrap_or_else(|| Ok(SubmitReceipt::default()))
    }
}
