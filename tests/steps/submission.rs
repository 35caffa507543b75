//! Step definitions for captcha challenges and submission
//!
//! - Scripting the challenge widget and the transport
//! - Clicking captcha fields and submitting
//! - Transport call and confirmation checks

use crate::common::world::FormWorld;
use cucumber::{given, then, when};
use formline::runtime::errors::{ChallengeFailure, StructuralError, TransportFailure};
use formline::runtime::events::{ChallengeState, FieldId, FieldValue, VerificationToken};
use formline::runtime::SubmitOutcome;
use tracing::info;

// === COLLABORATOR SCRIPTS ===

#[given(expr = "the challenge widget answers with token {string}")]
async fn given_widget_token(world: &mut FormWorld, token: String) {
    world.widget.push_outcome(Ok(VerificationToken::new(token)));
}

#[given("the challenge widget rejects the next challenge")]
async fn given_widget_rejects(world: &mut FormWorld) {
    world
        .widget
        .push_outcome(Err(ChallengeFailure::Rejected("bot-suspected".to_string())));
}

#[given("the backend reports an expired token once")]
async fn given_token_expired(world: &mut FormWorld) {
    world.transport.push_outcome(Err(TransportFailure::TokenExpired));
}

#[given(expr = "the backend fails with {string} once")]
async fn given_backend_fails(world: &mut FormWorld, message: String) {
    world
        .transport
        .push_outcome(Err(TransportFailure::Rejected(message)));
}

// === INTERACTION ===

#[when(expr = "I click the {string} field")]
async fn when_click(world: &mut FormWorld, id: String) {
    info!("Clicking '{}'", id);
    let result = world.form().click_id(&id).await;
    if let Err(err) = result {
        world.last_error = Some(err);
    }
}

#[when("I submit the form")]
async fn when_submit(world: &mut FormWorld) {
    let outcome = world.form().submit().await.expect("Form torn down");
    info!("Submit outcome: {:?}", outcome);
    world.last_outcome = Some(outcome);
}

#[when(expr = "I try to set the {string} value to {string}")]
async fn when_forge_value(world: &mut FormWorld, id: String, value: String) {
    let result = world.form().set_value(&id, Some(FieldValue::Text(value)));
    world.last_error = result.err();
}

// === ASSERTIONS ===

#[then("the submission should be rejected")]
async fn then_rejected(world: &mut FormWorld) {
    assert!(
        matches!(world.last_outcome, Some(SubmitOutcome::Rejected(_))),
        "Got {:?}",
        world.last_outcome
    );
}

#[then(expr = "only {string} should be reported invalid")]
async fn then_only_invalid(world: &mut FormWorld, id: String) {
    let Some(SubmitOutcome::Rejected(report)) = &world.last_outcome else {
        panic!("Expected a rejection, got {:?}", world.last_outcome);
    };
    let ids: Vec<&str> = report.invalid.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec![id.as_str()]);
}

#[then("the submission should succeed")]
async fn then_succeeded(world: &mut FormWorld) {
    assert!(
        matches!(world.last_outcome, Some(SubmitOutcome::Succeeded(_))),
        "Got {:?}",
        world.last_outcome
    );
}

#[then("the submission should fail")]
async fn then_failed(world: &mut FormWorld) {
    assert!(
        matches!(world.last_outcome, Some(SubmitOutcome::Failed(_))),
        "Got {:?}",
        world.last_outcome
    );
}

#[then(expr = "the transport should have been called {int} time(s)")]
async fn then_transport_calls(world: &mut FormWorld, count: usize) {
    assert_eq!(world.transport.call_count(), count);
}

#[then(expr = "the challenge widget should have been called {int} time(s)")]
async fn then_widget_calls(world: &mut FormWorld, count: usize) {
    assert_eq!(world.widget.call_count(), count);
}

#[then(expr = "the submitted {string} value should be the token {string}")]
async fn then_submitted_token(world: &mut FormWorld, id: String, token: String) {
    let calls = world.transport.calls();
    let last = calls.last().expect("No submission reached the transport");
    assert_eq!(
        last.get(&FieldId::new(id)),
        Some(&FieldValue::Token(VerificationToken::new(token)))
    );
}

#[then(expr = "the submitted values should not include {string}")]
async fn then_not_submitted(world: &mut FormWorld, id: String) {
    let calls = world.transport.calls();
    let last = calls.last().expect("No submission reached the transport");
    assert!(last.get(&FieldId::new(id)).is_none());
}

#[then(expr = "the confirmation should read {string} followed by a line break")]
async fn then_confirmation(world: &mut FormWorld, message: String) {
    let text = world.form().confirmation_text();
    assert_eq!(text, Some(format!("{message}\n")));
}

#[then(expr = "the {string} value should be set")]
async fn then_value_set(world: &mut FormWorld, id: String) {
    let state = world.form().state_of(&id).expect("Unknown field");
    assert!(state.value.is_some());
}

#[then(expr = "the {string} value should be empty")]
async fn then_value_empty(world: &mut FormWorld, id: String) {
    let state = world.form().state_of(&id).expect("Unknown field");
    assert!(state.value.is_none());
}

#[then(expr = "the {string} challenge should be {string}")]
async fn then_challenge_state(world: &mut FormWorld, id: String, expected: String) {
    let state = world.form().state_of(&id).expect("Unknown field");
    let actual = state.challenge.map(ChallengeState::as_str);
    assert_eq!(actual, Some(expected.as_str()));
}

#[then("the value should have been refused as challenge-owned")]
async fn then_value_locked(world: &mut FormWorld) {
    assert!(matches!(
        world.last_error,
        Some(StructuralError::ChallengeValueLocked(_))
    ));
}

#[then(expr = "the form status should mention {string}")]
async fn then_status(world: &mut FormWorld, text: String) {
    let form = world.form();
    let status = form.view().status_region();
    let shown = form.document().borrow().text_content(status);
    assert!(shown.contains(&text), "Status was '{}'", shown);
}
