//! # Form Container
//!
//! One live form: the model tree, its rendered document, the validation
//! engine, the submission controller and the two external collaborators.
//! DOM events enter through [`FormContainer::dispatch`]; every call is
//! synchronous up to its single await (a challenge or a transport call), and
//! no `RefCell` borrow is held across that await.
//!
//! Event bus subscribers run inside model mutations and must not call back
//! into the container.

use crate::runtime::controllers::lifecycle::Lifecycle;
use crate::runtime::controllers::submission_controller::{
    SubmissionController, SubmissionState, SubmitOutcome,
};
use crate::runtime::errors::{ChallengeFailure, FormError, StructuralError};
use crate::runtime::events::{
    ChallengeState, DomEvent, EventBus, FieldId, FieldValue, ModelEventHandler, SharedEventBus,
    SimpleEventBus, ViewEventHandler,
};
use crate::runtime::models::{build, ContainerModel, FieldModel, FieldState, FormDefinition};
use crate::runtime::services::{ChallengeWidget, Transport};
use crate::runtime::settings::{RuntimeSettings, DEFAULT_THANK_YOU_MESSAGE};
use crate::runtime::validation::{ValidationEngine, Validator};
use crate::runtime::views::{Document, FieldAction, FormView, NodeId, SharedDocument, ViewBinder};
use std::cell::{Ref, RefCell, RefMut};

/// What a dispatched DOM event ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Ignored,
    ValueSet { id: FieldId, changed: bool },
    Challenge { id: FieldId, state: ChallengeState },
    Submitted(SubmitOutcome),
}

/// Puts an abandoned challenge back to `unchallenged` when the future
/// awaiting it is dropped
struct PendingChallenge<'a> {
    model: &'a RefCell<ContainerModel>,
    id: FieldId,
    armed: bool,
}

impl<'a> PendingChallenge<'a> {
    fn new(model: &'a RefCell<ContainerModel>, id: FieldId) -> Self {
        Self {
            model,
            id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingChallenge<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.model.try_borrow_mut() {
            Ok(mut model) => {
                if let Ok(field) = model.field_mut(self.id.as_str()) {
                    field.abandon_challenge();
                }
            }
            Err(_) => tracing::warn!("Model busy; challenge on '{}' left pending", self.id),
        }
    }
}

pub struct FormContainer<W: ChallengeWidget, T: Transport> {
    model: RefCell<ContainerModel>,
    view: RefCell<FormView>,
    document: SharedDocument,
    bus: SharedEventBus,
    engine: RefCell<ValidationEngine>,
    settings: RuntimeSettings,
    definition_message: Option<String>,
    submission: SubmissionController,
    lifecycle: Lifecycle,
    widget: W,
    transport: T,
}

impl<W: ChallengeWidget, T: Transport> FormContainer<W, T> {
    /// Build the model tree from `definition`, render it and bind it
    pub fn build(
        definition: &FormDefinition,
        settings: RuntimeSettings,
        widget: W,
        transport: T,
    ) -> Result<Self, FormError> {
        let root = build(definition)?;
        let mut form = Self::from_model(root, settings, widget, transport);
        form.definition_message = definition.thank_you_message.clone();
        Ok(form)
    }

    /// Render and bind an already built model tree
    pub fn from_model(
        mut root: ContainerModel,
        settings: RuntimeSettings,
        widget: W,
        transport: T,
    ) -> Self {
        let document = Document::shared();
        let bus = SimpleEventBus::shared();
        let view = FormView::render(&document, &bus, &mut root);
        let engine = ValidationEngine::new(settings.validation_policy());

        tracing::info!(
            "Form '{}' loaded with {} fields (captcha runtime {})",
            root.id(),
            root.field_count(),
            if settings.captcha_enabled() { "on" } else { "off" }
        );

        Self {
            model: RefCell::new(root),
            view: RefCell::new(view),
            document,
            bus,
            engine: RefCell::new(engine),
            settings,
            definition_message: None,
            submission: SubmissionController::new(),
            lifecycle: Lifecycle::new(),
            widget,
            transport,
        }
    }

    pub fn model(&self) -> Ref<'_, ContainerModel> {
        self.model.borrow()
    }

    /// Direct model access; release it before calling any other method
    pub fn model_mut(&self) -> RefMut<'_, ContainerModel> {
        self.model.borrow_mut()
    }

    /// The rendered document. Views that missed an update while it was
    /// borrowed are rewritten first.
    pub fn document(&self) -> &SharedDocument {
        self.resync_stale_views();
        &self.document
    }

    pub fn view(&self) -> Ref<'_, FormView> {
        self.view.borrow()
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn event_bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn subscribe_model_events(&self, handler: ModelEventHandler) {
        self.bus.borrow_mut().subscribe_to_model_events(handler);
    }

    pub fn subscribe_view_events(&self, handler: ViewEventHandler) {
        self.bus.borrow_mut().subscribe_to_view_events(handler);
    }

    pub fn register_validator(&self, id: FieldId, validator: Validator) {
        self.engine.borrow_mut().register_validator(id, validator);
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission.state()
    }

    /// Snapshot of one field (`getState`)
    pub fn state_of(&self, id: &str) -> Result<FieldState, StructuralError> {
        Ok(self.model.borrow().field(id)?.state())
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document().borrow().get_element_by_id(id)
    }

    /// Serialized document body
    pub fn html(&self) -> String {
        let document = self.document().borrow();
        document.outer_html(document.body())
    }

    /// Text of the confirmation element, once rendered
    pub fn confirmation_text(&self) -> Option<String> {
        let node = self.view.borrow().confirmation()?;
        Some(self.document().borrow().text_content(node))
    }

    pub fn set_visible(&self, id: &str, visible: bool) -> Result<bool, StructuralError> {
        self.mutate(id, |field| Ok(field.set_visible(visible)))
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool, StructuralError> {
        self.mutate(id, |field| Ok(field.set_enabled(enabled)))
    }

    pub fn set_read_only(&self, id: &str, read_only: bool) -> Result<bool, StructuralError> {
        self.mutate(id, |field| Ok(field.set_read_only(read_only)))
    }

    /// Programmatic value write; captcha fields refuse it
    pub fn set_value(&self, id: &str, value: Option<FieldValue>) -> Result<bool, StructuralError> {
        self.mutate(id, |field| field.set_value(value))
    }

    /// Apply a field mutation, then re-check the field if it was invalid so
    /// stale errors clear without revalidating the tree
    fn mutate<F>(&self, id: &str, change: F) -> Result<bool, StructuralError>
    where
        F: FnOnce(&mut FieldModel) -> Result<bool, StructuralError>,
    {
        self.lifecycle.ticket()?;
        self.resync_stale_views();
        let mut model = self.model.borrow_mut();
        let field = model.field_mut(id)?;
        let changed = change(field)?;
        if changed {
            self.engine.borrow().revalidate_if_invalid(field);
        }
        Ok(changed)
    }

    fn resync_stale_views(&self) {
        if let (Ok(view), Ok(model)) = (self.view.try_borrow(), self.model.try_borrow()) {
            view.resync_stale(&model);
        }
    }

    /// Route a DOM event to the binder owning its target
    pub async fn dispatch(&self, event: DomEvent) -> Result<DispatchOutcome, StructuralError> {
        self.lifecycle.ticket()?;
        self.resync_stale_views();
        let target = event.target();

        let resolved = {
            let document = self.document.borrow();
            if document.element(target).is_none() {
                return Err(StructuralError::UnknownElement(format!("{target:?}")));
            }
            let view = self.view.borrow();
            match view.binder_for_node(&document, target) {
                Some(binder) => {
                    let model = self.model.borrow();
                    let field = model.field(binder.get_id())?;
                    Some((binder.id().clone(), binder.interpret(&document, field, &event)))
                }
                None => None,
            }
        };

        let Some((id, action)) = resolved else {
            tracing::debug!("{:?} outside any bound field", event);
            return Ok(DispatchOutcome::Ignored);
        };

        match action {
            FieldAction::SetValue(value) => {
                let changed = self.set_value(id.as_str(), value)?;
                Ok(DispatchOutcome::ValueSet { id, changed })
            }
            FieldAction::RunChallenge if self.settings.captcha_enabled() => {
                let state = self.run_challenge(id.as_str()).await?;
                Ok(DispatchOutcome::Challenge { id, state })
            }
            FieldAction::RunChallenge => {
                tracing::debug!("Captcha runtime off; click on '{}' ignored", id);
                Ok(DispatchOutcome::Ignored)
            }
            FieldAction::Submit => Ok(DispatchOutcome::Submitted(self.submit().await?)),
            FieldAction::Ignore => Ok(DispatchOutcome::Ignored),
        }
    }

    pub async fn click(&self, target: NodeId) -> Result<DispatchOutcome, StructuralError> {
        self.dispatch(DomEvent::Click { target }).await
    }

    /// Click the element carrying DOM id `id`
    pub async fn click_id(&self, id: &str) -> Result<DispatchOutcome, StructuralError> {
        let target = self
            .element_by_id(id)
            .ok_or_else(|| StructuralError::UnknownElement(id.to_string()))?;
        self.click(target).await
    }

    /// Commit `text` into the widget of field `id`
    pub async fn input(&self, id: &str, text: &str) -> Result<DispatchOutcome, StructuralError> {
        let target = self.widget_of(id)?;
        self.dispatch(DomEvent::Input {
            target,
            text: text.to_string(),
        })
        .await
    }

    /// Toggle the checkbox widget of field `id`
    pub async fn check(&self, id: &str, checked: bool) -> Result<DispatchOutcome, StructuralError> {
        let target = self.widget_of(id)?;
        self.dispatch(DomEvent::Change { target, checked }).await
    }

    fn widget_of(&self, id: &str) -> Result<NodeId, StructuralError> {
        self.view
            .borrow()
            .field(id)
            .map(ViewBinder::widget)
            .ok_or_else(|| StructuralError::UnknownModel(FieldId::new(id)))
    }

    /// Run the captcha challenge of field `id` through the challenge widget.
    /// With the captcha runtime off this reports the current state and runs
    /// nothing.
    pub async fn run_challenge(&self, id: &str) -> Result<ChallengeState, StructuralError> {
        let ticket = self.lifecycle.ticket()?;

        if !self.settings.captcha_enabled() {
            let model = self.model.borrow();
            let field = model.field(id)?;
            let adapter = field
                .captcha()
                .ok_or_else(|| StructuralError::NotACaptcha(field.id().clone()))?;
            return Ok(adapter.state());
        }

        let request = self.model.borrow_mut().field_mut(id)?.begin_challenge()?;
        let Some(request) = request else {
            tracing::debug!("Challenge for '{}' already in progress", id);
            return Ok(ChallengeState::InProgress);
        };

        let mut pending = PendingChallenge::new(&self.model, request.field_id.clone());
        let timeout = self.settings.challenge_timeout();
        let outcome = match tokio::time::timeout(timeout, self.widget.execute(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ChallengeFailure::TimedOut(timeout)),
        };
        pending.disarm();

        if !self.lifecycle.is_current(ticket) {
            tracing::debug!("Discarding challenge result for '{}' after teardown", id);
            return Err(StructuralError::TornDown);
        }
        if let Err(failure) = &outcome {
            tracing::info!("Challenge for '{}' failed: {}", id, failure);
        }

        let mut model = self.model.borrow_mut();
        let field = model.field_mut(id)?;
        let state = field.finish_challenge(outcome)?;
        self.engine.borrow().revalidate_if_invalid(field);
        Ok(state)
    }

    /// Validate the tree and, if every participating field is valid, hand
    /// the values to the transport
    pub async fn submit(&self) -> Result<SubmitOutcome, StructuralError> {
        self.lifecycle.ticket()?;
        let outcome = self
            .submission
            .submit(&self.model, &self.engine, &self.transport, &self.lifecycle)
            .await;

        match &outcome {
            SubmitOutcome::Succeeded(receipt) => {
                let message = receipt
                    .thank_you_message
                    .as_deref()
                    .or(self.definition_message.as_deref())
                    .or(self.settings.thank_you_message())
                    .unwrap_or(DEFAULT_THANK_YOU_MESSAGE);
                let mut view = self.view.borrow_mut();
                view.clear_status();
                view.render_confirmation(message);
            }
            SubmitOutcome::Failed(failure) => {
                self.view.borrow().show_status(&failure.to_string());
            }
            SubmitOutcome::Rejected(report) => {
                self.view.borrow().clear_status();
                if let Some((id, error)) = report.first_error() {
                    tracing::debug!("First invalid field '{}': {}", id, error);
                }
            }
            SubmitOutcome::Ignored | SubmitOutcome::Discarded => {}
        }
        Ok(outcome)
    }

    /// Discard the form. Pending awaits resolve without touching the model
    /// and every later call fails with [`StructuralError::TornDown`].
    pub fn teardown(&self) {
        tracing::info!("Tearing down form '{}'", self.model.borrow().id());
        self.lifecycle.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifecycle.is_torn_down()
    }

    /// Handle for tearing the form down from outside a pending call
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::services::{MockChallengeWidget, MockTransport};
    use crate::runtime::views::DATA_CMP_VISIBLE;

    const FORM: &str = r#"{"items": [
        {"fieldType": "text-input", "id": "name", "required": true},
        {"fieldType": "captcha", "id": "captcha", "provider": "hcaptcha", "required": true},
        {"fieldType": "button", "id": "submit"}
    ]}"#;

    fn form(settings: RuntimeSettings) -> FormContainer<MockChallengeWidget, MockTransport> {
        FormContainer::build(
            &FormDefinition::from_json(FORM).unwrap(),
            settings,
            MockChallengeWidget::succeeding("token"),
            MockTransport::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn click_on_captcha_should_be_ignored_when_runtime_is_off() {
        let form = form(RuntimeSettings::default());

        let outcome = form.click_id("captcha").await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(form.widget().call_count(), 0);
    }

    #[tokio::test]
    async fn click_on_captcha_should_verify_when_runtime_is_on() {
        let form = form(RuntimeSettings::default().with_captcha_enabled(true));

        let outcome = form.click_id("captcha").await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Challenge {
                id: FieldId::new("captcha"),
                state: ChallengeState::Verified
            }
        );
        assert!(form.state_of("captcha").unwrap().value.is_some());
    }

    #[tokio::test]
    async fn input_should_write_into_the_model() {
        let form = form(RuntimeSettings::default());

        form.input("name", "Ada").await.unwrap();

        assert_eq!(
            form.state_of("name").unwrap().value,
            Some(FieldValue::Text("Ada".to_string()))
        );
    }

    #[test]
    fn set_visible_should_sync_the_root_attribute() {
        let form = form(RuntimeSettings::default());
        form.set_visible("name", false).unwrap();

        let root = form.element_by_id("name").unwrap();
        assert_eq!(
            form.document().borrow().attribute(root, DATA_CMP_VISIBLE),
            Some("false")
        );
    }

    #[tokio::test]
    async fn calls_after_teardown_should_fail() {
        let form = form(RuntimeSettings::default());
        form.teardown();

        assert_eq!(form.submit().await.unwrap_err(), StructuralError::TornDown);
        assert_eq!(
            form.set_value("name", None).unwrap_err(),
            StructuralError::TornDown
        );
    }
}
