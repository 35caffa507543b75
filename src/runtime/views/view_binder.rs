//! # View Binder
//!
//! Keeps one field's DOM subtree consistent with its model. Mounting renders
//! the field and registers an observer on the model; every model mutation is
//! written into the document before the mutating call returns, then
//! republished on the form's event bus. DOM events go the other way through
//! [`ViewBinder::interpret`].

use crate::runtime::events::{
    DomEvent, EventBus, FieldCapabilities, FieldId, FieldValue, SharedEventBus,
};
use crate::runtime::models::{ButtonAction, FieldKind, FieldModel};
use crate::runtime::views::{Document, FieldView, NodeId, SharedDocument};
use std::cell::Cell;
use std::rc::Rc;

/// What a DOM event on a bound field asks the runtime to do
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAction {
    /// Write a user-entered value into the model
    SetValue(Option<FieldValue>),

    /// Run the captcha challenge for this field
    RunChallenge,

    /// Start a form submission
    Submit,

    /// Event has no effect on this field in its current state
    Ignore,
}

#[derive(Debug, Clone)]
pub struct ViewBinder {
    id: FieldId,
    view: FieldView,
    /// Set when a model event could not be written because the document
    /// was borrowed elsewhere
    stale: Rc<Cell<bool>>,
}

impl ViewBinder {
    /// Render `field` under `parent` and bind it to the document
    pub fn mount(
        document: &SharedDocument,
        bus: &SharedEventBus,
        parent: NodeId,
        field: &mut FieldModel,
    ) -> Self {
        let view = FieldView::render(&mut document.borrow_mut(), parent, field);

        let stale = Rc::new(Cell::new(false));
        let document = document.clone();
        let bus = bus.clone();
        let observer_stale = stale.clone();
        field.subscribe(Box::new(move |event| {
            let view_event = match document.try_borrow_mut() {
                Ok(mut document) => view.apply(&mut document, event),
                Err(_) => {
                    tracing::warn!(
                        "Document is borrowed; view of '{}' marked stale",
                        event.field_id()
                    );
                    observer_stale.set(true);
                    None
                }
            };

            match bus.try_borrow_mut() {
                Ok(mut bus) => {
                    bus.publish_model_event(event.clone());
                    if let Some(view_event) = view_event {
                        bus.publish_view_event(view_event);
                    }
                }
                Err(_) => tracing::warn!(
                    "Event bus is busy; event for '{}' not republished",
                    event.field_id()
                ),
            }
        }));

        tracing::debug!(
            "Mounted binder for '{}' ({})",
            field.id(),
            field.component_type().data_cmp_is()
        );

        Self {
            id: field.id().clone(),
            view,
            stale,
        }
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    /// Id attribute of the bound root element
    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn view(&self) -> &FieldView {
        &self.view
    }

    pub fn root(&self) -> NodeId {
        self.view.root()
    }

    pub fn widget(&self) -> NodeId {
        self.view.widget()
    }

    pub fn error_region(&self) -> NodeId {
        self.view.error_region()
    }

    /// Whether a model event was missed and the view awaits [`resync`]
    ///
    /// [`resync`]: ViewBinder::resync
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Rewrite the whole subtree from the model and clear the stale mark
    pub fn resync(&self, document: &mut Document, field: &FieldModel) {
        self.view.sync(document, field);
        self.stale.set(false);
        tracing::debug!("Resynced view of '{}'", self.id);
    }

    /// Whether `node` belongs to this binder's subtree
    pub fn owns(&self, document: &Document, node: NodeId) -> bool {
        document.contains(self.view.root(), node)
    }

    /// Translate a DOM event on this field into a model action
    pub fn interpret(&self, document: &Document, field: &FieldModel, event: &DomEvent) -> FieldAction {
        if !self.owns(document, event.target()) {
            return FieldAction::Ignore;
        }
        if !field.capabilities().contains(FieldCapabilities::ACCEPTS_INPUT) {
            tracing::debug!("Ignoring {:?} on non-interactive field '{}'", event, self.id);
            return FieldAction::Ignore;
        }

        match (field.kind(), event) {
            (FieldKind::Captcha(_), DomEvent::Click { .. }) => FieldAction::RunChallenge,
            (FieldKind::Button(ButtonAction::Submit), DomEvent::Click { .. }) => FieldAction::Submit,
            (FieldKind::Checkbox, DomEvent::Click { .. }) => {
                let checked = matches!(field.value(), Some(FieldValue::Boolean(true)));
                FieldAction::SetValue(Some(FieldValue::Boolean(!checked)))
            }
            (FieldKind::Checkbox, DomEvent::Change { checked, .. }) => {
                FieldAction::SetValue(Some(FieldValue::Boolean(*checked)))
            }
            (kind @ (FieldKind::Text | FieldKind::Number), DomEvent::Input { text, .. }) => {
                FieldAction::SetValue(kind.coerce_input(text))
            }
            _ => FieldAction::Ignore,
        }
    }
}
