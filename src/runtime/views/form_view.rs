//! # Form View
//!
//! Renders the whole model tree: a form root, one element per container and
//! one bound field subtree per leaf, plus a status region for submission
//! errors. Also owns the confirmation rendering after a successful submit.

use crate::runtime::events::{EventBus, FieldId, SharedEventBus, ViewEvent};
use crate::runtime::models::{ContainerModel, ModelNode};
use crate::runtime::views::{
    Document, NodeId, SharedDocument, ViewBinder, ATTR_HIDDEN, DATA_CMP_IS, FORM_BLOCK,
    THANK_YOU_CLASS,
};
use std::collections::HashMap;

const FORM_DATA_CMP_IS: &str = "adaptiveFormContainer";
const PANEL_BLOCK: &str = "cmp-adaptiveform-panel";
const PANEL_DATA_CMP_IS: &str = "adaptiveFormPanel";

pub struct FormView {
    document: SharedDocument,
    bus: SharedEventBus,
    form: NodeId,
    status: NodeId,
    confirmation: Option<NodeId>,
    binders: Vec<ViewBinder>,
    by_id: HashMap<FieldId, usize>,
    by_root: HashMap<NodeId, usize>,
}

impl FormView {
    /// Render `root` into the document body and bind every field
    pub fn render(document: &SharedDocument, bus: &SharedEventBus, root: &mut ContainerModel) -> Self {
        let form = {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            let form = doc.create_element(body, "form");
            doc.set_id(form, root.id().as_str());
            doc.add_class(form, FORM_BLOCK);
            doc.set_attribute(form, DATA_CMP_IS, FORM_DATA_CMP_IS);
            if let Some(title) = root.title() {
                doc.set_attribute(form, "aria-label", title);
            }
            form
        };

        let mut binders = Vec::new();
        Self::render_items(document, bus, form, root, &mut binders);

        let status = {
            let mut doc = document.borrow_mut();
            let status = doc.create_element(form, "div");
            doc.add_class(status, &format!("{FORM_BLOCK}__status"));
            doc.set_attribute(status, "role", "alert");
            doc.toggle_attribute(status, ATTR_HIDDEN, true);
            status
        };

        let by_id = binders
            .iter()
            .enumerate()
            .map(|(index, binder)| (binder.id().clone(), index))
            .collect();
        let by_root = binders
            .iter()
            .enumerate()
            .map(|(index, binder)| (binder.root(), index))
            .collect();

        tracing::debug!("Rendered form '{}' with {} bound fields", root.id(), binders.len());

        Self {
            document: document.clone(),
            bus: bus.clone(),
            form,
            status,
            confirmation: None,
            binders,
            by_id,
            by_root,
        }
    }

    fn render_items(
        document: &SharedDocument,
        bus: &SharedEventBus,
        parent: NodeId,
        container: &mut ContainerModel,
        binders: &mut Vec<ViewBinder>,
    ) {
        for child in container.children_mut() {
            match child {
                ModelNode::Field(field) => {
                    binders.push(ViewBinder::mount(document, bus, parent, field));
                }
                ModelNode::Container(panel) => {
                    let node = {
                        let mut doc = document.borrow_mut();
                        let node = doc.create_element(parent, "div");
                        doc.set_id(node, panel.id().as_str());
                        doc.add_class(node, PANEL_BLOCK);
                        doc.set_attribute(node, DATA_CMP_IS, PANEL_DATA_CMP_IS);
                        if let Some(title) = panel.title() {
                            let label = doc.create_element(node, "div");
                            doc.add_class(label, &format!("{PANEL_BLOCK}__label"));
                            doc.set_text(label, title);
                        }
                        node
                    };
                    Self::render_items(document, bus, node, panel, binders);
                }
            }
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn form_root(&self) -> NodeId {
        self.form
    }

    pub fn status_region(&self) -> NodeId {
        self.status
    }

    /// Confirmation element, once a submission has succeeded
    pub fn confirmation(&self) -> Option<NodeId> {
        self.confirmation
    }

    /// Bound field views, in document order
    pub fn fields(&self) -> &[ViewBinder] {
        &self.binders
    }

    pub fn field(&self, id: &str) -> Option<&ViewBinder> {
        self.by_id.get(id).and_then(|index| self.binders.get(*index))
    }

    /// Binder whose subtree contains `node`
    pub fn binder_for_node(&self, document: &Document, node: NodeId) -> Option<&ViewBinder> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if let Some(index) = self.by_root.get(&candidate) {
                return self.binders.get(*index);
            }
            current = document.parent(candidate);
        }
        None
    }

    /// Bring views that missed a model event back in line with `model`.
    /// Returns how many were rewritten; a view stays stale while the
    /// document is still borrowed.
    pub fn resync_stale(&self, model: &ContainerModel) -> usize {
        let stale: Vec<&ViewBinder> = self.binders.iter().filter(|b| b.is_stale()).collect();
        if stale.is_empty() {
            return 0;
        }
        let Ok(mut document) = self.document.try_borrow_mut() else {
            return 0;
        };
        let mut synced = 0;
        for binder in stale {
            match model.field(binder.get_id()) {
                Ok(field) => {
                    binder.resync(&mut document, field);
                    synced += 1;
                }
                Err(err) => tracing::warn!("Cannot resync view: {}", err),
            }
        }
        synced
    }

    /// Show a form-level status message
    pub fn show_status(&self, message: &str) {
        {
            let mut document = self.document.borrow_mut();
            document.set_text(self.status, message);
            document.toggle_attribute(self.status, ATTR_HIDDEN, false);
        }
        self.publish(ViewEvent::StatusShown {
            message: message.to_string(),
        });
    }

    pub fn clear_status(&self) {
        let mut document = self.document.borrow_mut();
        document.set_text(self.status, "");
        document.toggle_attribute(self.status, ATTR_HIDDEN, true);
    }

    /// Replace the form with its confirmation content. The text always ends
    /// with exactly one line break.
    pub fn render_confirmation(&mut self, message: &str) -> NodeId {
        let text = format!("{}\n", message.trim_end());
        let node = {
            let mut document = self.document.borrow_mut();
            let node = match self.confirmation {
                Some(node) => node,
                None => {
                    let body = document.body();
                    let node = document.create_element(body, "div");
                    document.add_class(node, THANK_YOU_CLASS);
                    node
                }
            };
            document.set_text(node, &text);
            document.toggle_attribute(self.form, ATTR_HIDDEN, true);
            node
        };
        self.confirmation = Some(node);
        tracing::info!("Form '{}' submitted; confirmation rendered", self.form_id());
        self.publish(ViewEvent::ConfirmationRendered { message: text });
        node
    }

    fn form_id(&self) -> String {
        self.document
            .borrow()
            .element(self.form)
            .and_then(|element| element.id().map(str::to_string))
            .unwrap_or_default()
    }

    fn publish(&self, event: ViewEvent) {
        match self.bus.try_borrow_mut() {
            Ok(mut bus) => bus.publish_view_event(event),
            Err(_) => tracing::warn!("Event bus is busy; {:?} not published", event),
        }
    }
}
