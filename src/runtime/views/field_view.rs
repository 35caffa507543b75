//! # Field View
//!
//! Markup of one field and the attribute updates that follow its model.
//!
//! ```text
//! div.{prefix}.base                       decoration, never the block class
//!   div#{id}.{block}[data-cmp-is][data-cmp-visible][data-cmp-enabled]
//!     label.{block}__label
//!     input|button|div #{id}-widget .{block}__widget
//!     textarea.{block}__response          captcha only
//!     div#{id}-errormessage.{block}__errormessage
//! ```

use crate::runtime::events::{ComponentType, FieldValue, ModelEvent, ViewEvent};
use crate::runtime::models::{ButtonAction, FieldKind, FieldModel};
use crate::runtime::validation::ValidationError;
use crate::runtime::views::{
    bool_attribute, Document, NodeId, ATTR_CHECKED, ATTR_DISABLED, ATTR_HIDDEN, ATTR_READONLY,
    ATTR_VALUE, DATA_CMP_CHALLENGE, DATA_CMP_ENABLED, DATA_CMP_IS, DATA_CMP_READONLY,
    DATA_CMP_REQUIRED, DATA_CMP_VALID, DATA_CMP_VISIBLE,
};

/// Class every decoration wrapper carries next to the component prefix
pub const DECORATION_CLASS: &str = "base";

/// Node handles of one rendered field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView {
    component: ComponentType,
    decoration: NodeId,
    root: NodeId,
    widget: NodeId,
    response: Option<NodeId>,
    error_region: NodeId,
}

impl FieldView {
    /// Render `field` as the last child of `parent`
    pub fn render(document: &mut Document, parent: NodeId, field: &FieldModel) -> Self {
        let component = field.component_type();
        let block = component.bem_block();
        let id = field.id().as_str();

        let decoration = document.create_element(parent, "div");
        for class in Self::decoration_classes(component) {
            document.add_class(decoration, class);
        }

        let root = document.create_element(decoration, "div");
        document.set_id(root, id);
        document.add_class(root, block);
        document.set_attribute(root, DATA_CMP_IS, component.data_cmp_is());
        document.set_attribute(root, DATA_CMP_VISIBLE, bool_attribute(field.is_visible()));
        document.set_attribute(root, DATA_CMP_ENABLED, bool_attribute(field.is_enabled()));
        if field.is_read_only() {
            document.set_attribute(root, DATA_CMP_READONLY, "true");
        }
        if field.is_required() {
            document.set_attribute(root, DATA_CMP_REQUIRED, "true");
        }

        let widget_id = field.id().widget_id();
        let is_button = matches!(field.kind(), FieldKind::Button(_));
        if let Some(label) = field.label().filter(|_| !is_button) {
            let label_node = document.create_element(root, "label");
            document.add_class(label_node, &format!("{block}__label"));
            document.set_attribute(label_node, "for", &widget_id);
            document.set_text(label_node, label);
        }

        let (widget, response) = Self::render_widget(document, root, field, &widget_id);

        let error_region = document.create_element(root, "div");
        document.set_id(error_region, &field.id().error_region_id());
        document.add_class(error_region, &format!("{block}__errormessage"));

        let view = Self {
            component,
            decoration,
            root,
            widget,
            response,
            error_region,
        };
        view.sync(document, field);
        view
    }

    fn render_widget(
        document: &mut Document,
        root: NodeId,
        field: &FieldModel,
        widget_id: &str,
    ) -> (NodeId, Option<NodeId>) {
        let block = field.component_type().bem_block();
        let widget_class = format!("{block}__widget");

        match field.kind() {
            FieldKind::Text | FieldKind::Number | FieldKind::Checkbox => {
                let input = document.create_element(root, "input");
                document.set_id(input, widget_id);
                document.add_class(input, &widget_class);
                let input_type = match field.kind() {
                    FieldKind::Number => "number",
                    FieldKind::Checkbox => "checkbox",
                    _ => "text",
                };
                document.set_attribute(input, "type", input_type);
                document.set_attribute(input, "name", field.name());
                (input, None)
            }
            FieldKind::Button(action) => {
                let button = document.create_element(root, "button");
                document.set_id(button, widget_id);
                document.add_class(button, &widget_class);
                let button_type = match action {
                    ButtonAction::Submit => "submit",
                    ButtonAction::Button => "button",
                };
                document.set_attribute(button, "type", button_type);
                document.set_text(button, field.label().unwrap_or_default());
                (button, None)
            }
            FieldKind::Captcha(adapter) => {
                let provider = adapter.provider();
                let container = document.create_element(root, "div");
                document.set_id(container, widget_id);
                document.add_class(container, &widget_class);
                document.add_class(container, provider.widget_class());

                let properties = adapter.properties();
                if let Some(site_key) = &properties.site_key {
                    document.set_attribute(container, "data-sitekey", site_key);
                }
                if let Some(size) = &properties.size {
                    document.set_attribute(container, "data-size", size);
                }
                document.set_attribute(container, "data-theme", &properties.theme);

                let response = document.create_element(root, "textarea");
                document.add_class(response, &format!("{block}__response"));
                document.set_attribute(response, "name", provider.response_field());
                document.toggle_attribute(response, ATTR_HIDDEN, true);
                (container, Some(response))
            }
        }
    }

    /// Classes of the decoration wrapper; the component block is left out so
    /// block-level style rules apply once
    pub fn decoration_classes(component: ComponentType) -> [&'static str; 2] {
        [component.id_prefix(), DECORATION_CLASS]
    }

    pub fn component(&self) -> ComponentType {
        self.component
    }

    pub fn decoration(&self) -> NodeId {
        self.decoration
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn widget(&self) -> NodeId {
        self.widget
    }

    /// Hidden element holding a captcha's verification token
    pub fn response(&self) -> Option<NodeId> {
        self.response
    }

    pub fn error_region(&self) -> NodeId {
        self.error_region
    }

    /// Write a model event into the DOM, returning what was updated
    pub fn apply(&self, document: &mut Document, event: &ModelEvent) -> Option<ViewEvent> {
        match event {
            ModelEvent::VisibilityChanged { id, visible } => {
                document.set_attribute(self.root, DATA_CMP_VISIBLE, bool_attribute(*visible));
                Some(ViewEvent::AttributesSynced {
                    id: id.clone(),
                    visible: *visible,
                    enabled: self.flag(document, DATA_CMP_ENABLED),
                })
            }
            ModelEvent::EnablementChanged { id, enabled } => {
                document.set_attribute(self.root, DATA_CMP_ENABLED, bool_attribute(*enabled));
                document.toggle_attribute(self.widget, ATTR_DISABLED, !*enabled);
                Some(ViewEvent::AttributesSynced {
                    id: id.clone(),
                    visible: self.flag(document, DATA_CMP_VISIBLE),
                    enabled: *enabled,
                })
            }
            ModelEvent::ReadOnlyChanged { id, read_only } => {
                self.render_read_only(document, *read_only);
                Some(ViewEvent::AttributesSynced {
                    id: id.clone(),
                    visible: self.flag(document, DATA_CMP_VISIBLE),
                    enabled: self.flag(document, DATA_CMP_ENABLED),
                })
            }
            ModelEvent::ValueChanged { id, new_value, .. } => {
                self.render_value(document, new_value.as_ref());
                Some(ViewEvent::ValueRendered { id: id.clone() })
            }
            ModelEvent::ErrorsChanged { id, errors } => Some(ViewEvent::ErrorRegionUpdated {
                id: id.clone(),
                message: self.render_errors(document, errors),
            }),
            ModelEvent::ChallengeStateChanged { new_state, .. } => {
                document.set_attribute(self.root, DATA_CMP_CHALLENGE, new_state.as_str());
                None
            }
        }
    }

    /// Rewrite every model-driven part of the subtree from `field`
    pub fn sync(&self, document: &mut Document, field: &FieldModel) {
        document.set_attribute(self.root, DATA_CMP_VISIBLE, bool_attribute(field.is_visible()));
        document.set_attribute(self.root, DATA_CMP_ENABLED, bool_attribute(field.is_enabled()));
        document.toggle_attribute(self.widget, ATTR_DISABLED, !field.is_enabled());
        self.render_read_only(document, field.is_read_only());
        self.render_value(document, field.value());
        self.render_errors(document, field.errors());
        if let Some(adapter) = field.captcha() {
            document.set_attribute(self.root, DATA_CMP_CHALLENGE, adapter.state().as_str());
        }
    }

    fn render_read_only(&self, document: &mut Document, read_only: bool) {
        if read_only {
            document.set_attribute(self.root, DATA_CMP_READONLY, "true");
        } else {
            document.remove_attribute(self.root, DATA_CMP_READONLY);
        }
        document.toggle_attribute(self.widget, ATTR_READONLY, read_only);
    }

    /// Show the first error, returning its message
    fn render_errors(&self, document: &mut Document, errors: &[ValidationError]) -> Option<String> {
        let message = errors.first().map(|error| error.message.clone());
        match &message {
            Some(text) => {
                document.set_text(self.error_region, text);
                document.set_attribute(self.root, DATA_CMP_VALID, "false");
            }
            None => {
                document.set_text(self.error_region, "");
                document.remove_attribute(self.root, DATA_CMP_VALID);
            }
        }
        message
    }

    fn render_value(&self, document: &mut Document, value: Option<&FieldValue>) {
        if let Some(response) = self.response {
            let token = value.map(FieldValue::to_attribute).unwrap_or_default();
            document.set_text(response, &token);
            return;
        }
        match self.component {
            ComponentType::Checkbox => {
                let checked = matches!(value, Some(FieldValue::Boolean(true)));
                document.toggle_attribute(self.widget, ATTR_CHECKED, checked);
            }
            ComponentType::TextInput | ComponentType::NumberInput => match value {
                Some(value) => document.set_attribute(self.widget, ATTR_VALUE, &value.to_attribute()),
                None => document.remove_attribute(self.widget, ATTR_VALUE),
            },
            ComponentType::Button | ComponentType::Captcha(_) => {}
        }
    }

    fn flag(&self, document: &Document, attribute: &str) -> bool {
        document.attribute(self.root, attribute) == Some("true")
    }
}
