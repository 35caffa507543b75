//! # View Events
//!
//! Events describing DOM updates made by view binders, and the DOM
//! interaction events that drive user input back into the model.

use super::types::FieldId;
use crate::runtime::views::NodeId;

/// Emitted after a binder has written model state into the DOM
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// `data-cmp-visible` / `data-cmp-enabled` rewritten on a field root
    AttributesSynced {
        id: FieldId,
        visible: bool,
        enabled: bool,
    },

    /// Widget value attribute or response element rewritten
    ValueRendered { id: FieldId },

    /// Error region text replaced; `None` means cleared
    ErrorRegionUpdated { id: FieldId, message: Option<String> },

    /// Form-level status message shown (transport failures)
    StatusShown { message: String },

    /// Confirmation content rendered after a successful submission
    ConfirmationRendered { message: String },
}

/// Interaction events raised against rendered DOM nodes
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    /// Element clicked
    Click { target: NodeId },

    /// Text committed into an input widget
    Input { target: NodeId, text: String },

    /// Checkbox toggled
    Change { target: NodeId, checked: bool },
}

impl DomEvent {
    /// Node the event was raised on
    pub fn target(&self) -> NodeId {
        match self {
            DomEvent::Click { target }
            | DomEvent::Input { target, .. }
            | DomEvent::Change { target, .. } => *target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::views::Document;

    #[test]
    fn dom_event_should_report_its_target() {
        let mut document = Document::new();
        let body = document.body();
        let node = document.create_element(body, "input");

        let event = DomEvent::Input {
            target: node,
            text: "hello".to_string(),
        };

        assert_eq!(event.target(), node);
    }
}
