//! # Event Bus
//!
//! Observer plumbing shared by field models and the form container.
//! Everything runs on one thread, so handlers are plain boxed closures
//! invoked synchronously in subscription order.

use super::model_events::ModelEvent;
use super::view_events::ViewEvent;
use std::cell::RefCell;
use std::rc::Rc;

/// Type alias for model event handlers to reduce complexity
pub type ModelEventHandler = Box<dyn Fn(&ModelEvent)>;

/// Type alias for view event handlers to reduce complexity
pub type ViewEventHandler = Box<dyn Fn(&ViewEvent)>;

/// Event bus shared between the binders and the form container
pub type SharedEventBus = Rc<RefCell<SimpleEventBus>>;

/// Event bus for decoupled communication between components
pub trait EventBus {
    /// Publish a model event
    fn publish_model_event(&mut self, event: ModelEvent);

    /// Publish a view event
    fn publish_view_event(&mut self, event: ViewEvent);

    /// Subscribe to model events
    fn subscribe_to_model_events(&mut self, handler: ModelEventHandler);

    /// Subscribe to view events
    fn subscribe_to_view_events(&mut self, handler: ViewEventHandler);
}

/// Simple in-memory event bus implementation
pub struct SimpleEventBus {
    model_handlers: Vec<ModelEventHandler>,
    view_handlers: Vec<ViewEventHandler>,
}

impl SimpleEventBus {
    pub fn new() -> Self {
        Self {
            model_handlers: Vec::new(),
            view_handlers: Vec::new(),
        }
    }

    /// Create a bus wrapped for sharing between binders
    pub fn shared() -> SharedEventBus {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl Default for SimpleEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for SimpleEventBus {
    fn publish_model_event(&mut self, event: ModelEvent) {
        for handler in &self.model_handlers {
            handler(&event);
        }
    }

    fn publish_view_event(&mut self, event: ViewEvent) {
        for handler in &self.view_handlers {
            handler(&event);
        }
    }

    fn subscribe_to_model_events(&mut self, handler: ModelEventHandler) {
        self.model_handlers.push(handler);
    }

    fn subscribe_to_view_events(&mut self, handler: ViewEventHandler) {
        self.view_handlers.push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::events::FieldId;

    #[test]
    fn event_bus_should_deliver_model_events() {
        let mut bus = SimpleEventBus::new();
        let received_events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = received_events.clone();

        bus.subscribe_to_model_events(Box::new(move |event| {
            events_clone.borrow_mut().push(event.clone());
        }));

        let event = ModelEvent::VisibilityChanged {
            id: FieldId::new("a"),
            visible: false,
        };
        bus.publish_model_event(event.clone());

        let received = received_events.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], event);
    }

    #[test]
    fn event_bus_should_deliver_view_events() {
        let mut bus = SimpleEventBus::new();
        let received_events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = received_events.clone();

        bus.subscribe_to_view_events(Box::new(move |event| {
            events_clone.borrow_mut().push(event.clone());
        }));

        let event = ViewEvent::StatusShown {
            message: "offline".to_string(),
        };
        bus.publish_view_event(event.clone());

        let received = received_events.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], event);
    }

    #[test]
    fn event_bus_should_handle_multiple_subscribers() {
        let mut bus = SimpleEventBus::new();
        let received_1 = Rc::new(RefCell::new(0));
        let received_2 = Rc::new(RefCell::new(0));
        let clone_1 = received_1.clone();
        let clone_2 = received_2.clone();

        bus.subscribe_to_model_events(Box::new(move |_| *clone_1.borrow_mut() += 1));
        bus.subscribe_to_model_events(Box::new(move |_| *clone_2.borrow_mut() += 1));

        bus.publish_model_event(ModelEvent::EnablementChanged {
            id: FieldId::new("a"),
            enabled: false,
        });

        assert_eq!(*received_1.borrow(), 1);
        assert_eq!(*received_2.borrow(), 1);
    }
}
