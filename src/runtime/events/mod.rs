//! # Events Module
//!
//! Shared form types, model and view events, and the observer bus that
//! connects field models to their bound views.

pub mod event_bus;
pub mod model_events;
pub mod types;
pub mod view_events;

// Re-export all types for easy access
pub use event_bus::{EventBus, ModelEventHandler, SharedEventBus, SimpleEventBus, ViewEventHandler};
pub use model_events::ModelEvent;
pub use types::{
    CaptchaProvider, ChallengeState, ComponentType, FieldCapabilities, FieldId, FieldValue,
    Validity, VerificationToken,
};
pub use view_events::{DomEvent, ViewEvent};
