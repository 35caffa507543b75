//! # Models
//!
//! The form's data tree: fields, containers, the captcha capability adapter
//! and the definition builder.

pub mod captcha_model;
pub mod container_model;
pub mod definition;
pub mod field_model;

pub use captcha_model::{
    CaptchaAdapter, CaptchaConfig, CaptchaProperties, ChallengeRequest, DEFAULT_THEME,
};
pub use container_model::{ContainerModel, ModelNode};
pub use definition::{build, FormDefinition, ItemDefinition, DEFAULT_FORM_ID};
pub use field_model::{ButtonAction, FieldConstraints, FieldKind, FieldModel, FieldState};
