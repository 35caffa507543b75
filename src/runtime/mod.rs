//! # Form Runtime
//!
//! Model tree, model/view binding, captcha capability adapter, validation
//! engine and submission controller of an adaptive form, laid out as
//! events, models, views, validation, controllers and services.

pub mod controllers;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod settings;
pub mod validation;
pub mod views;

pub use controllers::{DispatchOutcome, FormContainer, SubmissionState, SubmitOutcome};
pub use errors::{ChallengeFailure, FormError, StructuralError, TransportFailure};
pub use settings::{RuntimeSettings, ToggleSource, CAPTCHA_RUNTIME_TOGGLE};
