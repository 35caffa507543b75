//! # Controllers
//!
//! Orchestration of a live form: lifecycle, submission, and the container
//! that routes DOM events to models and collaborators.

pub mod form_container;
pub mod lifecycle;
pub mod submission_controller;

pub use form_container::{DispatchOutcome, FormContainer};
pub use lifecycle::{Lifecycle, Ticket};
pub use submission_controller::{SubmissionController, SubmissionState, SubmitOutcome};
