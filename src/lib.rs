//! # Formline - Adaptive Form Runtime
//!
//! Headless runtime for adaptive forms: a tree of field and container
//! models, views bound to them through `data-cmp-*` attributes, a captcha
//! capability adapter, a validation engine and a submission controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  ModelEvent  ┌──────────────┐   DomEvent   ┌──────────────┐
//! │   Models    │─────────────►│ View Binders │◄─────────────│  Container   │
//! │             │              │              │              │              │
//! │ - Fields    │              │ - DOM attrs  │              │ - Dispatch   │
//! │ - Captcha   │              │ - Error text │              │ - Challenge  │
//! └─────────────┘              └──────────────┘              │ - Submit     │
//!        ▲                                                   └──────────────┘
//!        │ validate / reset                                          │
//!        └──────────────── Validation Engine, Submission ◄───────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod runtime;

pub use runtime::*;
