//! Step definitions for Cucumber tests
//!
//! Steps are organized by feature domain:
//! - `form` - Form loading, model/view binding and DOM checks
//! - `submission` - Captcha challenges, validation gate and transport

pub mod form;
pub mod submission;
