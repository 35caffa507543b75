//! # Views
//!
//! DOM rendering of the model tree and the binders that keep each field's
//! subtree in step with its model.

pub mod dom;
pub mod field_view;
pub mod form_view;
pub mod view_binder;

pub use dom::{Document, Element, NodeId, SharedDocument};
pub use field_view::FieldView;
pub use form_view::FormView;
pub use view_binder::{FieldAction, ViewBinder};

/// Stringified model `visible` flag on every field root
pub const DATA_CMP_VISIBLE: &str = "data-cmp-visible";

/// Stringified model `enabled` flag on every field root
pub const DATA_CMP_ENABLED: &str = "data-cmp-enabled";

/// Component type name on every field root
pub const DATA_CMP_IS: &str = "data-cmp-is";

pub const DATA_CMP_READONLY: &str = "data-cmp-readonly";
pub const DATA_CMP_REQUIRED: &str = "data-cmp-required";
pub const DATA_CMP_VALID: &str = "data-cmp-valid";

/// Challenge state of captcha field roots
pub const DATA_CMP_CHALLENGE: &str = "data-cmp-challenge";

pub const ATTR_HIDDEN: &str = "hidden";
pub const ATTR_DISABLED: &str = "disabled";
pub const ATTR_READONLY: &str = "readonly";
pub const ATTR_CHECKED: &str = "checked";
pub const ATTR_VALUE: &str = "value";

/// Class of the form root element
pub const FORM_BLOCK: &str = "cmp-adaptiveform-container";

/// Class of the confirmation element rendered after a successful submission
pub const THANK_YOU_CLASS: &str = "cmp-adaptiveform-container__thankyou";

/// Stringify a flag the way `data-cmp-*` attributes expect
pub fn bool_attribute(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}
