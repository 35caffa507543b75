//! Step definitions for the model tree and its bound views
//!
//! - Form loading and feature toggles
//! - Field input and visibility/enablement changes
//! - DOM attribute, visibility and decoration checks

use crate::common::world::FormWorld;
use cucumber::{given, then, when};
use formline::runtime::views::FieldView;
use tracing::{debug, info};

// === SETUP ===

#[given("the captcha runtime toggle is on")]
async fn given_toggle_on(world: &mut FormWorld) {
    world.toggles.push("FT_FORMS-12407".to_string());
}

#[given("the captcha runtime toggle is off")]
async fn given_toggle_off(world: &mut FormWorld) {
    world.toggles.clear();
}

#[given(expr = "a form definition:")]
async fn given_definition(world: &mut FormWorld, step: &cucumber::gherkin::Step) {
    let text = step.docstring.clone().expect("Step needs a doc string");
    world.definition = text;
}

#[when("the form is loaded")]
async fn form_is_loaded(world: &mut FormWorld) {
    let count = world.form().model().field_count();
    info!("Form loaded with {} fields", count);
}

// === INTERACTION ===

#[when(expr = "I type {string} into {string}")]
async fn when_type(world: &mut FormWorld, text: String, id: String) {
    debug!("Typing '{}' into '{}'", text, id);
    world.form().input(&id, &text).await.expect("Input failed");
}

#[when(expr = "I hide the {string} field")]
async fn when_hide(world: &mut FormWorld, id: String) {
    world.form().set_visible(&id, false).expect("Unknown field");
}

#[when(expr = "I show the {string} field")]
async fn when_show(world: &mut FormWorld, id: String) {
    world.form().set_visible(&id, true).expect("Unknown field");
}

#[when(expr = "I disable the {string} field")]
async fn when_disable(world: &mut FormWorld, id: String) {
    world.form().set_enabled(&id, false).expect("Unknown field");
}

#[when(expr = "I enable the {string} field")]
async fn when_enable(world: &mut FormWorld, id: String) {
    world.form().set_enabled(&id, true).expect("Unknown field");
}

// === ASSERTIONS ===

#[then("every field model should have exactly one bound view")]
async fn then_counts_match(world: &mut FormWorld) {
    let form = world.form();
    let model = form.model();
    let view = form.view();
    assert_eq!(model.field_count(), view.fields().len());
    for binder in view.fields() {
        assert!(model.field(binder.get_id()).is_ok());
        assert!(form.element_by_id(binder.get_id()).is_some());
    }
}

#[then(expr = "the {string} element should have {string} set to {string}")]
async fn then_attribute(world: &mut FormWorld, id: String, name: String, value: String) {
    assert_eq!(world.attribute(&id, &name), Some(value));
}

#[then(expr = "every node inside {string} should be hidden")]
async fn then_all_hidden(world: &mut FormWorld, id: String) {
    let form = world.form();
    let root = form.element_by_id(&id).expect("No such element");
    let document = form.document().borrow();
    assert!(!document.is_visible(root));
    for node in document.descendants(root) {
        assert!(!document.is_visible(node), "{:?} is still visible", node);
    }
}

#[then(expr = "every node inside {string} should be visible")]
async fn then_all_visible(world: &mut FormWorld, id: String) {
    let form = world.form();
    let root = form.element_by_id(&id).expect("No such element");
    let document = form.document().borrow();
    assert!(document.is_visible(root));
    for node in document.descendants(root) {
        if document.has_attribute(node, "hidden") {
            continue;
        }
        assert!(document.is_visible(node), "{:?} is hidden", node);
    }
}

#[then(expr = "the decoration around {string} should not carry its block class")]
async fn then_decoration_isolated(world: &mut FormWorld, id: String) {
    let form = world.form();
    let view = form.view();
    let binder = view.field(&id).expect("No such field");
    let component = binder.view().component();
    let document = form.document().borrow();
    let decoration = binder.view().decoration();
    assert!(!document.has_class(decoration, component.bem_block()));
    for class in FieldView::decoration_classes(component) {
        assert!(document.has_class(decoration, class));
    }
}

#[then(expr = "the {string} error message should be {string}")]
async fn then_error_message(world: &mut FormWorld, id: String, message: String) {
    assert_eq!(world.error_text(&id), message);
}

#[then(expr = "the {string} error message should be empty")]
async fn then_error_empty(world: &mut FormWorld, id: String) {
    assert_eq!(world.error_text(&id), "");
}
