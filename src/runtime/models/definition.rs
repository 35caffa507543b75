//! # Form Definition
//!
//! JSON form definition and the `build` entry point that turns it into a
//! model tree. Ids omitted by the author are generated as `{prefix}-{n}`.

use crate::runtime::errors::{FormError, StructuralError};
use crate::runtime::events::{CaptchaProvider, FieldId, FieldValue};
use crate::runtime::models::captcha_model::{CaptchaAdapter, CaptchaConfig};
use crate::runtime::models::container_model::{ContainerModel, ModelNode};
use crate::runtime::models::field_model::{ButtonAction, FieldConstraints, FieldKind, FieldModel};
use crate::runtime::validation::ConstraintMessages;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Id given to the form root when the definition does not name one
pub const DEFAULT_FORM_ID: &str = "form";

const PANEL_ID_PREFIX: &str = "panel";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Submission endpoint
    pub action: Option<String>,
    pub thank_you_message: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

impl FormDefinition {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "fieldType", rename_all = "kebab-case")]
pub enum ItemDefinition {
    Panel(PanelDefinition),
    TextInput(InputDefinition),
    NumberInput(InputDefinition),
    Checkbox(InputDefinition),
    Button(ButtonDefinition),
    Captcha(CaptchaDefinition),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(rename = "default")]
    pub default_value: Option<FieldValue>,
    pub pattern: Option<String>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(default)]
    pub constraint_messages: ConstraintMessages,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub button_type: ButtonAction,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub provider: CaptchaProvider,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub cloud_configuration: CaptchaConfig,
    #[serde(default)]
    pub constraint_messages: ConstraintMessages,
}

/// Hands out `{prefix}-{n}` ids that do not clash with authored ones
struct IdAllocator {
    taken: HashSet<String>,
    counters: HashMap<&'static str, usize>,
}

impl IdAllocator {
    fn new(definition: &FormDefinition) -> Self {
        let mut taken = HashSet::new();
        if let Some(id) = &definition.id {
            taken.insert(id.clone());
        }
        collect_authored_ids(&definition.items, &mut taken);
        Self {
            taken,
            counters: HashMap::new(),
        }
    }

    fn resolve(&mut self, authored: Option<&String>, prefix: &'static str) -> FieldId {
        if let Some(id) = authored {
            return FieldId::new(id.clone());
        }
        let counter = self.counters.entry(prefix).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{prefix}-{counter}");
            if self.taken.insert(candidate.clone()) {
                return FieldId::new(candidate);
            }
        }
    }
}

fn collect_authored_ids(items: &[ItemDefinition], taken: &mut HashSet<String>) {
    for item in items {
        let id = match item {
            ItemDefinition::Panel(panel) => {
                collect_authored_ids(&panel.items, taken);
                panel.id.as_ref()
            }
            ItemDefinition::TextInput(input)
            | ItemDefinition::NumberInput(input)
            | ItemDefinition::Checkbox(input) => input.id.as_ref(),
            ItemDefinition::Button(button) => button.id.as_ref(),
            ItemDefinition::Captcha(captcha) => captcha.id.as_ref(),
        };
        if let Some(id) = id {
            taken.insert(id.clone());
        }
    }
}

/// Turn a form definition into the root container of its model tree
pub fn build(definition: &FormDefinition) -> Result<ContainerModel, FormError> {
    let mut ids = IdAllocator::new(definition);
    let root_id = FieldId::new(
        definition
            .id
            .clone()
            .unwrap_or_else(|| DEFAULT_FORM_ID.to_string()),
    );
    let children = build_items(&definition.items, &mut ids)?;
    let root = ContainerModel::new(root_id.clone(), root_id.as_str(), children)?
        .with_title(definition.title.clone());
    check_reserved_ids(&root)?;

    tracing::debug!(
        "Built form '{}' with {} fields",
        root.id(),
        root.field_count()
    );
    Ok(root)
}

/// Every field also owns the DOM ids of its widget and error region; no
/// node of the tree may claim one of them
fn check_reserved_ids(root: &ContainerModel) -> Result<(), FormError> {
    for field in root.fields() {
        for derived in [field.id().widget_id(), field.id().error_region_id()] {
            if root.contains(&derived) || root.id().as_str() == derived {
                return Err(FormError::ReservedId {
                    id: FieldId::new(derived),
                    owner: field.id().clone(),
                });
            }
        }
    }
    Ok(())
}

fn build_items(
    items: &[ItemDefinition],
    ids: &mut IdAllocator,
) -> Result<Vec<ModelNode>, FormError> {
    items
        .iter()
        .map(|item| build_item(item, ids))
        .collect()
}

fn build_item(item: &ItemDefinition, ids: &mut IdAllocator) -> Result<ModelNode, FormError> {
    let node = match item {
        ItemDefinition::Panel(panel) => {
            let id = ids.resolve(panel.id.as_ref(), PANEL_ID_PREFIX);
            let children = build_items(&panel.items, ids)?;
            let name = panel.name.clone().unwrap_or_else(|| id.to_string());
            ContainerModel::new(id, name, children)?
                .with_title(panel.title.clone())
                .into()
        }
        ItemDefinition::TextInput(input) => build_input(input, FieldKind::Text, ids)?.into(),
        ItemDefinition::NumberInput(input) => build_input(input, FieldKind::Number, ids)?.into(),
        ItemDefinition::Checkbox(input) => build_input(input, FieldKind::Checkbox, ids)?.into(),
        ItemDefinition::Button(button) => {
            let kind = FieldKind::Button(button.button_type);
            let id = ids.resolve(button.id.as_ref(), kind.component_type().id_prefix());
            let name = button.name.clone().unwrap_or_else(|| id.to_string());
            FieldModel::new(id, name, kind)
                .with_label(button.label.clone())
                .with_visible(button.visible)
                .with_enabled(button.enabled)
                .into()
        }
        ItemDefinition::Captcha(captcha) => {
            let kind = FieldKind::Captcha(CaptchaAdapter::new(
                captcha.provider,
                captcha.cloud_configuration.clone(),
            ));
            let id = ids.resolve(captcha.id.as_ref(), kind.component_type().id_prefix());
            let name = captcha.name.clone().unwrap_or_else(|| id.to_string());
            FieldModel::new(id, name, kind)
                .with_label(captcha.label.clone())
                .with_required(captcha.required)
                .with_visible(captcha.visible)
                .with_enabled(captcha.enabled)
                .with_messages(captcha.constraint_messages.clone())
                .into()
        }
    };
    Ok(node)
}

fn build_input(
    input: &InputDefinition,
    kind: FieldKind,
    ids: &mut IdAllocator,
) -> Result<FieldModel, FormError> {
    let id = ids.resolve(input.id.as_ref(), kind.component_type().id_prefix());
    let name = input.name.clone().unwrap_or_else(|| id.to_string());

    let pattern = match &input.pattern {
        Some(pattern) => Some(compile_pattern(&id, pattern)?),
        None => None,
    };
    let constraints = FieldConstraints {
        pattern,
        max_length: input.max_length,
        minimum: input.minimum,
        maximum: input.maximum,
    };

    let field = FieldModel::new(id.clone(), name, kind)
        .with_label(input.label.clone())
        .with_required(input.required)
        .with_visible(input.visible)
        .with_enabled(input.enabled)
        .with_read_only(input.read_only)
        .with_constraints(constraints)
        .with_messages(input.constraint_messages.clone());

    field
        .with_default_value(input.default_value.clone())
        .map_err(|err| match err {
            StructuralError::TypeMismatch { found, .. } => FormError::InvalidDefault {
                id,
                reason: format!("{found} value does not fit this field"),
            },
            other => FormError::Structural(other),
        })
}

/// Patterns must match the whole value
fn compile_pattern(id: &FieldId, pattern: &str) -> Result<Regex, FormError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| FormError::InvalidPattern {
        id: id.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::events::{ChallengeState, ComponentType};

    const CONTACT_FORM: &str = r#"{
        "title": "Contact",
        "action": "https://example.test/submit",
        "items": [
            {
                "fieldType": "panel",
                "items": [
                    {"fieldType": "text-input", "name": "fullName", "required": true},
                    {"fieldType": "number-input", "id": "age", "minimum": 18, "default": 30}
                ]
            },
            {
                "fieldType": "captcha",
                "provider": "hcaptcha",
                "required": true,
                "cloudConfiguration": {"siteKey": "10000000-ffff-ffff-ffff-000000000001"}
            },
            {"fieldType": "button", "label": "Submit"}
        ]
    }"#;

    #[test]
    fn build_should_create_every_leaf_field() {
        let definition = FormDefinition::from_json(CONTACT_FORM).unwrap();
        let root = build(&definition).unwrap();

        assert_eq!(root.id().as_str(), "form");
        assert_eq!(root.title(), Some("Contact"));
        assert_eq!(root.field_count(), 4);
        assert!(root.get_element("panel-1").unwrap().as_container().is_some());
    }

    #[test]
    fn generated_ids_should_use_component_prefixes() {
        let root = build(&FormDefinition::from_json(CONTACT_FORM).unwrap()).unwrap();
        let ids: Vec<&str> = root.fields().iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, vec!["textinput-1", "age", "hcaptcha-1", "button-1"]);
        assert_eq!(root.field("textinput-1").unwrap().name(), "fullName");
    }

    #[test]
    fn captcha_fields_should_start_unchallenged() {
        let root = build(&FormDefinition::from_json(CONTACT_FORM).unwrap()).unwrap();
        let captcha = root.field("hcaptcha-1").unwrap();

        assert_eq!(
            captcha.component_type(),
            ComponentType::Captcha(CaptchaProvider::HCaptcha)
        );
        assert!(captcha.is_required());
        assert!(captcha.is_visible());
        assert_eq!(captcha.state().challenge, Some(ChallengeState::Unchallenged));
        assert_eq!(captcha.value(), None);
    }

    #[test]
    fn default_value_should_seed_the_field() {
        let root = build(&FormDefinition::from_json(CONTACT_FORM).unwrap()).unwrap();
        assert_eq!(
            root.field("age").unwrap().value(),
            Some(&FieldValue::Number(30.0))
        );
    }

    #[test]
    fn generated_ids_should_skip_authored_ones() {
        let json = r#"{"items": [
            {"fieldType": "text-input"},
            {"fieldType": "text-input", "id": "textinput-1"}
        ]}"#;
        let root = build(&FormDefinition::from_json(json).unwrap()).unwrap();
        let ids: Vec<&str> = root.fields().iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, vec!["textinput-2", "textinput-1"]);
    }

    #[test]
    fn duplicate_authored_ids_should_fail_the_build() {
        let json = r#"{"items": [
            {"fieldType": "text-input", "id": "a"},
            {"fieldType": "checkbox", "id": "a"}
        ]}"#;
        let err = build(&FormDefinition::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            FormError::Structural(StructuralError::DuplicateId(_))
        ));
    }

    #[test]
    fn ids_reserved_for_field_elements_should_fail_the_build() {
        for clash in ["name-widget", "name-errormessage"] {
            let json = format!(
                r#"{{"items": [
                    {{"fieldType": "text-input", "id": "name"}},
                    {{"fieldType": "text-input", "id": "{clash}"}}
                ]}}"#
            );
            let err = build(&FormDefinition::from_json(&json).unwrap()).unwrap_err();
            assert!(matches!(
                err,
                FormError::ReservedId { ref id, ref owner }
                    if id.as_str() == clash && owner.as_str() == "name"
            ));
        }
    }

    #[test]
    fn invalid_pattern_should_name_the_field() {
        let json = r#"{"items": [{"fieldType": "text-input", "id": "zip", "pattern": "[0-9"}]}"#;
        let err = build(&FormDefinition::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(err, FormError::InvalidPattern { ref id, .. } if id.as_str() == "zip"));
    }

    #[test]
    fn pattern_should_be_anchored() {
        let json = r#"{"items": [{"fieldType": "text-input", "id": "zip", "pattern": "[0-9]{5}"}]}"#;
        let root = build(&FormDefinition::from_json(json).unwrap()).unwrap();
        let pattern = root.field("zip").unwrap().constraints().pattern.clone().unwrap();
        assert!(pattern.is_match("12345"));
        assert!(!pattern.is_match("123456"));
    }

    #[test]
    fn mistyped_default_should_be_reported() {
        let json = r#"{"items": [{"fieldType": "checkbox", "id": "agree", "default": "yes"}]}"#;
        let err = build(&FormDefinition::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(err, FormError::InvalidDefault { ref id, .. } if id.as_str() == "agree"));
    }

    #[test]
    fn unknown_field_type_should_fail_to_parse() {
        let json = r#"{"items": [{"fieldType": "signature"}]}"#;
        assert!(matches!(
            FormDefinition::from_json(json),
            Err(FormError::Definition(_))
        ));
    }
}
