//! # Validation Engine
//!
//! Evaluates required, declarative and custom rules over fields. Runs on a
//! submission attempt over the whole tree, and afterwards re-checks single
//! fields that are already invalid so their errors clear as soon as the
//! condition is satisfied.

use crate::runtime::events::{FieldCapabilities, FieldId, FieldValue, Validity};
use crate::runtime::models::{ContainerModel, FieldKind, FieldModel, FieldState};
use crate::runtime::validation::{
    ValidationError, ValidationErrorKind, DEFAULT_PATTERN_MESSAGE, DEFAULT_TYPE_MESSAGE,
};
use std::collections::HashMap;

/// Custom rule; returns the error message when the field is invalid
pub type Validator = Box<dyn Fn(&FieldState) -> Option<String>>;

/// Settings resolved once at form load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Whether required captcha fields gate submission
    pub captcha_gate: bool,
}

/// Errors found on one field during a tree pass
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors {
    pub id: FieldId,
    pub errors: Vec<ValidationError>,
}

/// Outcome of validating a whole tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Fields whose rules were evaluated
    pub checked: usize,
    /// Fields left out (hidden, disabled, or gated off)
    pub skipped: usize,
    /// Every invalid field, in document order
    pub invalid: Vec<FieldErrors>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn first_error(&self) -> Option<(&FieldId, &ValidationError)> {
        self.invalid
            .iter()
            .find_map(|entry| entry.errors.first().map(|error| (&entry.id, error)))
    }

    pub fn errors_for(&self, id: &str) -> Option<&[ValidationError]> {
        self.invalid
            .iter()
            .find(|entry| entry.id.as_str() == id)
            .map(|entry| entry.errors.as_slice())
    }
}

#[derive(Default)]
pub struct ValidationEngine {
    policy: ValidationPolicy,
    validators: HashMap<FieldId, Vec<Validator>>,
}

impl ValidationEngine {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            validators: HashMap::new(),
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Attach a custom rule to a field id. Rules run after the built-in ones.
    pub fn register_validator(&mut self, id: FieldId, validator: Validator) {
        self.validators.entry(id).or_default().push(validator);
    }

    /// Whether the field takes part in validation at all
    pub fn participates(&self, field: &FieldModel) -> bool {
        if !field.capabilities().contains(FieldCapabilities::VALIDATES) {
            return false;
        }
        if field.captcha().is_some() && !self.policy.captcha_gate {
            return false;
        }
        !matches!(field.kind(), FieldKind::Button(_))
    }

    /// Evaluate every rule without touching the field
    pub fn check_field(&self, field: &FieldModel) -> Vec<ValidationError> {
        let messages = field.messages();
        let mut errors = Vec::new();

        if let Some(adapter) = field.captcha() {
            if field.is_required() && !adapter.is_verified() {
                errors.push(messages.required_error());
                return errors;
            }
        } else {
            let empty = field.value().map_or(true, FieldValue::is_empty);
            if field.is_required() && empty {
                errors.push(messages.required_error());
                return errors;
            }
            if let Some(value) = field.value() {
                self.check_constraints(field, value, &mut errors);
            }
        }

        if let Some(validators) = self.validators.get(field.id()) {
            let state = field.state();
            for validator in validators {
                if let Some(message) = validator(&state) {
                    errors.push(ValidationError::new(ValidationErrorKind::Custom, message));
                }
            }
        }
        errors
    }

    fn check_constraints(
        &self,
        field: &FieldModel,
        value: &FieldValue,
        errors: &mut Vec<ValidationError>,
    ) {
        let constraints = field.constraints();
        let messages = field.messages();

        match (field.kind(), value) {
            (FieldKind::Number, FieldValue::Text(_)) => {
                errors.push(messages.error(ValidationErrorKind::Type, DEFAULT_TYPE_MESSAGE));
            }
            (_, FieldValue::Number(number)) if !number.is_finite() => {
                errors.push(messages.error(ValidationErrorKind::Type, DEFAULT_TYPE_MESSAGE));
            }
            (_, FieldValue::Number(number)) => {
                if let Some(minimum) = constraints.minimum {
                    if *number < minimum {
                        errors.push(messages.error(
                            ValidationErrorKind::Minimum,
                            format!("Value must be greater than or equal to {minimum}."),
                        ));
                    }
                }
                if let Some(maximum) = constraints.maximum {
                    if *number > maximum {
                        errors.push(messages.error(
                            ValidationErrorKind::Maximum,
                            format!("Value must be less than or equal to {maximum}."),
                        ));
                    }
                }
            }
            (_, FieldValue::Text(text)) => {
                if let Some(pattern) = &constraints.pattern {
                    if !pattern.is_match(text) {
                        errors.push(
                            messages.error(ValidationErrorKind::Pattern, DEFAULT_PATTERN_MESSAGE),
                        );
                    }
                }
                if let Some(max_length) = constraints.max_length {
                    let length = text.chars().count();
                    if length > max_length {
                        errors.push(messages.error(
                            ValidationErrorKind::MaxLength,
                            format!(
                                "Please shorten this text to {max_length} characters or less (you are currently using {length} characters)."
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    /// Validate one field and store the result on it. Non-participating
    /// fields have their errors cleared and return to `untouched`.
    pub fn validate_field(&self, field: &mut FieldModel) -> Validity {
        if !self.participates(field) {
            field.set_errors(Vec::new(), Validity::Untouched);
            return Validity::Untouched;
        }

        let errors = self.check_field(field);
        let validity = if errors.is_empty() {
            Validity::Valid
        } else {
            Validity::Invalid
        };
        tracing::debug!(
            "Validated field '{}': {:?} ({} errors)",
            field.id(),
            validity,
            errors.len()
        );
        field.set_errors(errors, validity);
        validity
    }

    /// Re-check a field only if it is currently invalid
    pub fn revalidate_if_invalid(&self, field: &mut FieldModel) -> Option<Validity> {
        if field.validity() != Validity::Invalid {
            return None;
        }
        Some(self.validate_field(field))
    }

    /// Validate every field of the tree. Never stops at the first failure.
    pub fn validate_tree(&self, root: &mut ContainerModel) -> ValidationReport {
        let mut report = ValidationReport::default();
        root.for_each_field_mut(&mut |field: &mut FieldModel| {
            if !self.participates(field) {
                report.skipped += 1;
                self.validate_field(field);
                return;
            }
            report.checked += 1;
            if self.validate_field(field) == Validity::Invalid {
                report.invalid.push(FieldErrors {
                    id: field.id().clone(),
                    errors: field.errors().to_vec(),
                });
            }
        });

        tracing::debug!(
            "Validated tree '{}': {} checked, {} skipped, {} invalid",
            root.id(),
            report.checked,
            report.skipped,
            report.invalid.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::errors::ChallengeFailure;
    use crate::runtime::events::{CaptchaProvider, VerificationToken};
    use crate::runtime::models::{build, CaptchaAdapter, CaptchaConfig, FieldConstraints, FormDefinition};
    use regex::Regex;

    fn text(id: &str) -> FieldModel {
        FieldModel::new(FieldId::new(id), id, FieldKind::Text)
    }

    fn captcha() -> FieldModel {
        FieldModel::new(
            FieldId::new("hcaptcha-1"),
            "captcha",
            FieldKind::Captcha(CaptchaAdapter::new(
                CaptchaProvider::HCaptcha,
                CaptchaConfig::default(),
            )),
        )
        .with_required(true)
    }

    fn gated() -> ValidationEngine {
        ValidationEngine::new(ValidationPolicy { captcha_gate: true })
    }

    #[test]
    fn empty_required_field_should_be_invalid() {
        let mut field = text("name").with_required(true);
        let engine = gated();

        assert_eq!(engine.validate_field(&mut field), Validity::Invalid);
        assert_eq!(field.errors()[0].message, "Please fill in this field.");
    }

    #[test]
    fn whitespace_should_not_satisfy_required() {
        let mut field = text("name").with_required(true);
        field
            .set_value(Some(FieldValue::Text("   ".to_string())))
            .unwrap();
        assert_eq!(gated().validate_field(&mut field), Validity::Invalid);
    }

    #[test]
    fn hidden_field_should_be_skipped_and_cleared() {
        let engine = gated();
        let mut field = text("name").with_required(true);
        engine.validate_field(&mut field);
        assert_eq!(field.validity(), Validity::Invalid);

        field.set_visible(false);

        assert_eq!(engine.validate_field(&mut field), Validity::Untouched);
        assert!(field.errors().is_empty());
    }

    #[test]
    fn unverified_required_captcha_should_be_invalid() {
        let mut field = captcha();
        assert_eq!(gated().validate_field(&mut field), Validity::Invalid);
        assert_eq!(field.errors()[0].kind, ValidationErrorKind::Required);
    }

    #[test]
    fn failed_challenge_should_surface_as_required_failure() {
        let mut field = captcha();
        field.begin_challenge().unwrap();
        field
            .finish_challenge(Err(ChallengeFailure::Unavailable("offline".to_string())))
            .unwrap();

        assert_eq!(gated().validate_field(&mut field), Validity::Invalid);
        assert_eq!(field.errors()[0].message, "Please fill in this field.");
    }

    #[test]
    fn verified_captcha_should_be_valid() {
        let mut field = captcha();
        field.begin_challenge().unwrap();
        field
            .finish_challenge(Ok(VerificationToken::new("token")))
            .unwrap();
        assert_eq!(gated().validate_field(&mut field), Validity::Valid);
    }

    #[test]
    fn captcha_should_be_skipped_when_gate_is_off() {
        let mut field = captcha();
        let engine = ValidationEngine::new(ValidationPolicy::default());
        assert!(!engine.participates(&field));
        assert_eq!(engine.validate_field(&mut field), Validity::Untouched);
    }

    #[test]
    fn declarative_constraints_should_report_every_violation() {
        let mut field = text("code").with_constraints(FieldConstraints {
            pattern: Some(Regex::new("^(?:[A-Z]+)$").unwrap()),
            max_length: Some(3),
            ..FieldConstraints::default()
        });
        field
            .set_value(Some(FieldValue::Text("abcd".to_string())))
            .unwrap();

        let kinds: Vec<ValidationErrorKind> =
            gated().check_field(&field).iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ValidationErrorKind::Pattern, ValidationErrorKind::MaxLength]
        );
    }

    #[test]
    fn number_field_should_reject_text_and_range_violations() {
        let engine = gated();
        let mut field = FieldModel::new(FieldId::new("age"), "age", FieldKind::Number)
            .with_constraints(FieldConstraints {
                minimum: Some(18.0),
                ..FieldConstraints::default()
            });

        field
            .set_value(Some(FieldValue::Text("old".to_string())))
            .unwrap();
        assert_eq!(engine.check_field(&field)[0].kind, ValidationErrorKind::Type);

        field.set_value(Some(FieldValue::Number(12.0))).unwrap();
        assert_eq!(
            engine.check_field(&field)[0].kind,
            ValidationErrorKind::Minimum
        );
    }

    #[test]
    fn non_finite_number_should_be_a_type_error() {
        let engine = gated();
        let mut field = FieldModel::new(FieldId::new("age"), "age", FieldKind::Number)
            .with_required(true)
            .with_constraints(FieldConstraints {
                minimum: Some(18.0),
                maximum: Some(120.0),
                ..FieldConstraints::default()
            });

        for number in [f64::NAN, f64::INFINITY] {
            field.set_value(Some(FieldValue::Number(number))).unwrap();
            let kinds: Vec<ValidationErrorKind> =
                engine.check_field(&field).iter().map(|e| e.kind).collect();
            assert_eq!(kinds, vec![ValidationErrorKind::Type]);
        }
    }

    #[test]
    fn custom_validator_should_add_errors() {
        let mut engine = gated();
        engine.register_validator(
            FieldId::new("name"),
            Box::new(|state| match &state.value {
                Some(FieldValue::Text(text)) if text == "admin" => {
                    Some("Name is reserved.".to_string())
                }
                _ => None,
            }),
        );
        let mut field = text("name");
        field
            .set_value(Some(FieldValue::Text("admin".to_string())))
            .unwrap();

        assert_eq!(engine.validate_field(&mut field), Validity::Invalid);
        assert_eq!(field.errors()[0].kind, ValidationErrorKind::Custom);
    }

    #[test]
    fn revalidate_should_only_touch_invalid_fields() {
        let engine = gated();
        let mut field = text("name").with_required(true);
        assert_eq!(engine.revalidate_if_invalid(&mut field), None);

        engine.validate_field(&mut field);
        field
            .set_value(Some(FieldValue::Text("Ada".to_string())))
            .unwrap();

        assert_eq!(engine.revalidate_if_invalid(&mut field), Some(Validity::Valid));
        assert!(field.errors().is_empty());
    }

    #[test]
    fn validate_tree_should_report_every_invalid_field() {
        let json = r#"{"items": [
            {"fieldType": "text-input", "id": "first", "required": true},
            {"fieldType": "panel", "items": [
                {"fieldType": "text-input", "id": "second", "required": true},
                {"fieldType": "text-input", "id": "hidden", "required": true, "visible": false}
            ]},
            {"fieldType": "button", "id": "submit"}
        ]}"#;
        let mut root = build(&FormDefinition::from_json(json).unwrap()).unwrap();

        let report = gated().validate_tree(&mut root);

        assert_eq!(report.checked, 2);
        assert_eq!(report.skipped, 2);
        let ids: Vec<&str> = report.invalid.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(report.first_error().unwrap().0.as_str(), "first");
        assert!(!root.is_valid());
    }
}
